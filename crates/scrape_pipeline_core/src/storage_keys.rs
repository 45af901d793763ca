use crate::contract::ValidationError;

/// Key for a staged batch under a namespace prefix. The fingerprint makes
/// restaging the same batch overwrite the same key.
pub fn staged_object_key(prefix: &str, run_date: &str, batch_fingerprint: &str) -> String {
    format!(
        "{}/dataset=scraped_messages/run_date={run_date}/batch-{batch_fingerprint}.json",
        prefix.trim_matches('/'),
    )
}

/// Destination key for relocating a staged object out of the unprocessed
/// namespace. Only the namespace prefix changes; the partition path and
/// object name are preserved so the two namespaces stay joinable.
pub fn relocated_object_key(
    key: &str,
    unprocessed_prefix: &str,
    processed_prefix: &str,
) -> Result<String, ValidationError> {
    let unprocessed = unprocessed_prefix.trim_matches('/');
    let processed = processed_prefix.trim_matches('/');

    let suffix = key
        .strip_prefix(unprocessed)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| {
            ValidationError::new(format!(
                "Staged object key '{key}' is not under the unprocessed prefix '{unprocessed}'"
            ))
        })?;

    Ok(format!("{processed}/{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_staged_key_with_expected_partitions() {
        let key = staged_object_key("scraped-messages/unprocessed/", "2026-08-31", "abc123");

        assert_eq!(
            key,
            "scraped-messages/unprocessed/dataset=scraped_messages/run_date=2026-08-31/batch-abc123.json"
        );
    }

    #[test]
    fn relocation_swaps_only_the_namespace_prefix() {
        let staged = staged_object_key("scraped-messages/unprocessed", "2026-08-31", "abc123");
        let relocated = relocated_object_key(
            &staged,
            "scraped-messages/unprocessed",
            "scraped-messages/processed",
        )
        .expect("key should relocate");

        assert_eq!(
            relocated,
            "scraped-messages/processed/dataset=scraped_messages/run_date=2026-08-31/batch-abc123.json"
        );
    }

    #[test]
    fn rejects_key_outside_the_unprocessed_namespace() {
        let error = relocated_object_key(
            "elsewhere/batch-abc123.json",
            "scraped-messages/unprocessed",
            "scraped-messages/processed",
        )
        .expect_err("key should be rejected");

        assert!(error.message().contains("is not under the unprocessed prefix"));
    }
}
