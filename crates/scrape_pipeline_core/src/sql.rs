//! Warehouse statement texts. All statements are idempotent or
//! append-only; consistency across re-runs relies on `IF NOT EXISTS` and on
//! tolerating duplicate rows from a replayed bulk copy.

pub fn create_schema_statement(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {schema};")
}

pub fn create_table_statement(schema: &str, table: &str) -> String {
    // reply_message_id is semantically an integer; the column is float
    // because the source data leaves it null for top-level messages.
    format!(
        "CREATE TABLE IF NOT EXISTS {schema}.{table} (\n\
         \x20   message_id int8,\n\
         \x20   message_timestamp varchar(30),\n\
         \x20   message_content varchar(5000),\n\
         \x20   reply_message_id float,\n\
         \x20   trader_id varchar(30),\n\
         \x20   chat_link int8,\n\
         \x20   processing_time varchar(30)\n\
         );"
    )
}

#[allow(clippy::too_many_arguments)]
pub fn copy_from_staged_object_statement(
    database: &str,
    schema: &str,
    table: &str,
    bucket: &str,
    key: &str,
    region: &str,
    iam_role_arn: &str,
) -> String {
    format!(
        "COPY {database}.{schema}.{table} \
         FROM 's3://{bucket}/{key}' \
         REGION '{region}' \
         iam_role '{iam_role_arn}' \
         format as json 'auto';"
    )
}
