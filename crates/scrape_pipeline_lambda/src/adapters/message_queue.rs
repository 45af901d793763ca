pub trait BatchPublisher {
    fn publish_batch(&self, body: &str) -> Result<(), String>;
}
