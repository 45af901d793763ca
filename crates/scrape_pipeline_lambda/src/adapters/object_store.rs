pub trait StagedObjectStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String>;
    fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<(), String>;
    fn delete_object(&self, key: &str) -> Result<(), String>;
}
