/// Object-store operations the copy engine needs.
pub trait AssetStore {
    fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<(), String>;

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String>;
}
