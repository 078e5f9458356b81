use crate::utils::error::Result;

/// Where generated scripts are read from and written to.
///
/// A `write_file` either stores the whole content or leaves nothing behind.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
