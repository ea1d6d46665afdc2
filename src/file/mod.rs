pub mod local;
pub mod photo;

#[cfg(test)]
pub mod tests;

use std::io::Error;

use async_trait::async_trait;

use actix_web::error::BlockingError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("I/O error: {0}")]
    IoError(#[from] Error),
    #[error("Blocking error: {0}")]
    BlockingError(#[from] BlockingError),
    #[error("Invalid file path: {0}")]
    InvalidPath(String),
}

#[async_trait]
pub trait FileProvider: Send + Sync {
    /// Where a file named `file_name` lives under this provider's base path.
    fn generate_filepath(&self, file_name: &str) -> String {
        format!(
            "{}{}",
            self.base_path(),
            sanitize_filename::sanitize(file_name)
        )
    }

    async fn load(&self, file_path: &str) -> Result<Vec<u8>, FileError>;

    async fn save(&self, file_path: &str, data: Vec<u8>) -> Result<(), FileError>;

    fn base_path(&self) -> &str;
}
