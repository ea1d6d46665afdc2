use std::fs;
use std::path::Path;

use async_trait::async_trait;

use actix_web::web;

use log::info;

use crate::config::ServiceConfig;
use crate::file::{FileError, FileProvider};

#[derive(Clone)]
pub struct Local {
    config: ServiceConfig,
}

impl Local {
    pub fn new(mut config: ServiceConfig) -> Self {
        if !config.path.is_empty() && !config.path.ends_with('/') {
            config.path.push('/');
        }

        Self { config }
    }
}

#[async_trait]
impl FileProvider for Local {
    async fn load(&self, file_path: &str) -> Result<Vec<u8>, FileError> {
        let file_path = file_path.to_owned();

        Ok(web::block(move || fs::read(file_path)).await??)
    }

    async fn save(&self, file_path: &str, data: Vec<u8>) -> Result<(), FileError> {
        let path = Path::new(file_path).to_path_buf();
        let directory = path
            .parent()
            .ok_or_else(|| FileError::InvalidPath(file_path.into()))?
            .to_path_buf();

        web::block(move || {
            fs::create_dir_all(directory)?;
            fs::write(path, data)
        })
        .await??;

        info!("File \"{}\" saved.", file_path);

        Ok(())
    }

    fn base_path(&self) -> &str {
        self.config.path.as_str()
    }
}
