use lazy_async_promise::ImmediateValuePromise;
use tracing::info;

use crate::api::{ApiClient, Listing};
use crate::config::Config;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct BackupService {
    pub api: ApiClient,
    pub config: Config,
}
impl BackupService {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::from_config(&config)?;
        Ok(Self { api, config })
    }

    /// Rebuild the http client after the server settings changed.
    pub fn reconfigure(&mut self, config: Config) -> Result<()> {
        self.api = ApiClient::from_config(&config)?;
        self.config = config;
        Ok(())
    }

    pub fn list_backups(&self, limit: Option<u32>) -> ImmediateValuePromise<Listing> {
        let api = self.api.clone();
        ImmediateValuePromise::new(async move {
            let listing = api.list_backups(limit).await?;
            Ok(listing)
        })
    }

    pub fn restore_backup(&self, index: i64) -> ImmediateValuePromise<String> {
        let api = self.api.clone();
        ImmediateValuePromise::new(async move {
            info!("Restoring backup {index}");
            let text = api.restore_backup(index).await?;
            Ok(text)
        })
    }

    pub fn save_config(&self) -> Result<()> {
        info!("Saving config");
        self.config.save()
    }
}
