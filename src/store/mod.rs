pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StoreConfig};
use crate::core::repository::ExpenseRepository;
use crate::providers::RestExpenseStore;
use anyhow::Result;
use disk::DiskExpenseStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the expense repository selected in the configuration.
pub fn open_repository(config: &AppConfig) -> Result<Arc<dyn ExpenseRepository>> {
    match &config.store {
        StoreConfig::Local => {
            let path = config.default_data_path()?.join("expenses");
            debug!("Using local expense store at {}", path.display());
            Ok(Arc::new(DiskExpenseStore::new(&path)?))
        }
        StoreConfig::Remote(remote) => {
            debug!("Using remote expense store at {}", remote.base_url);
            Ok(Arc::new(RestExpenseStore::new(
                &remote.base_url,
                &remote.api_key,
            )?))
        }
    }
}
