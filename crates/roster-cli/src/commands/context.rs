use anyhow::{Context as _, Result};
use roster_application::{CollectionStore, StoreOptions};
use roster_core::config::RootConfig;
use roster_core::query::Query;
use roster_infrastructure::{ConfigService, MockUserApi};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command needs: the loaded config and the user API.
///
/// The mock API is seeded fresh on every run, so changes made by one
/// invocation are not seen by the next.
pub struct Context {
    pub config: RootConfig,
    pub api: Arc<MockUserApi>,
}

impl Context {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new()?,
        };
        let config = service
            .get_config()
            .with_context(|| format!("Failed to load config from {}", service.path().display()))?;
        tracing::debug!("[Context] Using config {:?}", service.path());

        Ok(Self::from_config(config))
    }

    pub fn from_config(config: RootConfig) -> Self {
        let api = Arc::new(MockUserApi::new(config.api.clone()));
        Self { config, api }
    }

    /// The query a fresh store starts from, per the `[store]` table.
    pub fn initial_query(&self) -> Query {
        StoreOptions::from(&self.config.store).initial_query
    }

    /// A store over the shared API starting at `query`.
    pub fn store(&self, query: Query) -> CollectionStore<MockUserApi> {
        let options = StoreOptions {
            initial_query: query,
            ..StoreOptions::from(&self.config.store)
        };
        CollectionStore::with_options(Arc::clone(&self.api), options)
    }

    /// A store with the selection set to `ids`.
    ///
    /// Each id is looked up first, which also fails early on unknown ids.
    pub async fn store_selecting(&self, ids: &[String]) -> Result<CollectionStore<MockUserApi>> {
        let store = self.store(self.initial_query());
        for id in ids {
            store.get_by_id(id).await?;
            store.toggle_selection(id).await;
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::config::ApiConfig;
    use std::io::Write;

    #[test]
    fn test_load_reads_store_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\npage_size = 25\nsort_field = \"email\"").unwrap();

        let context = Context::load(Some(file.path().to_path_buf())).unwrap();
        let query = context.initial_query();

        assert_eq!(query.page_size, 25);
        assert_eq!(query.sort_field, "email");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nfailure_rate = 3.0").unwrap();

        assert!(Context::load(Some(file.path().to_path_buf())).is_err());
    }

    #[tokio::test]
    async fn test_store_selecting_known_ids() {
        let context = Context::from_config(RootConfig {
            api: ApiConfig::instant(5),
            ..RootConfig::default()
        });

        let store = context
            .store_selecting(&["user-2".to_string(), "user-4".to_string()])
            .await
            .unwrap();
        assert_eq!(store.selection().await.len(), 2);

        assert!(context.store_selecting(&["user-9".to_string()]).await.is_err());
    }
}
