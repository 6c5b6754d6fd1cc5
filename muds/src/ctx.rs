//! Application context.
//!
//! [`AppContext`] holds what every command needs: the resolved settings and
//! the option schema, loaded once at startup.

use std::sync::Arc;

use anyhow::Context;
use conftree::{
    data::{Schema, SchemaFormat, Tree},
    store::{BlobStore, DirStore, MemoryStore},
    web::AppState,
};

use crate::config::{Settings, StoreConfig};

/// DevStack option schema shipped with the binary.
pub const BUNDLED_SCHEMA: &str = include_str!("../assets/opts.yml");

/// The main application context.
#[derive(Clone)]
pub struct AppContext {
    /// Effective settings.
    pub settings: Settings,
    /// Option schema shared by every request.
    pub schema: Arc<Schema>,
}

impl AppContext {
    /// Load the schema named by `settings`, or the bundled one.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be read or is invalid.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let schema = match &settings.schema {
            Some(path) => Schema::load(path)
                .with_context(|| format!("Invalid option schema {}", path.display()))?,
            None => Schema::parse(BUNDLED_SCHEMA, SchemaFormat::Yaml)
                .context("Invalid bundled option schema")?,
        };
        debug!("Schema declares {} options", schema.len());

        Ok(Self {
            settings,
            schema: Arc::new(schema),
        })
    }

    /// A fresh tree holding default values.
    pub fn tree(&self) -> anyhow::Result<Tree<'_>> {
        Ok(Tree::build(&self.schema)?)
    }

    /// Open the configured document store.
    pub fn store(&self) -> anyhow::Result<Arc<dyn BlobStore>> {
        let store: Arc<dyn BlobStore> = match &self.settings.store {
            StoreConfig::Memory => {
                info!("Generated configs are kept in memory");
                Arc::new(MemoryStore::new())
            }
            StoreConfig::Dir { path } => Arc::new(
                DirStore::open(path)
                    .with_context(|| format!("Cannot use store directory {}", path.display()))?,
            ),
        };
        Ok(store)
    }

    /// Handler state for the web server.
    pub fn app_state(&self) -> anyhow::Result<AppState> {
        Ok(AppState {
            schema: self.schema.clone(),
            store: self.store()?,
        })
    }
}
