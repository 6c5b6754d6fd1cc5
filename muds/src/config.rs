//! Server settings.
//!
//! Settings are read from an optional TOML file; every field has a default
//! and command-line flags override file values.
//!
//! # Configuration File Format
//!
//! ```toml
//! listen = "0.0.0.0:5000"
//! schema = "/etc/muds/opts.yml"
//! static_dir = "/usr/share/muds/static"
//!
//! [store]
//! kind = "dir"
//! path = "/var/lib/muds/configs"
//! ```

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Root settings structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Address the web server binds to.
    pub listen: SocketAddr,
    /// Option schema file; the bundled DevStack schema when unset.
    pub schema: Option<PathBuf>,
    /// Directory served under `/static`.
    pub static_dir: Option<PathBuf>,
    /// Where generated documents are kept.
    pub store: StoreConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000),
            schema: None,
            static_dir: None,
            store: StoreConfig::default(),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Keep documents in memory until the process exits.
    #[default]
    Memory,
    /// One JSON document per generated config in `path`.
    Dir { path: PathBuf },
}

impl Settings {
    /// Read settings from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(settings)
    }

    /// Read settings from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
