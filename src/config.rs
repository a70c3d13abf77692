use crate::error::{ConfigError, StoreError};
use crate::store::{CalculatorStore, JsonFileStore, MemoryStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_DATABASE_DIR: &str = "database";
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    #[default]
    File,
    Memory,
}

/// Process-wide settings, fixed at start-up.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Directory holding the collection file for the JSON store.
    pub database_dir: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    pub store: StoreKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_dir: PathBuf::from(DEFAULT_DATABASE_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            store: StoreKind::File,
        }
    }
}

impl Config {
    /// Read `MEDCALC_BIND`, `MEDCALC_DATABASE_DIR`, `MEDCALC_STATIC_DIR` and
    /// `MEDCALC_STORE` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = lookup("MEDCALC_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind.clone()))?;

        let store = match lookup("MEDCALC_STORE").as_deref() {
            None | Some("file") => StoreKind::File,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        Ok(Config {
            bind_addr,
            database_dir: lookup("MEDCALC_DATABASE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_DIR)),
            static_dir: lookup("MEDCALC_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            store,
        })
    }

    pub fn with_bind(mut self, bind: &str) -> Result<Self, ConfigError> {
        self.bind_addr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind.to_string()))?;
        Ok(self)
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<Arc<dyn CalculatorStore>, StoreError> {
        match self.store {
            StoreKind::File => Ok(Arc::new(JsonFileStore::open(&self.database_dir)?)),
            StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
        }
    }
}
