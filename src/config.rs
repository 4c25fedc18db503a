//! Server configuration, read once at startup from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub const DATA_DIR_ENV: &str = "ERP_DATA_DIR";
pub const BIND_ADDR_ENV: &str = "ERP_BIND_ADDR";
pub const LOG_DIR_ENV: &str = "ERP_LOG_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

pub const EXPORT_ORDERS_FILE: &str = "export_orders.json";
pub const LOCAL_ORDERS_FILE: &str = "local_orders.json";
pub const STOCK_BOXES_FILE: &str = "stock_boxes.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let raw_addr = get(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid {BIND_ADDR_ENV}: {raw_addr}"))?;
        let log_dir = get(LOG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(crate::diagnostics::default_log_dir);

        Ok(Self {
            data_dir,
            bind_addr,
            log_dir,
        })
    }

    pub fn export_orders_path(&self) -> PathBuf {
        self.data_dir.join(EXPORT_ORDERS_FILE)
    }

    pub fn local_orders_path(&self) -> PathBuf {
        self.data_dir.join(LOCAL_ORDERS_FILE)
    }

    pub fn stock_boxes_path(&self) -> PathBuf {
        self.data_dir.join(STOCK_BOXES_FILE)
    }
}
