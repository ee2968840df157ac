use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use taixiu_execution::{FileStore, KeyValueStore, MemoryStore, SqliteStore, TableConfig};

/// Where balance and history live between sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Nothing persisted.
    Memory,
    /// JSON file in the data dir.
    #[default]
    File,
    /// SQLite database in the data dir.
    Sqlite,
}

/// Settings remembered across runs; CLI flags override and are written back.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PersistedConfig {
    pub store: Option<StoreKind>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub table: Option<TableConfig>,
}

pub fn load_config() -> Option<PersistedConfig> {
    let path = config_path()?;
    let data = std::fs::read(path).ok()?;
    serde_json::from_slice(&data).ok()
}

pub fn save_config(cfg: &PersistedConfig) -> Result<()> {
    if let Some(path) = config_path() {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        std::fs::write(path, data)?;
    }
    Ok(())
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "taixiu", "terminal")
}

fn config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.json"))
}

/// Platform data dir, or the working directory when none is known.
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn open_store(kind: StoreKind, data_dir: &Path) -> Result<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match kind {
        StoreKind::Memory => Box::new(MemoryStore::default()),
        StoreKind::File => Box::new(FileStore::new(data_dir.join("store.json"))),
        StoreKind::Sqlite => Box::new(
            SqliteStore::open(&data_dir.join("store.db"))
                .with_context(|| format!("open sqlite store in {}", data_dir.display()))?,
        ),
    };
    Ok(store)
}
