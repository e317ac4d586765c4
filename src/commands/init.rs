//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::meta::MetaDb;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitSummary {
    pub config_path: String,
    pub db_path: String,
}

/// Write a default config and create the relational store
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<InitSummary> {
    let mut config = Config::default();
    config.init_paths(base_dir);

    if config.paths.config_file.exists() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config.paths.config_file.display()
        )));
    }

    std::fs::create_dir_all(&config.paths.base_dir)?;
    config.save()?;

    MetaDb::new(&config.paths.db_file).await?;
    info!("Initialized alterego in {:?}", config.paths.base_dir);

    Ok(InitSummary {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
    })
}

pub fn print_init_summary(summary: &InitSummary) {
    println!("✓ alterego initialized successfully");
    println!("  Config: {}", summary.config_path);
    println!("  Database: {}", summary.db_path);
    println!("\nNext steps:");
    println!("  1. Export your LLM key: export LLM_API_KEY=...");
    println!("  2. Start Qdrant: docker run -p 6334:6334 qdrant/qdrant");
    println!("  3. Upload your export: alterego upload takeout.zip");
    println!("  4. Build your twin: alterego analyze");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config_and_db() {
        let tmp = TempDir::new().unwrap();
        let summary = cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();

        assert!(tmp.path().join("config.toml").exists());
        assert!(tmp.path().join("alterego.db").exists());
        assert!(summary.config_path.ends_with("config.toml"));

        let loaded = Config::load(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(loaded.collection_name, Config::default().collection_name);
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();

        let err = cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(cmd_init(Some(tmp.path().to_path_buf()), true).await.is_ok());
    }
}
