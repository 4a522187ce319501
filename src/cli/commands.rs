//! CLI command implementations.
//!
//! Boot sequence for `start`:
//! 1. Load and validate configuration
//! 2. Load the schema directory (fatal on failure)
//! 3. Probe the document store (fatal when unreachable)
//! 4. Serve HTTP until the process exits

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::http_server::{AppState, HttpServer};
use crate::ingest::IngestCoordinator;
use crate::observability::Logger;
use crate::schema::SchemaRegistry;
use crate::store::{MemoryStore, RemoteStore, StoreBackend, StoreGateway};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// How long a boot-time store probe may take before the boot fails.
const BOOT_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatches a parsed command.
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Init { config } => init(&config),
        Command::Check { config } => check(&config),
        Command::Start { config } => start(&config),
    }
}

/// Writes a default configuration file and creates the schema
/// directory it points at.
pub fn init(config_path: &Path) -> CliResult<()> {
    if config_path.exists() {
        return Err(CliError::already_initialized(format!(
            "config file '{}' already exists",
            config_path.display()
        )));
    }

    let config = Config::default();
    let content = serde_json::to_string_pretty(&config)
        .map_err(|e| CliError::io_error(format!("failed to serialize config: {}", e)))?;
    fs::write(config_path, content)
        .map_err(|e| CliError::io_error(format!("failed to write config: {}", e)))?;

    // Mirror Config::load: a relative schema_dir lives next to the
    // config file.
    let schema_dir = match config_path.parent() {
        Some(parent) if config.schema_dir.is_relative() => parent.join(&config.schema_dir),
        _ => config.schema_dir.clone(),
    };
    fs::create_dir_all(&schema_dir)
        .map_err(|e| CliError::io_error(format!("failed to create schema dir: {}", e)))?;

    Logger::info(
        "INIT_COMPLETE",
        &[("config", &config_path.display().to_string())],
    );
    Ok(())
}

/// Loads the schema directory once and reports the catalog. A one-shot
/// authoring check for operators editing schema files.
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path).map_err(|e| CliError::config_error(e.to_string()))?;

    let registry = SchemaRegistry::new();
    let count = registry
        .load(&config.schema_dir)
        .map_err(|e| CliError::boot_failed(e.to_string()))?;

    for (name, version) in registry.snapshot().catalog() {
        Logger::info(
            "SCHEMA_OK",
            &[("name", name), ("version", &version.to_string())],
        );
    }
    Logger::info("CHECK_COMPLETE", &[("schemas", &count.to_string())]);
    Ok(())
}

/// Boots the service and serves until the process exits.
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path).map_err(|e| CliError::config_error(e.to_string()))?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("failed to start runtime: {}", e)))?;

    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> CliResult<()> {
    let registry = Arc::new(SchemaRegistry::new());
    registry.load(&config.schema_dir).map_err(|e| {
        Logger::fatal("BOOT_SCHEMA_LOAD_FAILED", &[("reason", e.message())]);
        CliError::boot_failed(e.to_string())
    })?;

    let backend = match &config.store_url {
        Some(url) => StoreBackend::Remote(RemoteStore::new(url.clone())),
        None => StoreBackend::Memory(MemoryStore::new()),
    };

    let gateway = StoreGateway::new(backend, config.gateway_options());
    probe_store(&gateway).await?;

    let coordinator = IngestCoordinator::new(registry, config.strictness, gateway);
    let state = Arc::new(AppState {
        coordinator,
        schema_dir: config.schema_dir.clone(),
    });

    HttpServer::new(config.http.clone(), state)
        .serve()
        .await
        .map_err(|e| CliError::boot_failed(format!("server failed: {}", e)))
}

async fn probe_store(
    gateway: &StoreGateway<StoreBackend>,
) -> CliResult<()> {
    let probe = tokio::time::timeout(BOOT_PING_TIMEOUT, gateway.ping());
    match probe.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            Logger::fatal("BOOT_STORE_UNREACHABLE", &[("reason", e.message())]);
            Err(CliError::boot_failed(e.to_string()))
        }
        Err(_) => {
            Logger::fatal("BOOT_STORE_UNREACHABLE", &[("reason", "probe timed out")]);
            Err(CliError::boot_failed("store probe timed out"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_config_and_schema_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("docgate.json");

        init(&config_path).unwrap();

        assert!(config_path.exists());
        let config = Config::load(&config_path).unwrap();
        assert!(config.schema_dir.exists());
    }

    #[test]
    fn test_init_refuses_existing_config() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("docgate.json");
        fs::write(&config_path, "{}").unwrap();

        let err = init(&config_path).unwrap_err();
        assert_eq!(err.code(), crate::cli::CliErrorCode::AlreadyInitialized);
    }

    #[test]
    fn test_check_reports_load_failure() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("docgate.json");
        let schema_dir = tmp.path().join("schemas");
        fs::create_dir(&schema_dir).unwrap();
        fs::write(schema_dir.join("bad.json"), "{ nope").unwrap();
        fs::write(
            &config_path,
            format!(r#"{{"schema_dir": "{}"}}"#, schema_dir.display()),
        )
        .unwrap();

        assert!(check(&config_path).is_err());
    }
}
