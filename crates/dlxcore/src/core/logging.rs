//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the engine configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Parse a level name, falling back to `Info` on anything unknown.
pub fn parse_level(raw: &str) -> LevelFilter {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger is already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let level = parse_level(&config::LOG_LEVEL);
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the extraction engine configuration at startup
pub fn log_engine_configuration() {
    log::info!("Extraction engine: {}", config::YTDL_BIN.as_str());
    log::info!("Download folder: {}", config::expand_path(&config::DOWNLOAD_FOLDER).display());
    log::info!("Engine timeout: {}s", config::download::ytdlp_timeout().as_secs());

    match config::YTDL_COOKIES_FILE.as_deref() {
        Some(path) if config::expand_path(path).exists() => log::info!("YTDL_COOKIES_FILE: {}", path),
        Some(path) => log::warn!("YTDL_COOKIES_FILE: {} (file not found, ignored)", path),
        None => log::debug!("YTDL_COOKIES_FILE: not set"),
    }

    if config::YTDL_PROXY.is_some() {
        log::info!("YTDL_PROXY: configured");
    }
}
