use anyhow::Result;
use dlxcore::core::{config, init_logger, log_engine_configuration, metrics};
use dlxcore::{AppError, FetchMode, FetchRequest, Fetcher, FetcherConfig, MediaQuery};
use dlxserver::cli::{Cli, Commands};
use dlxserver::server;
use dotenvy::dotenv;
use std::net::{IpAddr, SocketAddr};

/// Main entry point for the VideoDlx service
///
/// # Errors
/// Returns an error if initialization fails (logging, download folder, bind address).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;
    metrics::init_metrics();
    log_engine_configuration();

    let fetcher_config = FetcherConfig::from_env();
    let fetcher = Fetcher::from_config(&fetcher_config);
    fetcher.store().ensure_dir().map_err(|e| {
        anyhow::anyhow!(
            "Failed to create download folder {}: {}",
            fetcher_config.download_dir.display(),
            e
        )
    })?;
    log::info!("Using extraction engine: {}", fetcher.engine_name());

    match cli.command {
        None => run_server(fetcher, None, None).await,
        Some(Commands::Serve { port, bind }) => run_server(fetcher, port, bind).await,
        Some(Commands::Info { url, json }) => run_cli_info(&fetcher, url, json).await,
        Some(Commands::Download { url, quality, audio }) => run_cli_download(&fetcher, url, quality, audio).await,
    }
}

async fn run_server(fetcher: Fetcher, port: Option<u16>, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config::server::BIND_ADDR.clone());
    let ip: IpAddr = bind
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid bind address {}: {}", bind, e)))?;
    let addr = SocketAddr::new(ip, port.unwrap_or(*config::server::PORT));
    server::serve(fetcher, addr).await
}

async fn run_cli_info(fetcher: &Fetcher, url: String, json: bool) -> Result<()> {
    let info = fetcher.resolve_info(&MediaQuery::new(url)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Title:    {}", info.title);
    println!("Source:   {}", info.source_site);
    println!("Duration: {}s", info.duration_seconds);
    if !info.thumbnail_url.is_empty() {
        println!("Thumb:    {}", info.thumbnail_url);
    }
    println!("Formats:");
    if info.renditions.is_empty() {
        println!("  (none)");
    }
    for r in &info.renditions {
        if r.filesize > 0 {
            println!("  {:>6}  id={}  {:.1} MB", r.quality, r.format_id, r.filesize as f64 / (1024.0 * 1024.0));
        } else {
            println!("  {:>6}  id={}", r.quality, r.format_id);
        }
    }
    Ok(())
}

async fn run_cli_download(fetcher: &Fetcher, url: String, quality: String, audio: bool) -> Result<()> {
    let request = FetchRequest {
        query: MediaQuery::new(url),
        mode: FetchMode::from_parts(&quality, audio),
    };
    let artifact = fetcher.materialize(&request).await?;
    println!("{} ({} bytes)", artifact.path.display(), artifact.size_bytes);
    Ok(())
}
