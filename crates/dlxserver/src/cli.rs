use clap::{Parser, Subcommand};
use dlxcore::core::config;

#[derive(Parser, Debug)]
#[command(name = "videodlx")]
#[command(author, version, about = "Resolve media info and download videos or audio through yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default when no command is given)
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Resolve and print media info for a URL
    Info {
        /// Media URL
        url: String,

        /// Print the JSON returned by the API instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Download a URL into the download folder
    Download {
        /// Media URL
        url: String,

        /// Video quality (1080p, 720p, 480p, 360p; anything else means best)
        #[arg(short, long, default_value = config::download::DEFAULT_QUALITY)]
        quality: String,

        /// Extract audio as mp3 instead of downloading video
        #[arg(short, long)]
        audio: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
