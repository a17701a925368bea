pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "sealbox")]
#[command(about = "Upload files, run them through encrypt_decrypt, download the results")]
pub struct Args {
    /// Daemon to talk to (defaults to localhost on the configured app_port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the sealbox config directory (defaults to ~/.sealbox)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
