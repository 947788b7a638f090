use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(name = "sacn-ledfx-bridge")]
#[command(about = "Switch LedFx scenes from an sACN (E1.31) channel")]
pub struct Cli {
    /// Config file path.
    #[arg(short, long, default_value = "./config.json")]
    pub config: PathBuf,

    /// Run without the status panel; logs go to stderr.
    #[arg(short, long)]
    pub daemon: bool,

    /// Print the scene ids known to LedFx and exit.
    #[arg(long)]
    pub list_scenes: bool,

    /// Override the configured log level.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Local IPv4 address of the interface that joins the multicast group.
    #[arg(long, value_name = "IPV4")]
    pub interface: Option<Ipv4Addr>,
}
