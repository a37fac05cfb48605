use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

use beatchain_runtime::NodeConfig;
use beatchain_state::MergePolicy;

#[derive(Parser, Debug)]
#[command(name = "beatchain")]
#[command(about = "Replicate a measurement chain across directly connected peers")]
pub struct Cli {
    /// Port to listen on for incoming peers
    #[arg(short = 'l', long)]
    pub listen: u16,

    /// Peer to dial, e.g. 127.0.0.1:10001
    #[arg(short = 'd', long)]
    pub dial: Option<SocketAddr>,

    /// Address to bind the listener on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Seconds between full-chain broadcasts
    #[arg(long, default_value_t = 5)]
    pub interval: u64,

    /// Adopt any longer chain without re-validating its links
    #[arg(long)]
    pub length_only: bool,
}

impl Cli {
    pub fn node_config(&self) -> anyhow::Result<NodeConfig> {
        if self.listen == 0 {
            anyhow::bail!("Please provide a port to bind on with -l");
        }
        if self.interval == 0 {
            anyhow::bail!("--interval must be at least 1 second");
        }

        Ok(NodeConfig {
            broadcast_interval: Duration::from_secs(self.interval),
            merge_policy: if self.length_only {
                MergePolicy::LengthOnly
            } else {
                MergePolicy::Verified
            },
            ..NodeConfig::default()
        })
    }
}
