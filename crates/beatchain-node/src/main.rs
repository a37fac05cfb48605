//! beatchain node
//!
//! Listens for peers, optionally dials one, and turns each integer typed on
//! stdin into a new record that is replicated to every connected peer.

mod cli;
mod console;
mod operator;

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use beatchain_runtime::SyncNode;
use beatchain_transport::{dial, TcpTransport};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beatchain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.node_config()?;
    let node = SyncNode::new(config);

    let transport = TcpTransport::bind(SocketAddr::new(cli.host, cli.listen)).await?;
    let local_addr = transport.local_addr();
    tracing::info!("I am {}", local_addr);
    println!(
        "Now run \"beatchain -l {} -d {}\" on a different terminal",
        cli.listen.saturating_add(1),
        local_addr
    );

    let server = {
        let node = node.clone();
        tokio::spawn(async move { node.serve(transport).await })
    };
    let printer = tokio::spawn(console::print_events(node.subscribe()));

    if let Some(target) = cli.dial {
        let session = dial(target).await?;
        node.attach(session, target.to_string());
        println!("Connected to {}", target);
    }

    operator::run(&node).await?;

    node.shutdown();
    server.await?;
    printer.abort();
    Ok(())
}
