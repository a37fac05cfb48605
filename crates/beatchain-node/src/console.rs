//! Console rendering of chain events

use tokio::sync::broadcast;

use beatchain_core::Chain;
use beatchain_runtime::ChainEvent;
use beatchain_wire::encode_chain_pretty;

const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Print chain events until the node goes away
pub async fn print_events(mut events: broadcast::Receiver<ChainEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                print!("{}", render_event(&event));
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "console fell behind chain events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

pub fn render_event(event: &ChainEvent) -> String {
    match event {
        ChainEvent::Appended { chain, .. } => format!("{}\n", render_chain(chain)),
        ChainEvent::Adopted { chain, .. } => {
            format!("{}{}{}\n> ", GREEN, render_chain(chain), RESET)
        }
        ChainEvent::PeerAttached { label, .. } => format!("Got a new stream from {}\n", label),
        ChainEvent::PeerClosed { label, reason, .. } => {
            format!("Stream from {} closed: {}\n", label, reason)
        }
    }
}

fn render_chain(chain: &Chain) -> String {
    encode_chain_pretty(chain).unwrap_or_else(|e| format!("<unprintable chain: {}>", e))
}
