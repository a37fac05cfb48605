//! Node configuration

use std::time::Duration;

use beatchain_state::MergePolicy;

/// Default interval between full-chain broadcasts
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(5);

/// beatchain node configuration
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Interval between full-chain broadcasts to each peer
    pub broadcast_interval: Duration,
    /// Checks applied to inbound chains before adoption
    pub merge_policy: MergePolicy,
    /// Capacity of the chain event channel
    pub event_capacity: usize,
    /// Eager pushes that may wait for one peer before new ones are dropped
    pub outbound_capacity: usize,
    /// Pause after a failed accept before retrying
    pub accept_backoff: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            broadcast_interval: DEFAULT_BROADCAST_INTERVAL,
            merge_policy: MergePolicy::Verified,
            event_capacity: 64,
            outbound_capacity: 16,
            accept_backoff: Duration::from_millis(100),
        }
    }
}
