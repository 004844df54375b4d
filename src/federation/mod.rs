//! Federation module - node-to-node search / 联邦搜索模块
//!
//! - Responder side: rate limit + deadline race around a provider's federated operation
//! - Initiator side: concurrent fan-out to peers, one outcome per peer
//! - Peer updates: periodic pull of each peer's index-updates feed

pub mod coordinator;
pub mod fanout;
pub mod feed;
pub mod poller;
pub mod rate_limit;

pub use coordinator::{FederatedPhase, FederatedSearchCoordinator};
pub use fanout::{FanoutOptions, PeerFanoutClient};
pub use feed::build_index_updates;
pub use poller::{LoggingUpdateHandler, PeerDescriptor, PeerUpdateHandler, PeerUpdatePoller, PollerHandle};
pub use rate_limit::{RateLimiter, DEFAULT_MIN_INTERVAL_MS};
