// Search API / 搜索接口
pub mod query;
pub mod types;

pub use query::{federated_search, peer_search, search};
