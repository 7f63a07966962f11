// Response cache module
// Author: kelexine (https://github.com/kelexine)

pub mod manager;
pub mod models;

pub use manager::ResponseCache;
pub use models::{CacheConfig, CacheEntry, CacheKey, CacheStats};
