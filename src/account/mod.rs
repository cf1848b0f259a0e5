//! Account models and the account cache

pub mod cache;
pub mod models;

// Re-export commonly used types
pub use cache::{AccountCache, CacheError};
pub use models::{Account, AccountId, AccountList, AccountNumber};
