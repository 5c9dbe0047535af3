use async_trait::async_trait;

use crate::shared::AppError;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryKvStore;
pub use postgres::PostgresKvStore;

/// Durable mapping from string keys to serialized values.
///
/// Each call is atomic on its own. There is no transaction spanning a `get`
/// and the `put` that follows it, so read-modify-write sequences from
/// concurrent callers on the same key are last-write-wins.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn put(&self, key: &str, value: String) -> Result<(), AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Short backend name used in health output and logs
    fn backend(&self) -> &'static str;
}
