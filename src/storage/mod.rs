pub mod patient;
pub mod sqlite;
#[cfg(test)]
pub mod testing;
pub mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageRead};
