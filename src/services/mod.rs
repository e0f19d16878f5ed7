// Service exports
pub mod repository;
pub mod rest;
pub mod store;

pub use repository::{BuddyRepository, RepositoryError, Tables};
pub use rest::RestRowStore;
pub use store::{Filter, MemoryRowStore, Row, RowStore, StoreError};
