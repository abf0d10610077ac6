//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use self::in_memory::InMemoryLodgingStore;
#[cfg(feature = "mongodb_backend")]
pub use self::mongodb::MongoLodgingStore;
