pub mod lock;
pub mod normalize;
pub mod store;

pub use normalize::normalize;
pub use store::{store_name, CorruptStorePolicy, TranslationCache, STORE_EXTENSION};
