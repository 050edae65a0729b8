pub mod catalog;
pub mod provider;
pub mod translate;
pub mod translation_cache;
