//! Required artifacts: verification and self-healing.
//!
//! Model weights and the resizer checkpoint are existence-checked only. The
//! vocabulary index is additionally checked for integrity and, when missing or
//! replaced by a storage pointer stub, fetched once from a known-good source.

pub mod fetch;
pub mod healer;
pub mod integrity;

pub use fetch::{AssetFetcher, HttpFetcher};
pub use healer::{AssetHealer, AssetManifest, AssetRecord, AssetRole, AssetStatus};
pub use integrity::{
    Integrity, IntegrityCheck, VocabularyIntegrity, is_storage_pointer, vocabulary_size,
};
