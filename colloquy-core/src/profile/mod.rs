//! Credential Profiles
//!
//! A profile names one model endpoint: its URL, API key, model id and the
//! system instruction that prefixes every request. Profiles are grouped in a
//! [`ProfileSet`] and persisted through a [`ProfileStore`].
//!
//! # Example
//!
//! ```rust
//! use colloquy_core::profile::{MemoryProfileStore, Profile, ProfileSet, ProfileStore};
//!
//! let store = MemoryProfileStore::new();
//! let mut profiles = store.load_or_default().unwrap();
//! profiles.save(Profile::new("work", "https://api.example.com/v1", "sk-...", "gpt-4o-mini"));
//! store.save(&profiles).unwrap();
//! ```

mod record;
mod set;
mod store;

pub use record::{ApiKey, Profile, ProviderKind};
pub use set::ProfileSet;
pub use store::{JsonFileProfileStore, MemoryProfileStore, ProfileStore};
