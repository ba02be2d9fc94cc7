//! Collaborator capabilities module
//!
//! The timer core reaches the outside world (clock, sound, device-local
//! storage, session log) only through the traits defined here.

pub mod clock;
pub mod kv_store;
pub mod notifier;
pub mod reflection;
pub mod sessions;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use kv_store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use notifier::{Notifier, TerminalNotifier, Tone};
pub use reflection::reflection_url;
pub use sessions::{JsonlSessionStore, MemorySessionStore, SessionRecord, SessionRepository};
