pub mod memory;

pub use self::memory::{InMemoryRegistry, StoredAttestation};
