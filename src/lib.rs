pub mod builder;
pub mod composer;
pub mod config;
pub mod core;
pub mod registry;

pub use crate::builder::{BuilderOptions, DuplicateNames, SchemaBuilder};
pub use crate::composer::{AttestationComposer, ComposerOptions, FormInput};
pub use crate::config::{AppConfig, SignerAccount};
pub use crate::core::*;
