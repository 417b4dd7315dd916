//! Domain layer: entities and selection logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod select;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use select::{for_each, select, NamePattern, Named, Substitution};
