//! `forgecast-core`: shared building blocks.
//!
//! This crate contains **pure** primitives (no IO, no storage): identifiers,
//! the domain error model and the injected clock.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{MovementId, ProductId};
