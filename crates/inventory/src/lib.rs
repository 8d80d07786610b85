//! Inventory inputs consumed by the forecasting engine.
//!
//! This crate defines the read-only collaborator contract: product snapshots,
//! stock movements and the [`InventoryReader`] trait. It performs no IO itself.

pub mod movement;
pub mod product;
pub mod reader;

pub use movement::{Movement, MovementKind};
pub use product::ProductSnapshot;
pub use reader::InventoryReader;
