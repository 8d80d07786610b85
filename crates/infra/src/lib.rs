//! Infrastructure adapters for the forecasting engine.
//!
//! - `catalog`: in-memory [`forgecast_inventory::InventoryReader`]
//! - `fixture`: JSON catalog fixtures for the CLI and tests

pub mod catalog;
pub mod fixture;

pub use catalog::InMemoryCatalog;
pub use fixture::{CatalogFixture, FixtureError};
