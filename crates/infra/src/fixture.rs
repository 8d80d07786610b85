//! JSON catalog fixtures.
//!
//! ```json
//! {
//!   "products": [{ "id": "...", "name": "Widget", "unit_price": 12.5, "quantity": 40 }],
//!   "movements": [{ "id": "...", "product_id": "...", "quantity": 3,
//!                   "kind": "SALE", "timestamp": "2024-03-01T09:30:00Z" }]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use forgecast_core::DomainError;
use forgecast_inventory::{Movement, ProductSnapshot};

use crate::catalog::InMemoryCatalog;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed fixture: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid fixture content: {0}")]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub products: Vec<ProductSnapshot>,
    #[serde(default)]
    pub movements: Vec<Movement>,
}

impl CatalogFixture {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FixtureError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Validate and load everything into a fresh catalog.
    pub fn into_catalog(self) -> Result<InMemoryCatalog, FixtureError> {
        let catalog = InMemoryCatalog::new();
        let (products, movements) = (self.products.len(), self.movements.len());
        for p in self.products {
            catalog.upsert_product(p)?;
        }
        catalog.record_movements(self.movements)?;
        info!(products, movements, "catalog fixture loaded");
        Ok(catalog)
    }
}
