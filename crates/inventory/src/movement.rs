use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use forgecast_core::{DomainError, DomainResult, MovementId, ProductId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Units left stock to a customer.
    Sale,
    /// Units entered stock from a supplier.
    Purchase,
}

/// One entry of a product's stock ledger.
///
/// Movements are immutable once recorded; consumers only read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub kind: MovementKind,
    pub timestamp: DateTime<Utc>,
}

impl Movement {
    pub fn new(
        product_id: ProductId,
        quantity: u32,
        kind: MovementKind,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let movement = Self {
            id: MovementId::new(),
            product_id,
            quantity,
            kind,
            timestamp,
        };
        movement.validate()?;
        Ok(movement)
    }

    pub fn sale(product_id: ProductId, quantity: u32, timestamp: DateTime<Utc>) -> DomainResult<Self> {
        Self::new(product_id, quantity, MovementKind::Sale, timestamp)
    }

    pub fn purchase(
        product_id: ProductId,
        quantity: u32,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::new(product_id, quantity, MovementKind::Purchase, timestamp)
    }

    /// Quantity must be strictly positive; direction carries the sign.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity == 0 {
            return Err(DomainError::validation("movement quantity must be positive"));
        }
        Ok(())
    }

    pub fn is_sale(&self) -> bool {
        self.kind == MovementKind::Sale
    }

    /// Calendar date of the movement (UTC), time of day dropped.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
