use serde::{Deserialize, Serialize};

use forgecast_core::{DomainError, DomainResult, ProductId};

/// Read-only view of a product as supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    /// Price per unit, in the catalog's currency.
    pub unit_price: f64,
    /// Current on-hand quantity.
    pub quantity: i64,
}

impl ProductSnapshot {
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: f64, quantity: i64) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if !(self.unit_price.is_finite() && self.unit_price >= 0.0) {
            return Err(DomainError::validation(
                "unit_price must be a finite non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_name() {
        let p = ProductSnapshot::new(ProductId::new(), "  ", 9.5, 10);
        assert!(matches!(p.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_negative_or_nan_price() {
        let p = ProductSnapshot::new(ProductId::new(), "Widget", -1.0, 10);
        assert!(p.validate().is_err());

        let p = ProductSnapshot::new(ProductId::new(), "Widget", f64::NAN, 10);
        assert!(p.validate().is_err());
    }

    #[test]
    fn accepts_free_product() {
        let p = ProductSnapshot::new(ProductId::new(), "Sample", 0.0, 0);
        assert!(p.validate().is_ok());
    }
}
