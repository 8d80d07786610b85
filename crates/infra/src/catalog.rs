use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use forgecast_core::{DomainError, DomainResult, ProductId};
use forgecast_inventory::{InventoryReader, Movement, ProductSnapshot};

/// In-memory product catalog and stock ledger for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, ProductSnapshot>>,
    movements: RwLock<HashMap<ProductId, Vec<Movement>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_product(&self, product: ProductSnapshot) -> DomainResult<()> {
        product.validate()?;
        let mut map = self.products.write().map_err(|_| poisoned("products"))?;
        map.insert(product.id, product);
        Ok(())
    }

    /// Append a movement to its product's ledger. The product must exist.
    pub fn record_movement(&self, movement: Movement) -> DomainResult<()> {
        movement.validate()?;
        {
            let products = self.products.read().map_err(|_| poisoned("products"))?;
            if !products.contains_key(&movement.product_id) {
                return Err(DomainError::validation(format!(
                    "movement {} references unknown product {}",
                    movement.id, movement.product_id
                )));
            }
        }

        debug!(product = %movement.product_id, kind = ?movement.kind, quantity = movement.quantity, "movement recorded");
        let mut ledger = self.movements.write().map_err(|_| poisoned("movements"))?;
        ledger.entry(movement.product_id).or_default().push(movement);
        Ok(())
    }

    pub fn record_movements<I>(&self, movements: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = Movement>,
    {
        for m in movements {
            self.record_movement(m)?;
        }
        Ok(())
    }
}

fn poisoned(what: &str) -> DomainError {
    DomainError::unavailable(format!("{what} lock poisoned"))
}

impl InventoryReader for InMemoryCatalog {
    fn product(&self, id: ProductId) -> DomainResult<ProductSnapshot> {
        let map = self.products.read().map_err(|_| poisoned("products"))?;
        map.get(&id).cloned().ok_or_else(DomainError::not_found)
    }

    fn movement_history(&self, id: ProductId) -> DomainResult<Vec<Movement>> {
        let ledger = self.movements.read().map_err(|_| poisoned("movements"))?;
        Ok(ledger.get(&id).cloned().unwrap_or_default())
    }

    /// Products ordered by id for stable output.
    fn list_products(&self) -> DomainResult<Vec<ProductSnapshot>> {
        let map = self.products.read().map_err(|_| poisoned("products"))?;
        let mut products: Vec<ProductSnapshot> = map.values().cloned().collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }
}
