use std::sync::Arc;

use forgecast_core::{DomainResult, ProductId};

use crate::movement::Movement;
use crate::product::ProductSnapshot;

/// Read-only access to the catalog and stock ledger.
///
/// Implementations return `DomainError::NotFound` for unknown products and
/// `DomainError::Unavailable` when the backing store cannot be read. Movement
/// history carries no ordering guarantee.
pub trait InventoryReader: Send + Sync {
    fn product(&self, id: ProductId) -> DomainResult<ProductSnapshot>;

    fn movement_history(&self, id: ProductId) -> DomainResult<Vec<Movement>>;

    fn list_products(&self) -> DomainResult<Vec<ProductSnapshot>>;
}

impl<R> InventoryReader for Arc<R>
where
    R: InventoryReader + ?Sized,
{
    fn product(&self, id: ProductId) -> DomainResult<ProductSnapshot> {
        (**self).product(id)
    }

    fn movement_history(&self, id: ProductId) -> DomainResult<Vec<Movement>> {
        (**self).movement_history(id)
    }

    fn list_products(&self) -> DomainResult<Vec<ProductSnapshot>> {
        (**self).list_products()
    }
}

impl<R> InventoryReader for &R
where
    R: InventoryReader + ?Sized,
{
    fn product(&self, id: ProductId) -> DomainResult<ProductSnapshot> {
        (**self).product(id)
    }

    fn movement_history(&self, id: ProductId) -> DomainResult<Vec<Movement>> {
        (**self).movement_history(id)
    }

    fn list_products(&self) -> DomainResult<Vec<ProductSnapshot>> {
        (**self).list_products()
    }
}
