//! Stock mutations handled by [`InventoryItem`](crate::model::InventoryItem).

use rust_decimal::Decimal;

/// Custom actions for inventory items.
///
/// Both return a [`StockLevel`](crate::model::StockLevel) with the stock before and after.
#[derive(Debug, Clone)]
pub enum StockAction {
    /// Adds a signed delta. Negative for consumption, positive for restock.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` when the result would be below zero.
    Apply(Decimal),
    /// Replaces the stock with a counted level.
    Recount(Decimal),
}
