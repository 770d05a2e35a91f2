//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a recorded sale.
pub type SaleId = DatabaseId;
/// The ID of a recorded expense.
pub type ExpenseId = DatabaseId;
/// The ID of a product in the catalog.
pub type ProductId = DatabaseId;
