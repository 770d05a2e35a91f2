//! Defines the product model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, database_id::ProductId};

/// Active products with fewer items than this in stock raise a low-stock alert.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

const PRODUCT_COLUMNS: &str =
    "id, name, price, rating, stock_quantity, image_url, active, low_stock_alert_dismissed";

// ============================================================================
// MODELS
// ============================================================================

/// The name of a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ProductName {
    /// Create a product name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyProductName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyProductName)
        } else {
            Ok(Self(name.to_string()))
        }
    }
}

impl TryFrom<String> for ProductName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ProductName> for String {
    fn from(value: ProductName) -> Self {
        value.0
    }
}

impl AsRef<str> for ProductName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An item the shop sells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// The ID of the product.
    pub id: ProductId,
    /// The unique name of the product.
    pub name: String,
    /// The default unit price.
    pub price: f64,
    /// An optional star rating between 0 and 5.
    pub rating: Option<f64>,
    /// How many items are in stock.
    pub stock_quantity: u32,
    /// A link to a picture of the product.
    pub image_url: Option<String>,
    /// Whether the product is still offered for sale.
    pub active: bool,
    /// Whether the low-stock alert has been dismissed since the last restock.
    pub low_stock_alert_dismissed: bool,
}

impl Product {
    /// Whether this product should currently raise a low-stock alert.
    pub fn needs_low_stock_alert(&self) -> bool {
        self.active && self.stock_quantity < LOW_STOCK_THRESHOLD && !self.low_stock_alert_dismissed
    }
}

/// The data needed to add a product to the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    /// The unique name of the product.
    pub name: ProductName,
    /// The default unit price.
    pub price: f64,
    /// An optional star rating between 0 and 5.
    #[serde(default)]
    pub rating: Option<f64>,
    /// The initial stock quantity.
    #[serde(default)]
    pub stock_quantity: u32,
    /// A link to a picture of the product.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Start building a new product with no rating, stock or image.
    pub fn build(name: ProductName, price: f64) -> Self {
        Self {
            name,
            price,
            rating: None,
            stock_quantity: 0,
            image_url: None,
        }
    }

    /// Set the initial stock quantity.
    pub fn stock_quantity(mut self, stock_quantity: u32) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }

    /// Set the star rating.
    pub fn rating(mut self, rating: Option<f64>) -> Self {
        self.rating = rating;
        self
    }
}

/// Changes to the details of a product. Fields left as `None` are unchanged.
///
/// The rating and picture can be cleared with `Some(None)`, which a JSON
/// `null` deserialises to.
///
/// Stock changes go through [restock_product] and the active flag through
/// [deactivate_product].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    /// The new name.
    pub name: Option<ProductName>,
    /// The new default unit price.
    pub price: Option<f64>,
    /// The new star rating.
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub rating: Option<Option<f64>>,
    /// The new picture link.
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub image_url: Option<Option<String>>,
}

/// Deserialise a present field, including `null`, as `Some`. Missing fields
/// fall back to `None` through `#[serde(default)]`.
fn deserialize_clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Escape the `LIKE` wildcards in `text` so it matches literally with `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

fn validate_price(price: f64) -> Result<f64, Error> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(Error::InvalidPrice(price))
    }
}

fn validate_rating(rating: Option<f64>) -> Result<Option<f64>, Error> {
    match rating {
        Some(rating) if !(0.0..=5.0).contains(&rating) => Err(Error::InvalidRating(rating)),
        rating => Ok(rating),
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Add a product to the catalog.
///
/// New products are active when they have stock.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidPrice] or [Error::InvalidRating] for out of range values,
/// - [Error::DuplicateProductName] if the name is taken,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_product(product: NewProduct, connection: &Connection) -> Result<Product, Error> {
    let price = validate_price(product.price)?;
    let rating = validate_rating(product.rating)?;
    let active = product.stock_quantity > 0;

    connection
        .prepare(&format!(
            "INSERT INTO product (name, price, rating, stock_quantity, image_url, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {PRODUCT_COLUMNS}"
        ))?
        .query_row(
            (
                product.name.as_ref(),
                price,
                rating,
                product.stock_quantity,
                &product.image_url,
                active,
            ),
            map_product_row,
        )
        .map_err(|error| map_unique_name_error(error, &product.name))
}

/// Retrieve a product by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such product or [Error::SqlError]
/// if there is some other SQL error.
pub fn get_product(id: ProductId, connection: &Connection) -> Result<Product, Error> {
    connection
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_product_row)
        .map_err(|error| error.into())
}

/// Retrieve all products ordered by name.
///
/// If `search` is given, only products whose name contains it (ignoring case) are returned.
pub fn get_products(search: Option<&str>, connection: &Connection) -> Result<Vec<Product>, Error> {
    let search = search
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(escape_like);

    connection
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE ?1 IS NULL OR name LIKE '%' || ?1 || '%' ESCAPE '\\'
             ORDER BY name COLLATE NOCASE ASC"
        ))?
        .query_map([search], map_product_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Change the name, price, rating or picture of a product.
///
/// # Errors
/// Returns [Error::UpdateMissingProduct] if the product does not exist, a
/// validation error for out of range values, or [Error::DuplicateProductName].
pub fn update_product(
    id: ProductId,
    update: ProductUpdate,
    connection: &Connection,
) -> Result<Product, Error> {
    let current = get_existing_product(id, connection)?;

    let name = update
        .name
        .map(String::from)
        .unwrap_or(current.name.clone());
    let price = validate_price(update.price.unwrap_or(current.price))?;
    let rating = validate_rating(update.rating.unwrap_or(current.rating))?;
    let image_url = update.image_url.unwrap_or(current.image_url);

    connection
        .prepare(&format!(
            "UPDATE product SET name = ?1, price = ?2, rating = ?3, image_url = ?4
             WHERE id = ?5
             RETURNING {PRODUCT_COLUMNS}"
        ))?
        .query_row((&name, price, rating, &image_url, id), map_product_row)
        .map_err(|error| map_unique_name_error(error, &ProductName(name.clone())))
}

/// Set the stock quantity of a product after a delivery.
///
/// Restocking an inactive product makes it active again, and restocking to at
/// least [LOW_STOCK_THRESHOLD] items re-arms the low-stock alert.
///
/// # Errors
/// Returns [Error::UpdateMissingProduct] if the product does not exist, or
/// [Error::StockDecrease] if `stock_quantity` is less than the current stock.
pub fn restock_product(
    id: ProductId,
    stock_quantity: u32,
    connection: &Connection,
) -> Result<Product, Error> {
    let current = get_existing_product(id, connection)?;

    if stock_quantity < current.stock_quantity {
        return Err(Error::StockDecrease {
            current: current.stock_quantity,
            requested: stock_quantity,
        });
    }

    let active = current.active || stock_quantity > 0;
    let alert_dismissed =
        current.low_stock_alert_dismissed && stock_quantity < LOW_STOCK_THRESHOLD;

    let product = connection
        .prepare(&format!(
            "UPDATE product SET stock_quantity = ?1, active = ?2, low_stock_alert_dismissed = ?3
             WHERE id = ?4
             RETURNING {PRODUCT_COLUMNS}"
        ))?
        .query_row((stock_quantity, active, alert_dismissed, id), map_product_row)?;

    tracing::info!(
        "Restocked {} from {} to {}",
        product.name,
        current.stock_quantity,
        product.stock_quantity
    );

    Ok(product)
}

/// Mark a product as no longer offered for sale.
///
/// # Errors
/// Returns [Error::UpdateMissingProduct] if the product does not exist, or
/// [Error::ProductStillInStock] if it still has stock.
pub fn deactivate_product(id: ProductId, connection: &Connection) -> Result<Product, Error> {
    let current = get_existing_product(id, connection)?;

    if current.stock_quantity > 0 {
        return Err(Error::ProductStillInStock(current.stock_quantity));
    }

    connection
        .prepare(&format!(
            "UPDATE product SET active = 0 WHERE id = ?1 RETURNING {PRODUCT_COLUMNS}"
        ))?
        .query_row([id], map_product_row)
        .map_err(|error| error.into())
}

/// Get the products that should currently raise a low-stock alert.
///
/// These are the active products with fewer than [LOW_STOCK_THRESHOLD] items
/// in stock whose alert has not been dismissed.
pub fn get_low_stock_alerts(connection: &Connection) -> Result<Vec<Product>, Error> {
    connection
        .prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE active = 1 AND stock_quantity < ?1 AND low_stock_alert_dismissed = 0
             ORDER BY name COLLATE NOCASE ASC"
        ))?
        .query_map([LOW_STOCK_THRESHOLD], map_product_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Dismiss the low-stock alert of a product until it is restocked.
///
/// # Errors
/// Returns [Error::UpdateMissingProduct] if the product does not exist.
pub fn dismiss_low_stock_alert(id: ProductId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE product SET low_stock_alert_dismissed = 1 WHERE id = ?1",
        [id],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingProduct);
    }

    Ok(())
}

/// Remove `quantity` items of a product from stock for a sale.
///
/// The caller is expected to have checked that enough stock is available.
pub(crate) fn take_stock(
    id: ProductId,
    quantity: u32,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE product SET stock_quantity = stock_quantity - ?1
         WHERE id = ?2 AND stock_quantity >= ?1",
        (quantity, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingProduct);
    }

    Ok(())
}

/// Create the product table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_product_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS product (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                price REAL NOT NULL,
                rating REAL,
                stock_quantity INTEGER NOT NULL DEFAULT 0,
                image_url TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                low_stock_alert_dismissed INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

fn get_existing_product(id: ProductId, connection: &Connection) -> Result<Product, Error> {
    get_product(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingProduct,
        error => error,
    })
}

fn map_unique_name_error(error: rusqlite::Error, name: &ProductName) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateProductName(name.as_ref().to_owned()),
        error => error.into(),
    }
}

fn map_product_row(row: &Row) -> Result<Product, rusqlite::Error> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        rating: row.get(3)?,
        stock_quantity: row.get(4)?,
        image_url: row.get(5)?,
        active: row.get(6)?,
        low_stock_alert_dismissed: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod product_name_tests {
    use crate::{Error, product::ProductName};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(ProductName::new(""), Err(Error::EmptyProductName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(ProductName::new("\n\t \r"), Err(Error::EmptyProductName));
    }

    #[test]
    fn new_trims_whitespace() {
        let name = ProductName::new("  Rice 5kg ").unwrap();

        assert_eq!(name.as_ref(), "Rice 5kg");
    }
}
