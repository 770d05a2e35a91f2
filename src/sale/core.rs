use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, Time};

use crate::{
    Error,
    calendar::{DATE_FORMAT, TIME_FORMAT, parse_date, parse_time},
    database_id::{ProductId, SaleId},
    product::{get_product, take_stock},
};

time::serde::format_description!(clock_time, Time, "[hour]:[minute]:[second]");

// ============================================================================
// MODELS
// ============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    /// Paid in cash.
    Cash,
    /// Paid with a mobile money wallet.
    #[serde(rename = "Momo", alias = "MobileMoney")]
    MobileMoney,
    /// Paid with another provider's mobile money wallet.
    #[serde(rename = "OM", alias = "OtherMobileMoney")]
    OtherMobileMoney,
}

impl PaymentType {
    /// The name the payment type is stored under.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "Cash",
            PaymentType::MobileMoney => "Momo",
            PaymentType::OtherMobileMoney => "OM",
        }
    }

    /// Parse a stored payment type, accepting the long and short names.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "Cash" => Some(PaymentType::Cash),
            "Momo" | "MobileMoney" => Some(PaymentType::MobileMoney),
            "OM" | "OtherMobileMoney" => Some(PaymentType::OtherMobileMoney),
            _ => None,
        }
    }
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded sale of one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// The ID of the sale.
    pub id: SaleId,
    /// How the customer paid.
    pub payment_type: PaymentType,
    /// The day of the sale.
    pub sale_date: Date,
    /// The time of day of the sale.
    #[serde(with = "clock_time")]
    pub sale_time: Time,
    /// The product that was sold.
    pub product_id: ProductId,
    /// The name of the product at the time of the sale.
    pub product_name: String,
    /// How many items were sold.
    pub quantity: u32,
    /// The price of a single item.
    pub unit_price: f64,
    /// The discount as a percentage between 0 and 100.
    pub discount: f64,
    /// What the customer paid after the discount.
    pub total_amount: f64,
}

impl Sale {
    /// The amount taken off the undiscounted price.
    pub fn discount_amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price * self.discount / 100.0
    }
}

/// The data needed to record a sale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    /// The product being sold.
    pub product_id: ProductId,
    /// How many items are sold.
    pub quantity: u32,
    /// The price of a single item. Defaults to the product's price.
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// The discount as a percentage between 0 and 100.
    #[serde(default)]
    pub discount: f64,
    /// How the customer paid.
    pub payment_type: PaymentType,
    /// The day of the sale.
    pub sale_date: Date,
    /// The time of day of the sale.
    #[serde(with = "clock_time")]
    pub sale_time: Time,
}

/// The amount a customer pays for `quantity` items at `unit_price` each after
/// taking `discount` percent off.
pub fn total_amount(quantity: u32, unit_price: f64, discount: f64) -> f64 {
    quantity as f64 * unit_price * (1.0 - discount / 100.0)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record a sale and take the sold items out of stock.
///
/// Both changes happen in one database transaction, so a failed sale leaves
/// the stock untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidQuantity], [Error::InvalidDiscount] or [Error::InvalidPrice] for invalid input,
/// - [Error::InvalidProduct] if the product does not exist,
/// - [Error::InactiveProduct] if the product is no longer sold,
/// - [Error::InsufficientStock] if there are not enough items in stock,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_sale(new_sale: NewSale, connection: &Connection) -> Result<Sale, Error> {
    if new_sale.quantity == 0 {
        return Err(Error::InvalidQuantity);
    }

    if !new_sale.discount.is_finite() || !(0.0..=100.0).contains(&new_sale.discount) {
        return Err(Error::InvalidDiscount(new_sale.discount));
    }

    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    let transaction = connection.unchecked_transaction()?;

    let product = get_product(new_sale.product_id, &transaction).map_err(|error| match error {
        Error::NotFound => Error::InvalidProduct(new_sale.product_id),
        error => error,
    })?;

    if !product.active {
        return Err(Error::InactiveProduct(product.id));
    }

    if product.stock_quantity < new_sale.quantity {
        return Err(Error::InsufficientStock {
            available: product.stock_quantity,
            requested: new_sale.quantity,
        });
    }

    let unit_price = new_sale.unit_price.unwrap_or(product.price);

    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(Error::InvalidPrice(unit_price));
    }

    let total_amount = total_amount(new_sale.quantity, unit_price, new_sale.discount);
    let sale_date = new_sale
        .sale_date
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| new_sale.sale_date.to_string());
    let sale_time = new_sale
        .sale_time
        .format(TIME_FORMAT)
        .unwrap_or_else(|_| new_sale.sale_time.to_string());

    transaction.execute(
        "INSERT INTO sale (payment_type, sale_date, sale_time, product_id, product_name, quantity, unit_price, discount, total_amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            new_sale.payment_type.as_str(),
            sale_date,
            sale_time,
            product.id,
            &product.name,
            new_sale.quantity,
            unit_price,
            new_sale.discount,
            total_amount,
        ),
    )?;
    let id = transaction.last_insert_rowid();

    take_stock(product.id, new_sale.quantity, &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "Sold {} x {} for {total_amount} ({})",
        new_sale.quantity,
        product.name,
        new_sale.payment_type
    );

    Ok(Sale {
        id,
        payment_type: new_sale.payment_type,
        sale_date: new_sale.sale_date,
        sale_time: new_sale.sale_time,
        product_id: product.id,
        product_name: product.name,
        quantity: new_sale.quantity,
        unit_price,
        discount: new_sale.discount,
        total_amount,
    })
}

/// A sale row as stored, before its text columns are parsed.
struct StoredSale {
    id: SaleId,
    payment_type: String,
    sale_date: String,
    sale_time: String,
    product_id: ProductId,
    product_name: String,
    quantity: i64,
    unit_price: f64,
    discount: f64,
    total_amount: f64,
}

impl StoredSale {
    fn parse(self) -> Option<Sale> {
        let payment_type = PaymentType::parse(&self.payment_type)?;
        let sale_date = parse_date(&self.sale_date)?;
        let sale_time = parse_time(&self.sale_time)?;
        let quantity = u32::try_from(self.quantity).ok().filter(|&q| q > 0)?;

        if !(self.unit_price.is_finite()
            && self.discount.is_finite()
            && self.total_amount.is_finite())
        {
            return None;
        }

        Some(Sale {
            id: self.id,
            payment_type,
            sale_date,
            sale_time,
            product_id: self.product_id,
            product_name: self.product_name,
            quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            total_amount: self.total_amount,
        })
    }
}

/// Retrieve every sale, oldest first.
///
/// Rows with a malformed date, time, payment type or amount are skipped and
/// logged rather than failing the whole query.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_all_sales(connection: &Connection) -> Result<Vec<Sale>, Error> {
    let stored_sales = connection
        .prepare(
            "SELECT id, payment_type, sale_date, sale_time, product_id, product_name, quantity, unit_price, discount, total_amount
             FROM sale
             ORDER BY sale_date ASC, sale_time ASC, id ASC",
        )?
        .query_map([], map_stored_sale_row)?
        .collect::<Result<Vec<StoredSale>, rusqlite::Error>>()?;

    let sales = stored_sales
        .into_iter()
        .filter_map(|stored| {
            let id = stored.id;
            let sale = stored.parse();

            if sale.is_none() {
                tracing::warn!("skipping malformed sale record {id}");
            }

            sale
        })
        .collect();

    Ok(sales)
}

/// Create the sale table in the database.
///
/// Dates and times are stored as text so that malformed rows can be detected
/// when they are read back.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_sale_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS sale (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payment_type TEXT NOT NULL,
                sale_date TEXT NOT NULL,
                sale_time TEXT NOT NULL,
                product_id INTEGER NOT NULL,
                product_name TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                unit_price REAL NOT NULL,
                discount REAL NOT NULL DEFAULT 0,
                total_amount REAL NOT NULL,
                FOREIGN KEY(product_id) REFERENCES product(id) ON UPDATE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_sale_date ON sale(sale_date)",
        (),
    )?;

    Ok(())
}

fn map_stored_sale_row(row: &Row) -> Result<StoredSale, rusqlite::Error> {
    Ok(StoredSale {
        id: row.get(0)?,
        payment_type: row.get(1)?,
        sale_date: row.get(2)?,
        sale_time: row.get(3)?,
        product_id: row.get(4)?,
        product_name: row.get(5)?,
        quantity: row.get(6)?,
        unit_price: row.get(7)?,
        discount: row.get(8)?,
        total_amount: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
