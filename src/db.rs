//! Creates the application's database tables.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, expense::create_expense_table, preferences::create_preferences_table,
    product::create_product_table, sale::create_sale_table,
};

/// Create the tables for products, sales, expenses and UI preferences.
///
/// Tables that already exist are left untouched, so this is safe to call on
/// every start up.
///
/// # Errors
/// Returns an [Error::SqlError] if any table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_product_table(&transaction)?;
    create_sale_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_preferences_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
