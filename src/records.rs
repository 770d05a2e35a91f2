//! Fetching the sale and expense records that the dashboard summarises.

use rusqlite::Connection;

use crate::{
    Error,
    expense::{Expense, get_all_expenses},
    sale::{Sale, get_all_sales},
};

/// A source of sale and expense records.
///
/// Implementations return every well-formed record they hold, skipping
/// malformed ones.
pub trait RecordSource {
    /// Fetch all sales.
    fn fetch_sales(&self) -> Result<Vec<Sale>, Error>;

    /// Fetch all expenses.
    fn fetch_expenses(&self) -> Result<Vec<Expense>, Error>;
}

impl RecordSource for Connection {
    fn fetch_sales(&self) -> Result<Vec<Sale>, Error> {
        get_all_sales(self)
    }

    fn fetch_expenses(&self) -> Result<Vec<Expense>, Error> {
        get_all_expenses(self)
    }
}

/// The sale and expense records loaded for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records {
    /// Every well-formed sale.
    pub sales: Vec<Sale>,
    /// Every well-formed expense.
    pub expenses: Vec<Expense>,
}

/// Load all sales and expenses from `source`.
///
/// # Errors
/// Returns [Error::DataUnavailable] if either fetch fails. No partial result
/// is returned, so nothing is aggregated from incomplete data.
pub fn load_records(source: &impl RecordSource) -> Result<Records, Error> {
    let sales = source
        .fetch_sales()
        .inspect_err(|error| tracing::error!("could not fetch sales: {error}"))
        .map_err(|_| Error::DataUnavailable)?;
    let expenses = source
        .fetch_expenses()
        .inspect_err(|error| tracing::error!("could not fetch expenses: {error}"))
        .map_err(|_| Error::DataUnavailable)?;

    Ok(Records { sales, expenses })
}
