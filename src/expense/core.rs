use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    calendar::{DATE_FORMAT, parse_date},
    database_id::ExpenseId,
};

// ============================================================================
// MODELS
// ============================================================================

/// The reason for an expense, e.g. "Shop Supplies" or "Salaries".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ExpenseReason(String);

impl ExpenseReason {
    /// Create an expense reason.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyExpenseReason] if `reason` is empty or only whitespace.
    pub fn new(reason: &str) -> Result<Self, Error> {
        let reason = reason.trim();

        if reason.is_empty() {
            Err(Error::EmptyExpenseReason)
        } else {
            Ok(Self(reason.to_string()))
        }
    }
}

impl TryFrom<String> for ExpenseReason {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ExpenseReason> for String {
    fn from(value: ExpenseReason) -> Self {
        value.0
    }
}

impl AsRef<str> for ExpenseReason {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money spent running the shop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The day the money was spent.
    pub expense_date: Date,
    /// The category of the expense.
    pub reason: String,
    /// Free-form notes.
    pub details: Option<String>,
    /// How much was spent.
    pub amount: f64,
}

/// The data needed to record an expense.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// The day the money was spent.
    pub expense_date: Date,
    /// The category of the expense.
    pub reason: ExpenseReason,
    /// Free-form notes.
    #[serde(default)]
    pub details: Option<String>,
    /// How much was spent.
    pub amount: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record an expense.
///
/// Blank details are stored as `None`.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is negative or not finite, or
/// [Error::SqlError] if there is an SQL error.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    if !new_expense.amount.is_finite() || new_expense.amount < 0.0 {
        return Err(Error::InvalidAmount(new_expense.amount));
    }

    let details = new_expense
        .details
        .map(|details| details.trim().to_owned())
        .filter(|details| !details.is_empty());
    let expense_date = new_expense
        .expense_date
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| new_expense.expense_date.to_string());

    connection.execute(
        "INSERT INTO expense (expense_date, reason, details, amount) VALUES (?1, ?2, ?3, ?4)",
        (
            expense_date,
            new_expense.reason.as_ref(),
            &details,
            new_expense.amount,
        ),
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        expense_date: new_expense.expense_date,
        reason: new_expense.reason.into(),
        details,
        amount: new_expense.amount,
    })
}

/// Retrieve every expense, oldest first.
///
/// Rows with a malformed date or amount are skipped and logged.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    let rows = connection
        .prepare(
            "SELECT id, expense_date, reason, details, amount FROM expense
             ORDER BY expense_date ASC, id ASC",
        )?
        .query_map([], map_stored_expense_row)?
        .collect::<Result<Vec<(ExpenseId, String, Option<String>, Option<String>, f64)>, _>>()?;

    let expenses = rows
        .into_iter()
        .filter_map(|(id, expense_date, reason, details, amount)| {
            match (parse_date(&expense_date), amount.is_finite()) {
                (Some(expense_date), true) => Some(Expense {
                    id,
                    expense_date,
                    reason: reason.unwrap_or_default(),
                    details,
                    amount,
                }),
                _ => {
                    tracing::warn!("skipping malformed expense record {id}");
                    None
                }
            }
        })
        .collect();

    Ok(expenses)
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                expense_date TEXT NOT NULL,
                reason TEXT,
                details TEXT,
                amount REAL NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(expense_date)",
        (),
    )?;

    Ok(())
}

#[allow(clippy::type_complexity)]
fn map_stored_expense_row(
    row: &Row,
) -> Result<(ExpenseId, String, Option<String>, Option<String>, f64), rusqlite::Error> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize};

    use super::{ExpenseReason, NewExpense, create_expense, get_all_expenses};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_expense(reason: &str, amount: f64) -> NewExpense {
        NewExpense {
            expense_date: date!(2024 - 05 - 06),
            reason: ExpenseReason::new(reason).unwrap(),
            details: None,
            amount,
        }
    }

    #[test]
    fn reason_cannot_be_blank() {
        assert_eq!(ExpenseReason::new("  "), Err(Error::EmptyExpenseReason));
    }

    #[test]
    fn create_expense_succeeds() {
        let conn = get_test_connection();

        let expense = create_expense(
            NewExpense {
                details: Some("  brooms and soap ".to_owned()),
                ..new_expense("Shop Supplies", 2500.0)
            },
            &conn,
        )
        .unwrap();

        assert_eq!(expense.reason, "Shop Supplies");
        assert_eq!(expense.details.as_deref(), Some("brooms and soap"));
        assert_eq!(get_all_expenses(&conn).unwrap(), vec![expense]);
    }

    #[test]
    fn create_expense_rejects_invalid_amounts() {
        let conn = get_test_connection();

        assert_eq!(
            create_expense(new_expense("Salaries", -1.0), &conn),
            Err(Error::InvalidAmount(-1.0))
        );
        assert!(matches!(
            create_expense(new_expense("Salaries", f64::INFINITY), &conn),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn get_all_expenses_skips_malformed_dates() {
        let conn = get_test_connection();
        let expense = create_expense(new_expense("Salaries", 50_000.0), &conn).unwrap();
        conn.execute(
            "INSERT INTO expense (expense_date, reason, amount) VALUES ('yesterday', 'Salaries', 10.0)",
            (),
        )
        .unwrap();

        assert_eq!(get_all_expenses(&conn).unwrap(), vec![expense]);
    }

    #[test]
    fn stored_expenses_without_reason_have_empty_reason() {
        let conn = get_test_connection();
        conn.execute(
            "INSERT INTO expense (expense_date, amount) VALUES ('2024-05-06', 10.0)",
            (),
        )
        .unwrap();

        let expenses = get_all_expenses(&conn).unwrap();

        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].reason, "");
    }
}
