//! Dashboard HTTP handlers.
//!
//! Each handler loads the records once, runs one aggregation over them and
//! returns the resulting view model as JSON.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    dashboard::{
        filter::{ExpenseFilterQuery, SalesFilterQuery},
        summary::{
            ExpenseSummary, Overview, PopularProduct, SalesSummary, build_expense_summary,
            build_overview, build_popular_products, build_sales_summary,
        },
    },
    product::get_products,
    records::load_records,
    timezone::{get_local_offset, today},
};

/// The state needed for the dashboard endpoints.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading sales and expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Douala".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn local_today(local_timezone: &str) -> Result<Date, Error> {
    let Some(local_offset) = get_local_offset(local_timezone) else {
        tracing::error!("Invalid timezone {}", local_timezone);
        return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
    };

    Ok(today(local_offset))
}

/// Get the stat cards of the dashboard overview.
pub async fn get_overview_endpoint(
    State(state): State<DashboardState>,
) -> Result<Json<Overview>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let records = load_records(&*connection)?;

    Ok(Json(build_overview(&records.sales, &records.expenses)))
}

/// Get the sales summary for the selected year, month, week and day.
///
/// Missing or invalid selections default to the current month in the local
/// timezone, the first week and Monday.
pub async fn get_sales_summary_endpoint(
    State(state): State<DashboardState>,
    Query(query): Query<SalesFilterQuery>,
) -> Result<Json<SalesSummary>, Error> {
    let filter = query.resolve(local_today(&state.local_timezone)?);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let records = load_records(&*connection)?;

    Ok(Json(build_sales_summary(&records.sales, &filter)))
}

/// Get the expense summary for the selected category and dates.
pub async fn get_expense_summary_endpoint(
    State(state): State<DashboardState>,
    Query(query): Query<ExpenseFilterQuery>,
) -> Result<Json<ExpenseSummary>, Error> {
    let filter = query.resolve();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let records = load_records(&*connection)?;

    Ok(Json(build_expense_summary(&records.expenses, &filter)))
}

/// Get the catalog products ranked by sales.
pub async fn get_popular_products_endpoint(
    State(state): State<DashboardState>,
) -> Result<Json<Vec<PopularProduct>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let records = load_records(&*connection)?;
    let products = get_products(None, &connection)
        .inspect_err(|error| tracing::error!("could not get products: {error}"))
        .map_err(|_| Error::DataUnavailable)?;

    Ok(Json(build_popular_products(&records.sales, &products)))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State};
    use rusqlite::Connection;
    use time::macros::{date, time};

    use crate::{
        Error,
        db::initialize,
        expense::{ExpenseReason, NewExpense, create_expense},
        product::{NewProduct, ProductName, create_product},
        sale::{NewSale, PaymentType, create_sale},
    };

    use super::{DashboardState, get_overview_endpoint, get_popular_products_endpoint};

    fn get_test_state() -> DashboardState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let rice = create_product(
            NewProduct::build(ProductName::new("Rice").unwrap(), 4500.0).stock_quantity(10),
            &conn,
        )
        .unwrap();
        create_product(
            NewProduct::build(ProductName::new("Oil").unwrap(), 1500.0).stock_quantity(10),
            &conn,
        )
        .unwrap();
        create_sale(
            NewSale {
                product_id: rice.id,
                quantity: 2,
                unit_price: None,
                discount: 0.0,
                payment_type: PaymentType::Cash,
                sale_date: date!(2024 - 05 - 06),
                sale_time: time!(10:00),
            },
            &conn,
        )
        .unwrap();
        create_expense(
            NewExpense {
                expense_date: date!(2024 - 05 - 07),
                reason: ExpenseReason::new("Salaries").unwrap(),
                details: None,
                amount: 5000.0,
            },
            &conn,
        )
        .unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn overview_summarises_records() {
        let state = get_test_state();

        let Json(overview) = get_overview_endpoint(State(state)).await.unwrap();

        assert_eq!(overview.total_sales, 9000.0);
        assert_eq!(overview.total_expenses, 5000.0);
        assert_eq!(overview.net, 4000.0);
    }

    #[tokio::test]
    async fn popular_products_include_unsold_products() {
        let state = get_test_state();

        let Json(popular) = get_popular_products_endpoint(State(state)).await.unwrap();

        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].name, "Rice");
        assert_eq!(popular[0].quantity_sold, 2);
        assert_eq!(popular[1].name, "Oil");
        assert_eq!(popular[1].quantity_sold, 0);
    }

    #[tokio::test]
    async fn missing_tables_are_data_unavailable() {
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(Connection::open_in_memory().unwrap())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_overview_endpoint(State(state)).await;

        assert_eq!(result.err(), Some(Error::DataUnavailable));
    }
}
