//! Stockroom is the backend of a small-business inventory and point-of-sale app.
//!
//! This library provides a JSON REST API for the product catalog, sales and
//! expenses, plus the dashboard summaries built from them.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod calendar;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
mod expense;
mod logging;
mod money;
mod preferences;
mod product;
mod records;
mod routing;
mod sale;
mod timezone;

pub use app_state::AppState;
pub use calendar::{DateRange, WeekRange, compute_week_date_range, compute_week_ranges};
pub use dashboard::{
    CategoryTotal, DayBucket, Entry, ExpenseFilter, ExpenseFilterQuery, ExpenseSummary, ItemTotal,
    LabelledValue, Overview, PeriodChange, PopularProduct, ProductTotal, SalesFilter,
    SalesFilterQuery, SalesSummary, Trend, UNCATEGORIZED_LABEL, build_expense_summary,
    build_overview, build_popular_products, build_sales_summary, daily_totals, date_span,
    group_by_category, group_by_weekday, monthly_totals, most_productive, product_totals,
    sum_by_day, sum_by_month, sum_by_year, sum_in_range,
};
pub use database_id::{DatabaseId, ExpenseId, ProductId, SaleId};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{Expense, ExpenseReason, NewExpense, create_expense, get_all_expenses};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::{CURRENCY, format_amount};
pub use preferences::{UiPreferences, get_preferences, save_preferences};
pub use product::{
    LOW_STOCK_THRESHOLD, NewProduct, Product, ProductName, ProductUpdate, create_product,
    deactivate_product, dismiss_low_stock_alert, get_low_stock_alerts, get_product, get_products,
    restock_product, update_product,
};
pub use records::{RecordSource, Records, load_records};
pub use routing::build_router;
pub use sale::{NewSale, PaymentType, Sale, create_sale, get_all_sales};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
