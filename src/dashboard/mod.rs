//! Dashboard module
//!
//! Aggregates sales and expenses into the view models behind the dashboard
//! cards and charts. Includes filtering by year, month, week, day, category
//! and date range.

mod aggregation;
mod filter;
mod handlers;
mod summary;

pub use aggregation::{
    CategoryTotal, DayBucket, Entry, ItemTotal, ProductTotal, UNCATEGORIZED_LABEL, daily_totals,
    date_span, group_by_category, group_by_weekday, monthly_totals, product_totals, sum_by_day,
    sum_by_month, sum_by_year, sum_in_range,
};
pub use filter::{ExpenseFilter, ExpenseFilterQuery, SalesFilter, SalesFilterQuery};
pub use handlers::{
    get_expense_summary_endpoint, get_overview_endpoint, get_popular_products_endpoint,
    get_sales_summary_endpoint,
};
pub use summary::{
    ExpenseSummary, LabelledValue, Overview, PeriodChange, PopularProduct, SalesSummary, Trend,
    build_expense_summary, build_overview, build_popular_products, build_sales_summary,
    most_productive,
};
