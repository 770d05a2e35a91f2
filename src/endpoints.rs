//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/products/{product_id}', use [format_endpoint].

/// The root route which redirects to the dashboard overview.
pub const ROOT: &str = "/";
/// The route to list and record sales.
pub const SALES: &str = "/api/sales";
/// The route to list and record expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to list and create products.
pub const PRODUCTS: &str = "/api/products";
/// The route to update or deactivate a single product.
pub const PRODUCT: &str = "/api/products/{product_id}";
/// The route to restock a product.
pub const PRODUCT_STOCK: &str = "/api/products/{product_id}/stock";
/// The route to dismiss the low-stock alert of a product.
pub const DISMISS_LOW_STOCK_ALERT: &str = "/api/products/{product_id}/dismiss_alert";
/// The route for listing pending low-stock alerts.
pub const LOW_STOCK_ALERTS: &str = "/api/products/low_stock";
/// The route to read and save the UI preferences.
pub const PREFERENCES: &str = "/api/preferences";
/// The dashboard overview (stat cards).
pub const DASHBOARD: &str = "/api/dashboard";
/// The detailed sales summary for a selected year, month, week and day.
pub const DASHBOARD_SALES: &str = "/api/dashboard/sales";
/// The expense summary for a selected category and date range.
pub const DASHBOARD_EXPENSES: &str = "/api/dashboard/expenses";
/// Products ranked by sales.
pub const DASHBOARD_POPULAR_PRODUCTS: &str = "/api/dashboard/popular_products";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/products/{product_id}', '{product_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
