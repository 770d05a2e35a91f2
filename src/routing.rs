//! Application router configuration.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};

use crate::{
    AppState,
    dashboard::{
        get_expense_summary_endpoint, get_overview_endpoint, get_popular_products_endpoint,
        get_sales_summary_endpoint,
    },
    endpoints,
    expense::{create_expense_endpoint, get_expenses_endpoint},
    logging::logging_middleware,
    preferences::{get_preferences_endpoint, save_preferences_endpoint},
    product::{
        create_product_endpoint, deactivate_product_endpoint, dismiss_low_stock_alert_endpoint,
        get_low_stock_alerts_endpoint, get_products_endpoint, restock_product_endpoint,
        update_product_endpoint,
    },
    sale::{create_sale_endpoint, get_sales_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::SALES,
            get(get_sales_endpoint).post(create_sale_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            get(get_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::PRODUCTS,
            get(get_products_endpoint).post(create_product_endpoint),
        )
        .route(
            endpoints::LOW_STOCK_ALERTS,
            get(get_low_stock_alerts_endpoint),
        )
        .route(
            endpoints::PRODUCT,
            put(update_product_endpoint).delete(deactivate_product_endpoint),
        )
        .route(endpoints::PRODUCT_STOCK, put(restock_product_endpoint))
        .route(
            endpoints::DISMISS_LOW_STOCK_ALERT,
            post(dismiss_low_stock_alert_endpoint),
        )
        .route(
            endpoints::PREFERENCES,
            get(get_preferences_endpoint).put(save_preferences_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_overview_endpoint))
        .route(endpoints::DASHBOARD_SALES, get(get_sales_summary_endpoint))
        .route(
            endpoints::DASHBOARD_EXPENSES,
            get(get_expense_summary_endpoint),
        )
        .route(
            endpoints::DASHBOARD_POPULAR_PRODUCTS,
            get(get_popular_products_endpoint),
        )
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard overview.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD);
    }
}
