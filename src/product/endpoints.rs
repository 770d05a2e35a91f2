//! HTTP handlers for managing the product catalog.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::ProductId,
    product::core::{
        NewProduct, Product, ProductUpdate, create_product, deactivate_product,
        dismiss_low_stock_alert, get_low_stock_alerts, get_products, restock_product,
        update_product,
    },
};

/// The state needed for the product endpoints.
#[derive(Debug, Clone)]
pub struct ProductState {
    /// The database connection for managing products.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProductState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string for listing products.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Only list products whose name contains this text.
    pub search: Option<String>,
}

/// The request body for restocking a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockForm {
    /// The new stock quantity, which must not be less than the current one.
    pub stock_quantity: u32,
}

/// A low-stock alert for display in the inventory view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockAlert {
    product_id: ProductId,
    product_name: String,
    stock_quantity: u32,
    message: String,
}

impl From<Product> for LowStockAlert {
    fn from(product: Product) -> Self {
        Self {
            message: format!(
                "Low stock: {} - only {} left",
                product.name, product.stock_quantity
            ),
            product_id: product.id,
            product_name: product.name,
            stock_quantity: product.stock_quantity,
        }
    }
}

/// List the products in the catalog, optionally filtered by name.
pub async fn get_products_endpoint(
    State(state): State<ProductState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_products(query.search.as_deref(), &connection).map(Json)
}

/// Add a product to the catalog.
pub async fn create_product_endpoint(
    State(state): State<ProductState>,
    Json(new_product): Json<NewProduct>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let product = create_product(new_product, &connection)
        .inspect_err(|error| tracing::warn!("could not create product: {error}"))?;

    Ok((StatusCode::CREATED, Json(product)).into_response())
}

/// Change the details of a product.
pub async fn update_product_endpoint(
    State(state): State<ProductState>,
    Path(product_id): Path<ProductId>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_product(product_id, update, &connection).map(Json)
}

/// Set the stock quantity of a product after a delivery.
pub async fn restock_product_endpoint(
    State(state): State<ProductState>,
    Path(product_id): Path<ProductId>,
    Json(form): Json<RestockForm>,
) -> Result<Json<Product>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    restock_product(product_id, form.stock_quantity, &connection).map(Json)
}

/// Mark an out of stock product as inactive.
pub async fn deactivate_product_endpoint(
    State(state): State<ProductState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Product>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    deactivate_product(product_id, &connection).map(Json)
}

/// List the current low-stock alerts.
pub async fn get_low_stock_alerts_endpoint(
    State(state): State<ProductState>,
) -> Result<Json<Vec<LowStockAlert>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let alerts = get_low_stock_alerts(&connection)?
        .into_iter()
        .map(LowStockAlert::from)
        .collect();

    Ok(Json(alerts))
}

/// Hide the low-stock alert of a product until it is restocked.
pub async fn dismiss_low_stock_alert_endpoint(
    State(state): State<ProductState>,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    dismiss_low_stock_alert(product_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
