use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    sale::core::{NewSale, Sale, create_sale, get_all_sales},
};

/// The state needed for recording and listing sales.
#[derive(Debug, Clone)]
pub struct SaleState {
    /// The database connection for managing sales.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SaleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List every recorded sale, oldest first.
pub async fn get_sales_endpoint(State(state): State<SaleState>) -> Result<Json<Vec<Sale>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_sales(&connection).map(Json)
}

/// Record a sale and take the sold items out of stock.
pub async fn create_sale_endpoint(
    State(state): State<SaleState>,
    Json(new_sale): Json<NewSale>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let sale = create_sale(new_sale, &connection)
        .inspect_err(|error| tracing::warn!("could not record sale: {error}"))?;

    Ok((StatusCode::CREATED, Json(sale)).into_response())
}
