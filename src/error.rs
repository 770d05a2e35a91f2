//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::database_id::ProductId;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The sale or expense records could not be fetched, so no summary can be
    /// computed.
    #[error("sales and expense data is currently unavailable")]
    DataUnavailable,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A sale must sell at least one item.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Prices cannot be negative, infinite or NaN.
    #[error("{0} is not a valid price")]
    InvalidPrice(f64),

    /// A discount is a percentage between 0 and 100 inclusive.
    #[error("{0} is not a valid discount, expected a percentage between 0 and 100")]
    InvalidDiscount(f64),

    /// Expense amounts cannot be negative, infinite or NaN.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// Ratings are between 0 and 5 stars.
    #[error("{0} is not a valid rating, expected a number between 0 and 5")]
    InvalidRating(f64),

    /// An empty string was used to name a product.
    #[error("product name cannot be empty")]
    EmptyProductName,

    /// An expense was recorded without a reason.
    #[error("expense reason cannot be empty")]
    EmptyExpenseReason,

    /// The specified product name already exists in the database.
    #[error("the product \"{0}\" already exists")]
    DuplicateProductName(String),

    /// The product ID used to record a sale did not match a product.
    #[error("no product with the ID {0}")]
    InvalidProduct(ProductId),

    /// Inactive products cannot be sold.
    #[error("the product with the ID {0} is inactive")]
    InactiveProduct(ProductId),

    /// The sale asked for more items than are in stock.
    #[error("only {available} left in stock, cannot sell {requested}")]
    InsufficientStock {
        /// The current stock quantity.
        available: u32,
        /// The quantity the sale asked for.
        requested: u32,
    },

    /// Restocking can only increase the stock quantity.
    #[error("new stock quantity {requested} is less than the current stock quantity {current}")]
    StockDecrease {
        /// The current stock quantity.
        current: u32,
        /// The stock quantity that was requested.
        requested: u32,
    },

    /// Products can only be marked inactive once they are out of stock.
    #[error("cannot deactivate a product with {0} items still in stock")]
    ProductStillInStock(u32),

    /// Tried to update a product that does not exist
    #[error("tried to update a product that is not in the database")]
    UpdateMissingProduct,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound | Error::UpdateMissingProduct => StatusCode::NOT_FOUND,
            Error::InvalidQuantity
            | Error::InvalidPrice(_)
            | Error::InvalidDiscount(_)
            | Error::InvalidAmount(_)
            | Error::InvalidRating(_)
            | Error::EmptyProductName
            | Error::EmptyExpenseReason
            | Error::InvalidProduct(_)
            | Error::InactiveProduct(_)
            | Error::InsufficientStock { .. }
            | Error::StockDecrease { .. }
            | Error::ProductStillInStock(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateProductName(_) => StatusCode::CONFLICT,
            Error::DataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::SqlError(_) | Error::DatabaseLockError | Error::InvalidTimezoneError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        // Any errors that are not handled above are not intended to be shown to the client.
        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
