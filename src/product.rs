//! The product catalog: prices, stock levels, the active flag and low-stock alerts.
//!
//! The active flag and the low-stock alert dismissal are stored on the product
//! row and only change through the explicit calls in this module.

mod core;
mod endpoints;

pub use core::{
    LOW_STOCK_THRESHOLD, NewProduct, Product, ProductName, ProductUpdate, create_product,
    create_product_table, deactivate_product, dismiss_low_stock_alert, get_low_stock_alerts,
    get_product, get_products, restock_product, update_product,
};
pub(crate) use core::take_stock;
pub use endpoints::{
    create_product_endpoint, deactivate_product_endpoint, dismiss_low_stock_alert_endpoint,
    get_low_stock_alerts_endpoint, get_products_endpoint, restock_product_endpoint,
    update_product_endpoint,
};
