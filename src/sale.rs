//! Recording sales and reading them back for the dashboard.
//!
//! Sales are immutable once created. Recording a sale takes the sold items
//! out of the product's stock.

mod core;
mod endpoints;

pub use core::{NewSale, PaymentType, Sale, create_sale, create_sale_table, get_all_sales};
pub use endpoints::{create_sale_endpoint, get_sales_endpoint};
