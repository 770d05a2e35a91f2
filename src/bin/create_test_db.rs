use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, Month, Time};

use stockroom::{
    ExpenseReason, NewExpense, NewProduct, NewSale, PaymentType, ProductName, build_overview,
    create_expense, create_product, create_sale, format_amount, get_all_expenses, get_all_sales,
    initialize_db,
};

/// A utility for creating a test database for the stockroom REST API server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of days of sales and expenses to generate.
    #[arg(long, default_value_t = 90)]
    days: u16,
}

const PRODUCTS: [(&str, f64, u32); 6] = [
    ("Rice 5kg", 4500.0, 40),
    ("Palm Oil 1L", 1500.0, 30),
    ("Sugar 1kg", 800.0, 30),
    ("Bar Soap", 250.0, 50),
    ("Tomato Paste", 350.0, 3),
    ("Powdered Milk 400g", 2800.0, 200),
];

const PAYMENT_TYPES: [PaymentType; 3] = [
    PaymentType::Cash,
    PaymentType::MobileMoney,
    PaymentType::OtherMobileMoney,
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating products...");
    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for (index, (name, price, stock)) in PRODUCTS.into_iter().enumerate() {
        // The first four products are sold every few days and need enough stock for every sale.
        let stock = if index < 4 {
            stock + u32::from(args.days) * 3
        } else {
            stock
        };
        let product = create_product(
            NewProduct::build(ProductName::new(name)?, price).stock_quantity(stock),
            &conn,
        )?;
        product_ids.push(product.id);
    }

    let last_day = Date::from_calendar_date(2024, Month::June, 30)?;
    let first_day = last_day - Duration::days(i64::from(args.days.saturating_sub(1)));

    println!("Creating sales and expenses from {first_day} to {last_day}...");
    let mut date = first_day;
    let mut day_number: usize = 0;

    while date <= last_day {
        // Skip the lone low-stock product so it keeps raising an alert.
        for (slot, &product_id) in product_ids.iter().enumerate().take(4) {
            if (day_number + slot) % 3 == 0 {
                continue;
            }

            create_sale(
                NewSale {
                    product_id,
                    quantity: (1 + (day_number + slot) % 3) as u32,
                    unit_price: None,
                    discount: if day_number % 7 == 5 { 10.0 } else { 0.0 },
                    payment_type: PAYMENT_TYPES[(day_number + slot) % PAYMENT_TYPES.len()],
                    sale_date: date,
                    sale_time: Time::from_hms(9 + slot as u8 * 2, 15, 0)?,
                },
                &conn,
            )?;
        }

        if day_number % 4 == 0 {
            create_expense(
                NewExpense {
                    expense_date: date,
                    reason: ExpenseReason::new("Shop Supplies")?,
                    details: Some("Bags and cleaning products".to_owned()),
                    amount: 1200.0 + (day_number % 5) as f64 * 150.0,
                },
                &conn,
            )?;
        }

        if date.day() == 28 {
            create_expense(
                NewExpense {
                    expense_date: date,
                    reason: ExpenseReason::new("Salaries")?,
                    details: None,
                    amount: 60_000.0,
                },
                &conn,
            )?;
        }

        date = date.next_day().ok_or("ran out of dates")?;
        day_number += 1;
    }

    let overview = build_overview(&get_all_sales(&conn)?, &get_all_expenses(&conn)?);
    println!(
        "Created {} sales worth {} and {} expenses worth {}.",
        overview.sale_count,
        format_amount(overview.total_sales),
        overview.expense_count,
        format_amount(overview.total_expenses)
    );

    println!("Success!");

    Ok(())
}
