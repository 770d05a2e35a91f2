//! Recording shop expenses such as supplies and salaries.

mod core;
mod endpoints;

pub use core::{
    Expense, ExpenseReason, NewExpense, create_expense, create_expense_table, get_all_expenses,
};
pub use endpoints::{create_expense_endpoint, get_expenses_endpoint};
