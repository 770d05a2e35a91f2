//! View models for the dashboard cards and charts.
//!
//! The builders in this module turn aggregated records into serialisable
//! structures. They never modify their input and amounts are only rounded
//! when serialised.

use serde::Serialize;
use time::{Date, Weekday};

use crate::{
    calendar::{
        DateRange, compute_week_date_range, month_name, week_count, week_label, weekday_name,
    },
    dashboard::{
        aggregation::{
            DayBucket, daily_totals, date_span, group_by_category, group_by_weekday,
            monthly_totals, months_with_totals, product_totals, sum_by_month, sum_by_year,
        },
        filter::{ExpenseFilter, SalesFilter},
    },
    database_id::ProductId,
    expense::Expense,
    money::serialize_cents,
    product::Product,
    sale::Sale,
};

/// The direction of a change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    /// The current period is higher.
    Increase,
    /// The current period is lower.
    Decrease,
    /// Both periods are exactly equal.
    NoChange,
}

/// The change from one period to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodChange {
    /// The total of the earlier period.
    #[serde(serialize_with = "serialize_cents")]
    pub previous: f64,
    /// The total of the later period.
    #[serde(serialize_with = "serialize_cents")]
    pub current: f64,
    /// `current - previous`.
    #[serde(serialize_with = "serialize_cents")]
    pub difference: f64,
    /// Whether the total went up, down or stayed the same.
    pub trend: Trend,
}

impl PeriodChange {
    /// Compare the total of a period with the period before it.
    pub fn between(previous: f64, current: f64) -> Self {
        let difference = current - previous;
        let trend = if difference > 0.0 {
            Trend::Increase
        } else if difference < 0.0 {
            Trend::Decrease
        } else {
            Trend::NoChange
        };

        Self {
            previous,
            current,
            difference,
            trend,
        }
    }
}

/// A label paired with an amount, e.g. a month and its total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelledValue {
    /// What the amount belongs to.
    pub label: String,
    /// The amount.
    #[serde(serialize_with = "serialize_cents")]
    pub value: f64,
}

impl LabelledValue {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// The entry with the strictly greatest positive value.
///
/// Ties go to the entry seen first. Returns `None` if no value is positive.
pub fn most_productive<'a>(
    values: impl IntoIterator<Item = &'a LabelledValue>,
) -> Option<&'a LabelledValue> {
    values.into_iter().fold(None, |best: Option<&LabelledValue>, entry| {
        let best_value = best.map_or(0.0, |best| best.value);

        if entry.value > best_value {
            Some(entry)
        } else {
            best
        }
    })
}

// ============================================================================
// SALES
// ============================================================================

/// An entry of the week selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekOption {
    /// The label, e.g. "Week 2".
    pub label: String,
    /// The dates the week covers within the month.
    pub range: DateRange,
}

/// The sales of one day of the selected week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    /// The weekday name, e.g. "Monday".
    pub day: &'static str,
    /// The date of the latest sale on this day.
    pub date: Option<Date>,
    /// The day's sales.
    #[serde(serialize_with = "serialize_cents")]
    pub total: f64,
    /// The number of sales.
    pub sale_count: usize,
    /// The product that brought in the most.
    pub best_product: Option<LabelledValue>,
}

impl From<&DayBucket> for DaySummary {
    fn from(bucket: &DayBucket) -> Self {
        Self {
            day: weekday_name(bucket.weekday),
            date: bucket.date,
            total: bucket.total,
            sale_count: bucket.count,
            best_product: bucket
                .best_item()
                .map(|best| LabelledValue::new(best.item.clone(), best.amount)),
        }
    }
}

/// Everything the sales page shows for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// The selected year.
    pub year: i32,
    /// The selected month name.
    pub month: &'static str,
    /// The selected week label.
    pub week: String,
    /// The selected weekday name.
    pub day: &'static str,
    /// The sales in the selected year.
    #[serde(serialize_with = "serialize_cents")]
    pub year_total: f64,
    /// The sales in the selected month.
    #[serde(serialize_with = "serialize_cents")]
    pub month_total: f64,
    /// The sales in the selected week.
    #[serde(serialize_with = "serialize_cents")]
    pub week_total: f64,
    /// The dates covered by the selected week.
    pub week_range: DateRange,
    /// The weeks that can be selected for the month.
    pub weeks: Vec<WeekOption>,
    /// The seven days of the selected week, Monday first.
    pub days: Vec<DaySummary>,
    /// The sales on the selected day.
    #[serde(serialize_with = "serialize_cents")]
    pub day_total: f64,
    /// The best selling product on the selected day.
    pub best_product: Option<LabelledValue>,
    /// The change from the day before, `None` for Monday.
    pub change_from_previous_day: Option<PeriodChange>,
    /// The day of the selected week with the most sales.
    pub most_productive_day: Option<LabelledValue>,
    /// The sales of each month of the selected year.
    pub monthly_totals: Vec<LabelledValue>,
}

/// Build the sales page for the selection in `filter`.
pub fn build_sales_summary(sales: &[Sale], filter: &SalesFilter) -> SalesSummary {
    let week_range = filter.week_range();
    let buckets = group_by_weekday(sales, week_range);
    let days: Vec<DaySummary> = buckets.iter().map(DaySummary::from).collect();

    let day_index = filter.day.number_days_from_monday() as usize;
    let selected_day = &days[day_index];
    let change_from_previous_day = match filter.day {
        Weekday::Monday => None,
        _ => Some(PeriodChange::between(
            days[day_index - 1].total,
            selected_day.total,
        )),
    };

    let day_totals: Vec<LabelledValue> = days
        .iter()
        .map(|day| LabelledValue::new(day.day, day.total))
        .collect();

    let weeks = (1..=week_count(filter.year, filter.month))
        .map(|week| WeekOption {
            label: week_label(week),
            range: compute_week_date_range(filter.year, filter.month, week),
        })
        .collect();

    let monthly_totals = months_with_totals(monthly_totals(sales, filter.year))
        .map(|(month, total)| LabelledValue::new(month_name(month), total))
        .collect();

    SalesSummary {
        year: filter.year,
        month: month_name(filter.month),
        week: week_label(filter.week),
        day: weekday_name(filter.day),
        year_total: sum_by_year(sales, filter.year),
        month_total: sum_by_month(sales, filter.year, filter.month),
        week_total: buckets.iter().map(|bucket| bucket.total).sum(),
        week_range,
        weeks,
        day_total: selected_day.total,
        best_product: selected_day.best_product.clone(),
        change_from_previous_day,
        most_productive_day: most_productive(&day_totals).cloned(),
        monthly_totals,
        days,
    }
}

// ============================================================================
// EXPENSES
// ============================================================================

/// The expenses of one category and its share of all expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// The category name.
    pub category: String,
    /// The summed amount.
    #[serde(serialize_with = "serialize_cents")]
    pub amount: f64,
    /// The number of expenses.
    pub count: usize,
    /// The share of the total, as a percentage.
    #[serde(serialize_with = "serialize_cents")]
    pub percentage: f64,
}

/// Everything the expense page shows for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    /// The selected category, or "All".
    pub category: String,
    /// The first selected day.
    pub start: Option<Date>,
    /// The last selected day.
    pub end: Option<Date>,
    /// The total of the selected expenses.
    #[serde(serialize_with = "serialize_cents")]
    pub total: f64,
    /// The number of selected expenses.
    pub expense_count: usize,
    /// The average selected expense, zero if there are none.
    #[serde(serialize_with = "serialize_cents")]
    pub average: f64,
    /// Every category within the selected dates, in first-seen order.
    pub categories: Vec<CategoryShare>,
    /// The category with the highest total within the selected dates.
    pub largest_category: Option<LabelledValue>,
    /// The total of the selected expenses on each day.
    pub daily_totals: Vec<LabelledValue>,
}

/// Build the expense page for the selection in `filter`.
///
/// The category breakdown covers all categories within the selected dates so
/// that the shares add up to 100%. The totals and the daily series only cover
/// the selected category.
pub fn build_expense_summary(expenses: &[Expense], filter: &ExpenseFilter) -> ExpenseSummary {
    let in_range: Vec<Expense> = expenses
        .iter()
        .filter(|expense| filter.contains_date(expense.expense_date))
        .cloned()
        .collect();
    let selected: Vec<Expense> = in_range
        .iter()
        .filter(|expense| filter.matches_category(Some(expense.reason.as_str())))
        .cloned()
        .collect();

    let category_totals = group_by_category(&in_range, |expense| Some(expense.reason.as_str()));
    let range_total: f64 = category_totals.iter().map(|total| total.amount).sum();
    let categories: Vec<CategoryShare> = category_totals
        .into_iter()
        .map(|total| CategoryShare {
            percentage: if range_total > 0.0 {
                total.amount / range_total * 100.0
            } else {
                0.0
            },
            category: total.category,
            amount: total.amount,
            count: total.count,
        })
        .collect();
    let category_values: Vec<LabelledValue> = categories
        .iter()
        .map(|share| LabelledValue::new(share.category.clone(), share.amount))
        .collect();

    let total: f64 = selected.iter().map(|expense| expense.amount).sum();
    let expense_count = selected.len();
    let average = if expense_count > 0 {
        total / expense_count as f64
    } else {
        0.0
    };

    let daily_totals = daily_totals(&selected)
        .into_iter()
        .map(|(date, total)| LabelledValue::new(date.to_string(), total))
        .collect();

    ExpenseSummary {
        category: filter.category_label().to_owned(),
        start: filter.start,
        end: filter.end,
        total,
        expense_count,
        average,
        largest_category: most_productive(&category_values).cloned(),
        categories,
        daily_totals,
    }
}

// ============================================================================
// OVERVIEW
// ============================================================================

/// The stat cards at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// The earliest and latest record dates, `None` if there are no records.
    pub date_span: Option<DateRange>,
    /// The total of all sales.
    #[serde(serialize_with = "serialize_cents")]
    pub total_sales: f64,
    /// The total amount taken off by discounts.
    #[serde(serialize_with = "serialize_cents")]
    pub total_discounts: f64,
    /// The total of all expenses.
    #[serde(serialize_with = "serialize_cents")]
    pub total_expenses: f64,
    /// Sales minus expenses.
    #[serde(serialize_with = "serialize_cents")]
    pub net: f64,
    /// The number of sales.
    pub sale_count: usize,
    /// The number of expenses.
    pub expense_count: usize,
}

/// Build the dashboard stat cards.
pub fn build_overview(sales: &[Sale], expenses: &[Expense]) -> Overview {
    let total_sales: f64 = sales.iter().map(|sale| sale.total_amount).sum();
    let total_expenses: f64 = expenses.iter().map(|expense| expense.amount).sum();

    Overview {
        date_span: date_span(sales, expenses),
        total_sales,
        total_discounts: sales.iter().map(Sale::discount_amount).sum(),
        total_expenses,
        net: total_sales - total_expenses,
        sale_count: sales.len(),
        expense_count: expenses.len(),
    }
}

// ============================================================================
// POPULAR PRODUCTS
// ============================================================================

/// A catalog product with how much of it was sold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularProduct {
    /// The ID of the product.
    pub product_id: ProductId,
    /// The current name of the product.
    pub name: String,
    /// The current price.
    pub price: f64,
    /// The star rating.
    pub rating: Option<f64>,
    /// A link to a picture of the product.
    pub image_url: Option<String>,
    /// The number of items sold.
    pub quantity_sold: u64,
    /// The amount the product brought in.
    #[serde(serialize_with = "serialize_cents")]
    pub amount: f64,
}

/// Join the catalog with the sales of each product, best selling first.
///
/// Products that have not been sold are listed last, in catalog order.
pub fn build_popular_products(sales: &[Sale], products: &[Product]) -> Vec<PopularProduct> {
    let totals = product_totals(sales);

    let mut popular: Vec<PopularProduct> = products
        .iter()
        .map(|product| {
            let (quantity_sold, amount) = totals
                .iter()
                .find(|total| total.product_id == product.id)
                .map_or((0, 0.0), |total| (total.quantity, total.amount));

            PopularProduct {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                rating: product.rating,
                image_url: product.image_url.clone(),
                quantity_sold,
                amount,
            }
        })
        .collect();

    popular.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    popular
}

#[cfg(test)]
mod tests {
    use time::{
        Month, Weekday,
        macros::{date, time},
    };

    use crate::{
        dashboard::filter::{ExpenseFilter, SalesFilter},
        expense::Expense,
        product::Product,
        sale::{PaymentType, Sale},
    };

    use super::{
        LabelledValue, PeriodChange, Trend, build_expense_summary, build_overview,
        build_popular_products, build_sales_summary, most_productive,
    };

    fn sale(date: time::Date, product_id: i64, product_name: &str, total_amount: f64) -> Sale {
        Sale {
            id: 0,
            payment_type: PaymentType::Cash,
            sale_date: date,
            sale_time: time!(12:00),
            product_id,
            product_name: product_name.to_owned(),
            quantity: 1,
            unit_price: total_amount,
            discount: 0.0,
            total_amount,
        }
    }

    fn expense(date: time::Date, reason: &str, amount: f64) -> Expense {
        Expense {
            id: 0,
            expense_date: date,
            reason: reason.to_owned(),
            details: None,
            amount,
        }
    }

    fn product(id: i64, name: &str) -> Product {
        Product {
            id,
            name: name.to_owned(),
            price: 100.0,
            rating: None,
            stock_quantity: 10,
            image_url: None,
            active: true,
            low_stock_alert_dismissed: false,
        }
    }

    fn may_week_two(day: Weekday) -> SalesFilter {
        SalesFilter {
            year: 2024,
            month: Month::May,
            week: 2,
            day,
        }
    }

    #[test]
    fn period_change_classifies_trend() {
        assert_eq!(PeriodChange::between(10.0, 15.0).trend, Trend::Increase);
        assert_eq!(PeriodChange::between(15.0, 10.0).difference, -5.0);
        assert_eq!(PeriodChange::between(15.0, 10.0).trend, Trend::Decrease);
        assert_eq!(PeriodChange::between(7.5, 7.5).trend, Trend::NoChange);
    }

    #[test]
    fn most_productive_needs_a_positive_value() {
        let values = vec![LabelledValue::new("Monday", 0.0), LabelledValue::new("Tuesday", -3.0)];

        assert_eq!(most_productive(&values), None);
    }

    #[test]
    fn most_productive_ties_go_to_first_seen() {
        let values = vec![
            LabelledValue::new("Monday", 5.0),
            LabelledValue::new("Tuesday", 9.0),
            LabelledValue::new("Wednesday", 9.0),
        ];

        assert_eq!(most_productive(&values).unwrap().label, "Tuesday");
    }

    #[test]
    fn sales_summary_for_selected_week_and_day() {
        let sales = vec![
            sale(date!(2024 - 05 - 06), 1, "Rice", 4500.0),
            sale(date!(2024 - 05 - 07), 2, "Oil", 1500.0),
            sale(date!(2024 - 05 - 07), 3, "Soap", 250.0),
            sale(date!(2024 - 05 - 07), 3, "Soap", 250.0),
            sale(date!(2024 - 05 - 20), 1, "Rice", 4500.0),
            sale(date!(2024 - 01 - 02), 1, "Rice", 4500.0),
            sale(date!(2023 - 05 - 07), 1, "Rice", 4500.0),
        ];

        let summary = build_sales_summary(&sales, &may_week_two(Weekday::Tuesday));

        assert_eq!(summary.month, "May");
        assert_eq!(summary.week, "Week 2");
        assert_eq!(summary.day, "Tuesday");
        assert_eq!(summary.year_total, 15_500.0);
        assert_eq!(summary.month_total, 11_000.0);
        assert_eq!(summary.week_total, 6500.0);
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.day_total, 2000.0);
        assert_eq!(
            summary.best_product,
            Some(LabelledValue::new("Oil", 1500.0))
        );

        let change = summary.change_from_previous_day.unwrap();
        assert_eq!(change.difference, -2500.0);
        assert_eq!(change.trend, Trend::Decrease);

        assert_eq!(
            summary.most_productive_day,
            Some(LabelledValue::new("Monday", 4500.0))
        );
        assert_eq!(summary.weeks.len(), 5);
        assert_eq!(summary.weeks[0].label, "Week 1");
        assert_eq!(summary.monthly_totals.len(), 12);
        assert_eq!(summary.monthly_totals[0].value, 4500.0);
        assert_eq!(summary.monthly_totals[4].label, "May");
        assert_eq!(summary.monthly_totals[4].value, 11_000.0);
    }

    #[test]
    fn monday_has_no_previous_day() {
        let summary = build_sales_summary(&[], &may_week_two(Weekday::Monday));

        assert_eq!(summary.change_from_previous_day, None);
        assert_eq!(summary.most_productive_day, None);
        assert_eq!(summary.day_total, 0.0);
    }

    #[test]
    fn sales_summary_is_pure() {
        let sales = vec![
            sale(date!(2024 - 05 - 08), 1, "Rice", 0.1),
            sale(date!(2024 - 05 - 08), 2, "Oil", 0.2),
        ];
        let filter = may_week_two(Weekday::Wednesday);

        assert_eq!(
            build_sales_summary(&sales, &filter),
            build_sales_summary(&sales, &filter)
        );
    }

    #[test]
    fn expense_summary_breaks_down_categories() {
        let expenses = vec![
            expense(date!(2024 - 05 - 01), "Shop Supplies", 100.0),
            expense(date!(2024 - 05 - 02), "Salaries", 50.0),
            expense(date!(2024 - 05 - 02), "Shop Supplies", 25.0),
            expense(date!(2024 - 05 - 03), "", 25.0),
        ];

        let summary = build_expense_summary(&expenses, &ExpenseFilter::default());

        assert_eq!(summary.category, "All");
        assert_eq!(summary.total, 200.0);
        assert_eq!(summary.expense_count, 4);
        assert_eq!(summary.average, 50.0);
        assert_eq!(summary.categories.len(), 3);
        assert_eq!(summary.categories[0].category, "Shop Supplies");
        assert_eq!(summary.categories[0].percentage, 62.5);
        assert_eq!(summary.categories[2].category, "Uncategorized");
        assert_eq!(
            summary.largest_category,
            Some(LabelledValue::new("Shop Supplies", 125.0))
        );
        assert_eq!(summary.daily_totals.len(), 3);
        assert_eq!(summary.daily_totals[1].label, "2024-05-02");
        assert_eq!(summary.daily_totals[1].value, 75.0);
    }

    #[test]
    fn expense_summary_filters_by_category_and_dates() {
        let expenses = vec![
            expense(date!(2024 - 04 - 30), "Salaries", 1000.0),
            expense(date!(2024 - 05 - 01), "Salaries", 60.0),
            expense(date!(2024 - 05 - 02), "Shop Supplies", 40.0),
            expense(date!(2024 - 05 - 31), "salaries", 20.0),
        ];
        let filter = ExpenseFilter {
            category: Some("Salaries".to_owned()),
            start: Some(date!(2024 - 05 - 01)),
            end: Some(date!(2024 - 05 - 31)),
        };

        let summary = build_expense_summary(&expenses, &filter);

        assert_eq!(summary.total, 80.0);
        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.average, 40.0);
        // The breakdown still shows every category in the date range.
        let breakdown_total: f64 = summary.categories.iter().map(|share| share.amount).sum();
        assert_eq!(breakdown_total, 120.0);
    }

    #[test]
    fn empty_expense_summary_is_zero() {
        let summary = build_expense_summary(&[], &ExpenseFilter::default());

        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.average, 0.0);
        assert!(summary.categories.is_empty());
        assert_eq!(summary.largest_category, None);
    }

    #[test]
    fn overview_totals_sales_discounts_and_expenses() {
        let mut discounted = sale(date!(2024 - 03 - 01), 1, "Rice", 900.0);
        discounted.unit_price = 1000.0;
        discounted.discount = 10.0;
        let sales = vec![discounted, sale(date!(2024 - 05 - 01), 2, "Oil", 1500.0)];
        let expenses = vec![expense(date!(2024 - 02 - 15), "Salaries", 400.0)];

        let overview = build_overview(&sales, &expenses);

        assert_eq!(overview.total_sales, 2400.0);
        assert_eq!(overview.total_discounts, 100.0);
        assert_eq!(overview.total_expenses, 400.0);
        assert_eq!(overview.net, 2000.0);
        assert_eq!(overview.sale_count, 2);
        let span = overview.date_span.unwrap();
        assert_eq!(span.start, date!(2024 - 02 - 15));
        assert_eq!(span.end, date!(2024 - 05 - 01));
    }

    #[test]
    fn overview_of_nothing_has_no_date_span() {
        let overview = build_overview(&[], &[]);

        assert_eq!(overview.date_span, None);
        assert_eq!(overview.total_sales, 0.0);
    }

    #[test]
    fn popular_products_sorted_by_amount() {
        let products = vec![product(1, "Oil"), product(2, "Rice"), product(3, "Soap")];
        let sales = vec![
            sale(date!(2024 - 05 - 01), 3, "Soap", 250.0),
            sale(date!(2024 - 05 - 01), 2, "Rice", 4500.0),
            sale(date!(2024 - 05 - 02), 3, "Soap", 250.0),
        ];

        let popular = build_popular_products(&sales, &products);

        let names: Vec<&str> = popular.iter().map(|product| product.name.as_str()).collect();
        assert_eq!(names, vec!["Rice", "Soap", "Oil"]);
        assert_eq!(popular[1].quantity_sold, 2);
        assert_eq!(popular[2].amount, 0.0);
    }

    #[test]
    fn serialised_amounts_are_rounded() {
        let value = LabelledValue::new("Monday", 0.1 + 0.2);

        let json = serde_json::to_value(&value).unwrap();

        assert_eq!(json["value"], serde_json::json!(0.3));
    }
}
