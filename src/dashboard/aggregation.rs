//! Sale and expense aggregation for the dashboard cards and charts.
//!
//! Provides functions to group records by category, by weekday within a week,
//! by month and by day, plus date-filtered sums. Every function is pure: the
//! input records are only borrowed and the same input always gives the same
//! output. Amounts are summed as unrounded `f64`s.

use std::collections::{BTreeMap, HashMap};

use time::{Date, Month, Weekday};

use crate::{
    calendar::{DateRange, MONTHS, WEEKDAYS},
    database_id::ProductId,
    expense::Expense,
    sale::Sale,
};

/// The category used for records without one.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// A dated record with a monetary amount.
pub trait Entry {
    /// The day the record applies to.
    fn date(&self) -> Date;

    /// The monetary amount of the record.
    fn amount(&self) -> f64;

    /// The item the record is about, used to find each day's best item.
    fn item(&self) -> Option<&str> {
        None
    }
}

impl Entry for Sale {
    fn date(&self) -> Date {
        self.sale_date
    }

    fn amount(&self) -> f64 {
        self.total_amount
    }

    fn item(&self) -> Option<&str> {
        Some(&self.product_name)
    }
}

impl Entry for Expense {
    fn date(&self) -> Date {
        self.expense_date
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

/// The total of the records in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// The summed amount.
    pub amount: f64,
    /// The number of records.
    pub count: usize,
}

/// The accumulated amount of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTotal {
    /// The item label, e.g. a product name.
    pub item: String,
    /// The summed amount.
    pub amount: f64,
}

/// The records of one day of the week.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    /// The day of the week.
    pub weekday: Weekday,
    /// The latest record date seen for this day, `None` if there were no records.
    pub date: Option<Date>,
    /// The summed amount.
    pub total: f64,
    /// The number of records.
    pub count: usize,
    /// Per-item running totals in the order the items were first seen.
    pub items: Vec<ItemTotal>,
}

impl DayBucket {
    fn empty(weekday: Weekday) -> Self {
        Self {
            weekday,
            date: None,
            total: 0.0,
            count: 0,
            items: Vec::new(),
        }
    }

    fn add(&mut self, date: Date, amount: f64, item: Option<&str>) {
        self.total += amount;
        self.count += 1;
        self.date = self.date.max(Some(date));

        if let Some(item) = item {
            match self.items.iter_mut().find(|total| total.item == item) {
                Some(total) => total.amount += amount,
                None => self.items.push(ItemTotal {
                    item: item.to_owned(),
                    amount,
                }),
            }
        }
    }

    /// The item with the strictly greatest positive amount.
    ///
    /// Ties go to the item that was seen first.
    pub fn best_item(&self) -> Option<&ItemTotal> {
        self.items.iter().fold(None, |best: Option<&ItemTotal>, item| {
            let best_amount = best.map_or(0.0, |best| best.amount);

            if item.amount > best_amount {
                Some(item)
            } else {
                best
            }
        })
    }
}

/// How much of a product was sold.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotal {
    /// The product that was sold.
    pub product_id: ProductId,
    /// The name of the product on its first sale.
    pub product_name: String,
    /// The number of items sold.
    pub quantity: u64,
    /// The amount the product brought in.
    pub amount: f64,
}

/// Groups records by category and sums their amounts.
///
/// Categories are returned in the order they are first seen. Records whose
/// category is missing or blank are grouped under [UNCATEGORIZED_LABEL].
/// The category amounts always add up to the total of the input amounts.
pub fn group_by_category<E, F>(records: &[E], category_of: F) -> Vec<CategoryTotal>
where
    E: Entry,
    F: Fn(&E) -> Option<&str>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for record in records {
        let category = category_label(category_of(record));

        match index_of.get(category) {
            Some(&index) => {
                totals[index].amount += record.amount();
                totals[index].count += 1;
            }
            None => {
                index_of.insert(category.to_owned(), totals.len());
                totals.push(CategoryTotal {
                    category: category.to_owned(),
                    amount: record.amount(),
                    count: 1,
                });
            }
        }
    }

    totals
}

/// The bucket name of a raw category.
pub fn category_label(category: Option<&str>) -> &str {
    match category.map(str::trim) {
        Some(category) if !category.is_empty() => category,
        _ => UNCATEGORIZED_LABEL,
    }
}

/// Groups the records within `week` by day of the week.
///
/// Always returns seven buckets, Monday first, even when no record falls
/// within the week. Records outside `week` are ignored.
pub fn group_by_weekday<E: Entry>(records: &[E], week: DateRange) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = WEEKDAYS.into_iter().map(DayBucket::empty).collect();

    for record in records.iter().filter(|record| week.contains(record.date())) {
        let index = record.date().weekday().number_days_from_monday() as usize;
        buckets[index].add(record.date(), record.amount(), record.item());
    }

    buckets
}

/// Sum the amounts of the records within `range`, inclusive of both ends.
pub fn sum_in_range<E: Entry>(records: &[E], range: DateRange) -> f64 {
    records
        .iter()
        .filter(|record| range.contains(record.date()))
        .map(Entry::amount)
        .sum()
}

/// Sum the amounts of the records in `year`.
///
/// Years the calendar cannot represent hold no records and sum to zero.
pub fn sum_by_year<E: Entry>(records: &[E], year: i32) -> f64 {
    DateRange::checked_year(year).map_or(0.0, |range| sum_in_range(records, range))
}

/// Sum the amounts of the records in `month` of `year`.
///
/// Years the calendar cannot represent hold no records and sum to zero.
pub fn sum_by_month<E: Entry>(records: &[E], year: i32, month: Month) -> f64 {
    DateRange::checked_month(year, month).map_or(0.0, |range| sum_in_range(records, range))
}

/// Sum the amounts of the records on `date`.
pub fn sum_by_day<E: Entry>(records: &[E], date: Date) -> f64 {
    sum_in_range(records, DateRange::day(date))
}

/// The total of each month of `year`, January first.
pub fn monthly_totals<E: Entry>(records: &[E], year: i32) -> [f64; 12] {
    let mut totals = [0.0; 12];

    for record in records.iter().filter(|record| record.date().year() == year) {
        totals[record.date().month() as usize - 1] += record.amount();
    }

    totals
}

/// The total of each day that has records, in date order.
pub fn daily_totals<E: Entry>(records: &[E]) -> Vec<(Date, f64)> {
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();

    for record in records {
        *totals.entry(record.date()).or_insert(0.0) += record.amount();
    }

    totals.into_iter().collect()
}

/// The quantity and amount sold of each product, highest amount first.
///
/// Products with equal amounts keep the order of their first sale.
pub fn product_totals(sales: &[Sale]) -> Vec<ProductTotal> {
    let mut totals: Vec<ProductTotal> = Vec::new();
    let mut index_of: HashMap<ProductId, usize> = HashMap::new();

    for sale in sales {
        match index_of.get(&sale.product_id) {
            Some(&index) => {
                totals[index].quantity += u64::from(sale.quantity);
                totals[index].amount += sale.total_amount;
            }
            None => {
                index_of.insert(sale.product_id, totals.len());
                totals.push(ProductTotal {
                    product_id: sale.product_id,
                    product_name: sale.product_name.clone(),
                    quantity: u64::from(sale.quantity),
                    amount: sale.total_amount,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals
}

/// The earliest and latest dates across two sets of records.
///
/// Returns `None` if both are empty.
pub fn date_span<A: Entry, B: Entry>(first: &[A], second: &[B]) -> Option<DateRange> {
    let dates = first
        .iter()
        .map(Entry::date)
        .chain(second.iter().map(Entry::date));

    dates.fold(None, |span: Option<DateRange>, date| match span {
        Some(span) => Some(DateRange {
            start: span.start.min(date),
            end: span.end.max(date),
        }),
        None => Some(DateRange::day(date)),
    })
}

/// The names of the months paired with their totals, January first.
pub(super) fn months_with_totals(totals: [f64; 12]) -> impl Iterator<Item = (Month, f64)> {
    MONTHS.into_iter().zip(totals)
}

#[cfg(test)]
mod tests {
    use time::{Date, Month, Weekday, macros::date};

    use crate::calendar::{DateRange, compute_week_date_range};

    use super::{
        Entry, UNCATEGORIZED_LABEL, category_label, daily_totals, date_span, group_by_category,
        group_by_weekday, monthly_totals, sum_by_day, sum_by_month, sum_by_year, sum_in_range,
    };

    #[derive(Debug, Clone)]
    struct TestRecord {
        date: Date,
        amount: f64,
        category: Option<&'static str>,
        item: Option<&'static str>,
    }

    impl Entry for TestRecord {
        fn date(&self) -> Date {
            self.date
        }

        fn amount(&self) -> f64 {
            self.amount
        }

        fn item(&self) -> Option<&str> {
            self.item
        }
    }

    fn record(date: Date, amount: f64) -> TestRecord {
        TestRecord {
            date,
            amount,
            category: None,
            item: None,
        }
    }

    fn categorised(amount: f64, category: &'static str) -> TestRecord {
        TestRecord {
            category: Some(category),
            ..record(date!(2024 - 05 - 06), amount)
        }
    }

    fn sold(date: Date, amount: f64, item: &'static str) -> TestRecord {
        TestRecord {
            item: Some(item),
            ..record(date, amount)
        }
    }

    #[test]
    fn group_by_category_sums_each_category() {
        let records = vec![
            categorised(100.0, "Shop Supplies"),
            categorised(50.0, "Salaries"),
            categorised(25.0, "Shop Supplies"),
        ];

        let totals = group_by_category(&records, |record| record.category);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "Shop Supplies");
        assert_eq!(totals[0].amount, 125.0);
        assert_eq!(totals[0].count, 2);
        assert_eq!(totals[1].category, "Salaries");
        assert_eq!(totals[1].amount, 50.0);
        assert_eq!(totals.iter().map(|total| total.amount).sum::<f64>(), 175.0);
    }

    #[test]
    fn group_by_category_conserves_the_total() {
        let records = vec![
            categorised(10.25, "Rent"),
            categorised(3.5, " "),
            record(date!(2024 - 01 - 01), 7.75),
            categorised(0.5, "Rent"),
            categorised(100.0, "Transport"),
        ];
        let input_total: f64 = records.iter().map(|record| record.amount).sum();

        let totals = group_by_category(&records, |record| record.category);
        let grouped_total: f64 = totals.iter().map(|total| total.amount).sum();

        assert_eq!(grouped_total, input_total);
    }

    #[test]
    fn missing_and_blank_categories_are_uncategorized() {
        let records = vec![
            categorised(1.0, ""),
            record(date!(2024 - 01 - 01), 2.0),
            categorised(4.0, "\t"),
        ];

        let totals = group_by_category(&records, |record| record.category);

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].category, UNCATEGORIZED_LABEL);
        assert_eq!(totals[0].amount, 7.0);
        assert_eq!(category_label(Some(" Salaries ")), "Salaries");
    }

    #[test]
    fn group_by_weekday_always_returns_seven_buckets() {
        let week = compute_week_date_range(2024, Month::May, 2);

        let buckets = group_by_weekday::<TestRecord>(&[], week);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].weekday, Weekday::Monday);
        assert_eq!(buckets[6].weekday, Weekday::Sunday);
        assert!(buckets.iter().all(|bucket| bucket.total == 0.0
            && bucket.count == 0
            && bucket.date.is_none()
            && bucket.best_item().is_none()));
    }

    #[test]
    fn group_by_weekday_ignores_records_outside_week() {
        // Week 2 of May 2024 is Monday the 6th to Sunday the 12th.
        let week = compute_week_date_range(2024, Month::May, 2);
        let records = vec![
            sold(date!(2024 - 05 - 05), 1000.0, "Rice"),
            sold(date!(2024 - 05 - 06), 20.0, "Rice"),
            sold(date!(2024 - 05 - 12), 30.0, "Oil"),
            sold(date!(2024 - 05 - 13), 1000.0, "Oil"),
        ];

        let buckets = group_by_weekday(&records, week);

        assert_eq!(buckets[0].total, 20.0);
        assert_eq!(buckets[0].date, Some(date!(2024 - 05 - 06)));
        assert_eq!(buckets[6].total, 30.0);
        assert_eq!(buckets.iter().map(|bucket| bucket.total).sum::<f64>(), 50.0);
    }

    #[test]
    fn best_item_has_greatest_accumulated_amount() {
        let week = compute_week_date_range(2024, Month::May, 2);
        let tuesday = date!(2024 - 05 - 07);
        let records = vec![
            sold(tuesday, 300.0, "Soap"),
            sold(tuesday, 200.0, "Rice"),
            sold(tuesday, 200.0, "Rice"),
            sold(tuesday, 50.0, "Oil"),
        ];

        let buckets = group_by_weekday(&records, week);
        let best = buckets[1].best_item().unwrap();

        assert_eq!(best.item, "Rice");
        assert_eq!(best.amount, 400.0);
        assert_eq!(buckets[1].count, 4);
    }

    #[test]
    fn best_item_ties_go_to_first_seen() {
        let week = compute_week_date_range(2024, Month::May, 2);
        let friday = date!(2024 - 05 - 10);
        let records = vec![sold(friday, 100.0, "Oil"), sold(friday, 100.0, "Soap")];

        let buckets = group_by_weekday(&records, week);

        assert_eq!(buckets[4].best_item().unwrap().item, "Oil");
    }

    #[test]
    fn best_item_ignores_zero_amounts() {
        let week = compute_week_date_range(2024, Month::May, 2);
        let records = vec![sold(date!(2024 - 05 - 08), 0.0, "Free sample")];

        let buckets = group_by_weekday(&records, week);

        assert_eq!(buckets[2].count, 1);
        assert!(buckets[2].best_item().is_none());
    }

    #[test]
    fn date_sums_include_both_ends() {
        let records = vec![
            record(date!(2023 - 12 - 31), 1.0),
            record(date!(2024 - 01 - 01), 2.0),
            record(date!(2024 - 01 - 31), 4.0),
            record(date!(2024 - 02 - 01), 8.0),
            record(date!(2024 - 12 - 31), 16.0),
        ];

        assert_eq!(sum_by_year(&records, 2024), 30.0);
        assert_eq!(sum_by_month(&records, 2024, Month::January), 6.0);
        assert_eq!(sum_by_day(&records, date!(2024 - 02 - 01)), 8.0);
        assert_eq!(
            sum_in_range(
                &records,
                DateRange {
                    start: date!(2024 - 01 - 31),
                    end: date!(2024 - 02 - 01)
                }
            ),
            12.0
        );
        assert_eq!(sum_by_year::<TestRecord>(&[], 2024), 0.0);
    }

    #[test]
    fn date_sums_do_not_remap_unsupported_years() {
        let records = vec![record(date!(0001 - 03 - 01), 5.0)];

        assert_eq!(sum_by_year(&records, 1), 5.0);
        assert_eq!(sum_by_year(&records, 0), 0.0);
        assert_eq!(sum_by_year(&records, -40), 0.0);
        assert_eq!(sum_by_month(&records, 0, Month::March), 0.0);
        assert_eq!(sum_by_month(&records, 1, Month::March), 5.0);
    }

    #[test]
    fn monthly_totals_fill_every_month() {
        let records = vec![
            record(date!(2024 - 01 - 10), 5.0),
            record(date!(2024 - 01 - 20), 5.0),
            record(date!(2024 - 12 - 01), 3.0),
            record(date!(2025 - 01 - 01), 100.0),
        ];

        let totals = monthly_totals(&records, 2024);

        assert_eq!(totals[0], 10.0);
        assert_eq!(totals[11], 3.0);
        assert_eq!(totals[1..11].iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn daily_totals_are_sorted_by_date() {
        let records = vec![
            record(date!(2024 - 03 - 02), 5.0),
            record(date!(2024 - 03 - 01), 1.0),
            record(date!(2024 - 03 - 02), 2.0),
        ];

        let totals = daily_totals(&records);

        assert_eq!(
            totals,
            vec![(date!(2024 - 03 - 01), 1.0), (date!(2024 - 03 - 02), 7.0)]
        );
    }

    #[test]
    fn date_span_covers_both_record_sets() {
        let sales = vec![record(date!(2024 - 03 - 02), 5.0)];
        let expenses = vec![
            record(date!(2024 - 04 - 01), 1.0),
            record(date!(2023 - 11 - 15), 1.0),
        ];

        let span = date_span(&sales, &expenses).unwrap();

        assert_eq!(span.start, date!(2023 - 11 - 15));
        assert_eq!(span.end, date!(2024 - 04 - 01));
        assert!(date_span::<TestRecord, TestRecord>(&[], &[]).is_none());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let week = compute_week_date_range(2024, Month::May, 2);
        let records = vec![
            sold(date!(2024 - 05 - 07), 0.1, "Rice"),
            sold(date!(2024 - 05 - 07), 0.2, "Oil"),
            sold(date!(2024 - 05 - 09), 0.3, "Rice"),
        ];

        assert_eq!(
            group_by_weekday(&records, week),
            group_by_weekday(&records, week)
        );
        assert_eq!(
            group_by_category(&records, |record| record.item),
            group_by_category(&records, |record| record.item)
        );
        assert_eq!(
            monthly_totals(&records, 2024).map(f64::to_bits),
            monthly_totals(&records, 2024).map(f64::to_bits)
        );
    }
}
