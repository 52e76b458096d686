// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Aggregation Engine
//!
//! Pure functions over a record list that feed the dashboard: month and week
//! windows, per-day buckets, category breakdowns and budget deltas.
//!
//! Records are grouped by their calendar date in the aggregator's time zone
//! ([`Aggregator::local`] for the device's zone). Months are 1-based. Weeks
//! run Monday to Sunday inclusive.
//!
//! A budget of 0 means "no budget set": every percentage and remaining amount
//! in its [`BudgetDelta`] is 0.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone};

use super::record::ExpenseRecord;

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    /// 1 to 12.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn prev(self) -> Self {
        match self.month {
            1 => Self {
                year: self.year - 1,
                month: 12,
            },
            m => Self {
                year: self.year,
                month: m - 1,
            },
        }
    }

    pub fn next(self) -> Self {
        match self.month {
            12 => Self {
                year: self.year + 1,
                month: 1,
            },
            m => Self {
                year: self.year,
                month: m + 1,
            },
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(self) -> u32 {
        let (Some(first), Some(next)) = (self.first_day(), self.next().first_day()) else {
            return 0;
        };
        next.signed_duration_since(first).num_days() as u32
    }
}

/// Inclusive Monday..Sunday window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// The week containing `date`. A Sunday yields the window ending on it.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = u64::from(date.weekday().num_days_from_monday());
        let start = date - Days::new(offset);
        Self {
            start,
            end: start + Days::new(6),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn prev(self) -> Self {
        Self::containing(self.start - Days::new(7))
    }

    pub fn next(self) -> Self {
        Self::containing(self.start + Days::new(7))
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..7).map(move |i| start + Days::new(i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayBucket {
    /// Day of month, from 1.
    pub day: u32,
    pub amount: f64,
}

impl DayBucket {
    /// Over the daily budget. Never true without a budget.
    pub fn exceeds(&self, daily_budget: f64) -> bool {
        daily_budget > 0.0 && self.amount > daily_budget
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayBucket {
    pub date: NaiveDate,
    pub label: &'static str,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Spending against a budget. Percentages are 0..=100 except `over_pct`;
/// `remaining` goes negative once the budget is exceeded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BudgetDelta {
    pub spent_pct: f64,
    pub remaining: f64,
    pub remaining_pct: f64,
    pub over_amount: f64,
    pub over_pct: f64,
}

impl BudgetDelta {
    pub fn is_over(&self) -> bool {
        self.over_amount > 0.0
    }
}

pub fn budget_delta(total: f64, budget: f64) -> BudgetDelta {
    if !budget.is_finite() || budget <= 0.0 {
        return BudgetDelta::default();
    }
    let over_amount = (total - budget).max(0.0);
    let remaining = budget - total;
    BudgetDelta {
        spent_pct: (total / budget * 100.0).clamp(0.0, 100.0),
        remaining,
        remaining_pct: (remaining / budget * 100.0).max(0.0),
        over_amount,
        over_pct: over_amount / budget * 100.0,
    }
}

pub fn total<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> f64 {
    records.into_iter().map(|r| r.amount).sum()
}

/// Category totals in order of first appearance.
pub fn category_breakdown<'a>(
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for record in records {
        match totals.iter_mut().find(|t| t.category == record.category) {
            Some(entry) => entry.amount += record.amount,
            None => totals.push(CategoryTotal {
                category: record.category.clone(),
                amount: record.amount,
            }),
        }
    }
    totals
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary<'a> {
    pub month: YearMonth,
    pub records: Vec<&'a ExpenseRecord>,
    pub total: f64,
    pub daily: Vec<DayBucket>,
    pub categories: Vec<CategoryTotal>,
    pub budget: BudgetDelta,
}

impl MonthSummary<'_> {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary<'a> {
    pub window: WeekWindow,
    /// Newest first.
    pub records: Vec<&'a ExpenseRecord>,
    pub total: f64,
    pub daily: Vec<WeekdayBucket>,
    pub categories: Vec<CategoryTotal>,
    pub budget: BudgetDelta,
}

impl WeekSummary<'_> {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone)]
pub struct Aggregator<Tz: TimeZone> {
    tz: Tz,
}

impl Aggregator<Local> {
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl<Tz: TimeZone> Aggregator<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Calendar date of an instant in this zone.
    pub fn date_of<Z: TimeZone>(&self, at: &DateTime<Z>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    fn record_date(&self, record: &ExpenseRecord) -> NaiveDate {
        self.date_of(&record.date)
    }

    pub fn filter_month<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ExpenseRecord>,
        month: YearMonth,
    ) -> Vec<&'a ExpenseRecord> {
        records
            .into_iter()
            .filter(|r| YearMonth::of(self.record_date(r)) == month)
            .collect()
    }

    pub fn filter_week<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ExpenseRecord>,
        window: WeekWindow,
    ) -> Vec<&'a ExpenseRecord> {
        records
            .into_iter()
            .filter(|r| window.contains(self.record_date(r)))
            .collect()
    }

    pub fn filter_day<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ExpenseRecord>,
        date: NaiveDate,
    ) -> Vec<&'a ExpenseRecord> {
        records
            .into_iter()
            .filter(|r| self.record_date(r) == date)
            .collect()
    }

    /// One bucket per day of `month`. Records outside the month are ignored.
    pub fn daily_buckets<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ExpenseRecord>,
        month: YearMonth,
    ) -> Vec<DayBucket> {
        let mut buckets: Vec<DayBucket> = (1..=month.days_in_month())
            .map(|day| DayBucket { day, amount: 0.0 })
            .collect();
        for record in records {
            let date = self.record_date(record);
            if YearMonth::of(date) == month {
                buckets[date.day0() as usize].amount += record.amount;
            }
        }
        buckets
    }

    /// Seven buckets, Monday first.
    pub fn weekday_buckets<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ExpenseRecord>,
        window: WeekWindow,
    ) -> Vec<WeekdayBucket> {
        let mut buckets: Vec<WeekdayBucket> = window
            .days()
            .zip(WEEKDAY_LABELS)
            .map(|(date, label)| WeekdayBucket {
                date,
                label,
                amount: 0.0,
            })
            .collect();
        for record in records {
            let date = self.record_date(record);
            if window.contains(date) {
                let index = date.signed_duration_since(window.start).num_days() as usize;
                buckets[index].amount += record.amount;
            }
        }
        buckets
    }

    /// Category breakdown for a single calendar day.
    pub fn day_categories<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ExpenseRecord>,
        date: NaiveDate,
    ) -> Vec<CategoryTotal> {
        category_breakdown(self.filter_day(records, date))
    }

    pub fn month_summary<'a>(
        &self,
        records: &'a [ExpenseRecord],
        month: YearMonth,
        monthly_budget: f64,
    ) -> MonthSummary<'a> {
        let in_month = self.filter_month(records, month);
        let total = total(in_month.iter().copied());
        MonthSummary {
            month,
            daily: self.daily_buckets(in_month.iter().copied(), month),
            categories: category_breakdown(in_month.iter().copied()),
            budget: budget_delta(total, monthly_budget),
            total,
            records: in_month,
        }
    }

    pub fn week_summary<'a>(
        &self,
        records: &'a [ExpenseRecord],
        reference: NaiveDate,
        weekly_budget: f64,
    ) -> WeekSummary<'a> {
        let window = WeekWindow::containing(reference);
        let mut in_week = self.filter_week(records, window);
        in_week.sort_by(|a, b| b.date.cmp(&a.date));
        let total = total(in_week.iter().copied());
        WeekSummary {
            window,
            daily: self.weekday_buckets(in_week.iter().copied(), window),
            categories: category_breakdown(in_week.iter().copied()),
            budget: budget_delta(total, weekly_budget),
            total,
            records: in_week,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Utc, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, amount: f64, category: &str, on: NaiveDate) -> ExpenseRecord {
        ExpenseRecord {
            id: id.to_string(),
            user: None,
            title: id.to_string(),
            amount,
            category: category.to_string(),
            date: on.and_hms_opt(0, 0, 0).unwrap().and_utc(),
            notes: String::new(),
            receipt: None,
        }
    }

    fn sample() -> Vec<ExpenseRecord> {
        vec![
            record("a", 20.0, "Food", date(2024, 3, 1)),
            record("b", 30.0, "Bills", date(2024, 3, 1)),
            record("c", 60.0, "Food", date(2024, 3, 15)),
            record("d", 99.0, "Food", date(2024, 2, 29)),
            record("e", 5.0, "Travel", date(2024, 4, 1)),
        ]
    }

    fn utc() -> Aggregator<Utc> {
        Aggregator::new(Utc)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn month_navigation_wraps_years() {
        let jan = YearMonth::new(2024, 1).unwrap();
        assert_eq!(jan.prev(), YearMonth::new(2023, 12).unwrap());
        assert_eq!(YearMonth::new(2023, 12).unwrap().next(), jan);
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2024, 12).unwrap().days_in_month(), 31);
        assert!(YearMonth::new(2024, 13).is_none());
    }

    #[test]
    fn month_filter_is_idempotent() {
        let records = sample();
        let march = YearMonth::new(2024, 3).unwrap();
        let once = utc().filter_month(&records, march);
        let twice = utc().filter_month(once.iter().copied(), march);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn sunday_window_ends_on_that_sunday() {
        let sunday = date(2024, 3, 10);
        assert_eq!(sunday.weekday(), Weekday::Sun);
        let window = WeekWindow::containing(sunday);
        assert_eq!(window.start, date(2024, 3, 4));
        assert_eq!(window.end, sunday);

        let monday = WeekWindow::containing(date(2024, 3, 4));
        assert_eq!(monday, window);
        assert_eq!(window.prev().start, date(2024, 2, 26));
        assert_eq!(window.next().end, date(2024, 3, 17));
    }

    #[test]
    fn day_buckets_cover_month_and_sum_to_total() {
        let records = sample();
        let march = YearMonth::new(2024, 3).unwrap();
        let buckets = utc().daily_buckets(&records, march);
        assert_eq!(buckets.len(), 31);
        assert_eq!(buckets[0], DayBucket { day: 1, amount: 50.0 });
        assert_eq!(buckets[14].amount, 60.0);

        let bucket_sum: f64 = buckets.iter().map(|b| b.amount).sum();
        let month_total = total(utc().filter_month(&records, march));
        assert!(approx(bucket_sum, month_total));
    }

    #[test]
    fn category_breakdown_keeps_first_occurrence_order() {
        let records = sample();
        let breakdown = category_breakdown(&records);
        let names: Vec<_> = breakdown.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, ["Food", "Bills", "Travel"]);
        assert!(approx(breakdown[0].amount, 179.0));

        let sum: f64 = breakdown.iter().map(|c| c.amount).sum();
        assert!(approx(sum, total(&records)));
    }

    #[test]
    fn empty_input_gives_empty_aggregates() {
        let records: Vec<ExpenseRecord> = Vec::new();
        let march = YearMonth::new(2024, 3).unwrap();
        let summary = utc().month_summary(&records, march, 100.0);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.count(), 0);
        assert!(summary.categories.is_empty());
        assert!(summary.daily.iter().all(|b| b.amount == 0.0));
        assert_eq!(summary.budget.remaining, 100.0);
    }

    #[test]
    fn over_budget_example() {
        let records = vec![
            record("a", 20.0, "Food", date(2024, 3, 1)),
            record("b", 30.0, "Food", date(2024, 3, 2)),
            record("c", 60.0, "Food", date(2024, 3, 3)),
        ];
        let summary = utc().month_summary(&records, YearMonth::new(2024, 3).unwrap(), 100.0);
        assert_eq!(summary.total, 110.0);
        assert_eq!(summary.budget.over_amount, 10.0);
        assert_eq!(summary.budget.spent_pct, 100.0);
        assert_eq!(summary.budget.remaining_pct, 0.0);
        assert!(approx(summary.budget.remaining, -10.0));
        assert!(approx(summary.budget.over_pct, 10.0));
        assert!(summary.budget.is_over());
    }

    #[test]
    fn under_budget_leaves_remainder() {
        let delta = budget_delta(40.0, 100.0);
        assert_eq!(delta.over_amount, 0.0);
        assert_eq!(delta.remaining, 60.0);
        assert_eq!(delta.spent_pct, 40.0);
        assert_eq!(delta.remaining_pct, 60.0);
    }

    #[test]
    fn zero_budget_means_no_budget() {
        assert_eq!(budget_delta(250.0, 0.0), BudgetDelta::default());
        assert_eq!(budget_delta(250.0, -10.0), BudgetDelta::default());
        assert!(!DayBucket { day: 1, amount: 500.0 }.exceeds(0.0));
        assert!(DayBucket { day: 1, amount: 500.0 }.exceeds(100.0));
        assert!(!DayBucket { day: 1, amount: 100.0 }.exceeds(100.0));
    }

    #[test]
    fn week_summary_sorts_newest_first_and_labels_days() {
        let records = vec![
            record("mon", 10.0, "Food", date(2024, 3, 4)),
            record("sun", 5.0, "Bills", date(2024, 3, 10)),
            record("wed", 7.0, "Food", date(2024, 3, 6)),
            record("next", 100.0, "Food", date(2024, 3, 11)),
        ];
        let summary = utc().week_summary(&records, date(2024, 3, 10), 20.0);
        let ids: Vec<_> = summary.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["sun", "wed", "mon"]);
        assert_eq!(summary.total, 22.0);
        assert_eq!(summary.daily.len(), 7);
        assert_eq!(summary.daily[0].label, "Mon");
        assert_eq!(summary.daily[0].amount, 10.0);
        assert_eq!(summary.daily[6].label, "Sun");
        assert_eq!(summary.daily[6].amount, 5.0);
        assert_eq!(summary.budget.over_amount, 2.0);
    }

    #[test]
    fn day_categories_drill_down() {
        let records = sample();
        let breakdown = utc().day_categories(&records, date(2024, 3, 1));
        assert_eq!(
            breakdown,
            vec![
                CategoryTotal {
                    category: "Food".into(),
                    amount: 20.0
                },
                CategoryTotal {
                    category: "Bills".into(),
                    amount: 30.0
                },
            ]
        );
    }

    #[test]
    fn grouping_follows_aggregator_time_zone() {
        use chrono::FixedOffset;

        // 2024-03-31 20:00 UTC is already April 1st at UTC+05:30
        let late = ExpenseRecord {
            date: Utc.with_ymd_and_hms(2024, 3, 31, 20, 0, 0).unwrap(),
            ..record("x", 10.0, "Food", date(2024, 3, 31))
        };
        let records = vec![late];
        let ist = Aggregator::new(FixedOffset::east_opt(5 * 3600 + 1800).unwrap());
        assert_eq!(ist.filter_month(&records, YearMonth::new(2024, 4).unwrap()).len(), 1);
        assert_eq!(utc().filter_month(&records, YearMonth::new(2024, 3).unwrap()).len(), 1);
    }
}
