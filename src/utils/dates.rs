use chrono::{DateTime, Days, Months, NaiveDate, TimeZone, Utc};

/// Project a billing anchor one calendar month forward. Chrono clamps at
/// month end, so Jan 31 -> Feb 28/29.
pub fn one_month_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX)
}

/// Calendar days from `from` to `to`; negative when `to` is in the past.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// UTC instant range [00:00:00, next midnight) covering one calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap());
    let end_date = date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    let end = Utc.from_utc_datetime(&end_date.and_hms_opt(0, 0, 0).unwrap());
    (start, end)
}
