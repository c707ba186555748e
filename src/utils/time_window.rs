use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};

/// The midnight-to-midnight window containing `now`, in `now`'s own
/// timezone. Daily views and aggregates scope themselves with this:
/// an order belongs to "today" iff its timestamp is in `[start, end)`.
pub fn today_window<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
    let start = local_midnight(&now.timezone(), now.date_naive());
    let end = start.clone() + Duration::days(1);
    (start, end)
}

/// First day of the current week. Weeks start on Sunday.
pub fn week_start_date<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    let today = now.date_naive();
    today - Duration::days(today.weekday().num_days_from_sunday() as i64)
}

/// Local midnight for `date`. Midnight can be skipped or doubled by DST;
/// doubles resolve to the earlier instant, and stepping by hours finds the
/// first instant of a day that starts late.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap();
    for hour in 0..24 {
        let candidate = midnight + Duration::hours(hour);
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt;
        }
    }
    tz.from_utc_datetime(&midnight)
}
