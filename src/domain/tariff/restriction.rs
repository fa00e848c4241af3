//! Tariff restrictions
//!
//! A restriction is a conjunction of optional bounds. A session matches when
//! every bound that is present is satisfied; absent bounds impose nothing.
//!
//! Bound semantics:
//! - time of day: `[start, end)`, wrapping past midnight when `start > end`
//! - date: `[start, end)`, the end date itself is excluded
//! - energy, power, duration: `min <= value <= max`, both ends inclusive
//! - weekdays: membership

use chrono::{NaiveDate, NaiveTime, TimeDelta, Weekday};
use rust_decimal::Decimal;
use tracing::trace;

use crate::domain::session::SessionSnapshot;
use crate::support::errors::{TariffError, TariffResult};

/// Time-of-day window, start inclusive, end exclusive.
///
/// A missing start means midnight, a missing end means the end of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
}

impl TimeWindow {
    pub fn new(start: Option<NaiveTime>, end: Option<NaiveTime>) -> TariffResult<Self> {
        match (start, end) {
            (None, None) => Err(TariffError::invalid(
                "time window",
                "needs a start or an end time",
            )),
            (Some(start), Some(end)) if start == end => Err(TariffError::ambiguous(format!(
                "time window starts and ends at {start}"
            ))),
            _ => Ok(Self { start, end }),
        }
    }

    pub fn start(&self) -> Option<NaiveTime> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveTime> {
        self.end
    }

    /// Whether the window runs past midnight.
    pub fn wraps(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => time >= start || time < end,
            (start, end) => {
                start.map_or(true, |start| time >= start) && end.map_or(true, |end| time < end)
            }
        }
    }
}

/// Calendar date window, start inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> TariffResult<Self> {
        match (start, end) {
            (None, None) => Err(TariffError::invalid(
                "date window",
                "needs a start or an end date",
            )),
            (Some(start), Some(end)) if start >= end => Err(TariffError::ambiguous(format!(
                "date window [{start}, {end}) is empty"
            ))),
            _ => Ok(Self { start, end }),
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date < end)
    }
}

/// Inclusive `[min, max]` bounds; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T: PartialOrd + Copy + std::fmt::Display> Bounds<T> {
    pub fn new(what: &'static str, min: Option<T>, max: Option<T>) -> TariffResult<Self> {
        match (min, max) {
            (None, None) => Err(TariffError::invalid(what, "needs a minimum or a maximum")),
            (Some(min), Some(max)) if min > max => Err(TariffError::ambiguous(format!(
                "{what} minimum {min} exceeds maximum {max}"
            ))),
            _ => Ok(Self { min, max }),
        }
    }

    pub fn min(&self) -> Option<T> {
        self.min
    }

    pub fn max(&self) -> Option<T> {
        self.max
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Conditions under which a tariff element applies.
///
/// Built through [`TariffRestriction::builder`]; at least one bound must be
/// set and no bound may contradict itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TariffRestriction {
    time_window: Option<TimeWindow>,
    date_window: Option<DateWindow>,
    energy_range: Option<Bounds<Decimal>>,
    power_range: Option<Bounds<Decimal>>,
    duration_range: Option<Bounds<TimeDelta>>,
    /// Sorted Monday first, no duplicates.
    days_of_week: Option<Vec<Weekday>>,
}

impl TariffRestriction {
    pub fn builder() -> TariffRestrictionBuilder {
        TariffRestrictionBuilder::default()
    }

    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    pub fn date_window(&self) -> Option<&DateWindow> {
        self.date_window.as_ref()
    }

    /// Consumed energy in kWh.
    pub fn energy_range(&self) -> Option<&Bounds<Decimal>> {
        self.energy_range.as_ref()
    }

    /// Charging power in kW.
    pub fn power_range(&self) -> Option<&Bounds<Decimal>> {
        self.power_range.as_ref()
    }

    pub fn duration_range(&self) -> Option<&Bounds<TimeDelta>> {
        self.duration_range.as_ref()
    }

    pub fn days_of_week(&self) -> Option<&[Weekday]> {
        self.days_of_week.as_deref()
    }

    pub fn matches(&self, session: &SessionSnapshot) -> bool {
        let time_ok = self
            .time_window
            .map_or(true, |window| window.contains(session.time()));
        let date_ok = self
            .date_window
            .map_or(true, |window| window.contains(session.date()));
        let energy_ok = self
            .energy_range
            .map_or(true, |range| range.contains(session.energy_kwh()));
        let power_ok = self
            .power_range
            .map_or(true, |range| range.contains(session.power_kw()));
        let duration_ok = self
            .duration_range
            .map_or(true, |range| range.contains(session.duration()));
        let day_ok = self
            .days_of_week
            .as_ref()
            .map_or(true, |days| days.contains(&session.weekday()));

        trace!(
            time_ok,
            date_ok,
            energy_ok,
            power_ok,
            duration_ok,
            day_ok,
            "Restriction evaluated"
        );

        time_ok && date_ok && energy_ok && power_ok && duration_ok && day_ok
    }
}

/// Collects raw bounds and validates them all at once in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct TariffRestrictionBuilder {
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    min_kwh: Option<Decimal>,
    max_kwh: Option<Decimal>,
    min_power: Option<Decimal>,
    max_power: Option<Decimal>,
    min_duration: Option<TimeDelta>,
    max_duration: Option<TimeDelta>,
    days_of_week: Option<Vec<Weekday>>,
}

impl TariffRestrictionBuilder {
    pub fn start_time(mut self, time: impl Into<Option<NaiveTime>>) -> Self {
        self.start_time = time.into();
        self
    }

    pub fn end_time(mut self, time: impl Into<Option<NaiveTime>>) -> Self {
        self.end_time = time.into();
        self
    }

    pub fn start_date(mut self, date: impl Into<Option<NaiveDate>>) -> Self {
        self.start_date = date.into();
        self
    }

    pub fn end_date(mut self, date: impl Into<Option<NaiveDate>>) -> Self {
        self.end_date = date.into();
        self
    }

    pub fn min_kwh(mut self, kwh: impl Into<Option<Decimal>>) -> Self {
        self.min_kwh = kwh.into();
        self
    }

    pub fn max_kwh(mut self, kwh: impl Into<Option<Decimal>>) -> Self {
        self.max_kwh = kwh.into();
        self
    }

    pub fn min_power(mut self, kw: impl Into<Option<Decimal>>) -> Self {
        self.min_power = kw.into();
        self
    }

    pub fn max_power(mut self, kw: impl Into<Option<Decimal>>) -> Self {
        self.max_power = kw.into();
        self
    }

    pub fn min_duration(mut self, duration: impl Into<Option<TimeDelta>>) -> Self {
        self.min_duration = duration.into();
        self
    }

    pub fn max_duration(mut self, duration: impl Into<Option<TimeDelta>>) -> Self {
        self.max_duration = duration.into();
        self
    }

    pub fn days_of_week(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.days_of_week = Some(days.into_iter().collect());
        self
    }

    /// Whether no bound has been set at all.
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.end_time.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.min_kwh.is_none()
            && self.max_kwh.is_none()
            && self.min_power.is_none()
            && self.max_power.is_none()
            && self.min_duration.is_none()
            && self.max_duration.is_none()
            && self.days_of_week.is_none()
    }

    pub fn build(self) -> TariffResult<TariffRestriction> {
        if self.is_empty() {
            return Err(TariffError::invalid(
                "tariff restriction",
                "at least one bound must be set",
            ));
        }
        for (field, duration) in [
            ("min_duration", self.min_duration),
            ("max_duration", self.max_duration),
        ] {
            if duration.is_some_and(|d| d.subsec_nanos() != 0) {
                return Err(TariffError::invalid(
                    "tariff restriction",
                    format!("{field} must be a whole number of seconds"),
                ));
            }
        }

        let time_window = optional_pair(self.start_time, self.end_time)
            .map(|(start, end)| TimeWindow::new(start, end))
            .transpose()?;
        let date_window = optional_pair(self.start_date, self.end_date)
            .map(|(start, end)| DateWindow::new(start, end))
            .transpose()?;
        let energy_range = optional_pair(self.min_kwh, self.max_kwh)
            .map(|(min, max)| Bounds::new("energy range", min, max))
            .transpose()?;
        let power_range = optional_pair(self.min_power, self.max_power)
            .map(|(min, max)| Bounds::new("power range", min, max))
            .transpose()?;
        let duration_range = optional_pair(self.min_duration, self.max_duration)
            .map(|(min, max)| Bounds::new("duration range", min, max))
            .transpose()?;

        let days_of_week = match self.days_of_week {
            Some(days) if days.is_empty() => {
                return Err(TariffError::ambiguous("empty day-of-week set never matches"));
            }
            Some(mut days) => {
                days.sort_by_key(Weekday::num_days_from_monday);
                days.dedup();
                Some(days)
            }
            None => None,
        };

        Ok(TariffRestriction {
            time_window,
            date_window,
            energy_range,
            power_range,
            duration_range,
            days_of_week,
        })
    }
}

/// `None` when both sides are absent.
fn optional_pair<T>(a: Option<T>, b: Option<T>) -> Option<(Option<T>, Option<T>)> {
    if a.is_none() && b.is_none() {
        None
    } else {
        Some((a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    /// 2024-06-09 is a Sunday, 2024-06-10 a Monday.
    fn session(when: &str, kwh: &str, kw: &str, minutes: i64) -> SessionSnapshot {
        SessionSnapshot::new(at(when), d(kwh), d(kw), TimeDelta::minutes(minutes))
    }

    #[test]
    fn weekend_restriction_only_matches_weekends() {
        let r = TariffRestriction::builder()
            .days_of_week([Weekday::Sat, Weekday::Sun])
            .build()
            .unwrap();

        assert!(r.matches(&session("2024-06-09 03:15", "80", "150", 600)));
        assert!(r.matches(&session("2024-06-09 23:59", "0", "0", 0)));
        assert!(!r.matches(&session("2024-06-10 12:00", "10", "11", 60)));
    }

    #[test]
    fn restriction_without_bounds_matches_everything() {
        let r = TariffRestriction {
            time_window: None,
            date_window: None,
            energy_range: None,
            power_range: None,
            duration_range: None,
            days_of_week: None,
        };
        assert!(r.matches(&session("2024-06-09 03:15", "80", "150", 600)));
        assert!(r.matches(&session("2024-01-01 00:00", "0", "0", 0)));
    }

    #[test]
    fn builder_rejects_empty_restriction() {
        let err = TariffRestriction::builder().build().unwrap_err();
        assert!(matches!(err, TariffError::InvalidConstruction { .. }));
    }

    #[test]
    fn any_single_bound_is_enough() {
        assert!(TariffRestriction::builder().min_power(d("0")).build().is_ok());
        assert!(TariffRestriction::builder()
            .max_duration(TimeDelta::hours(1))
            .build()
            .is_ok());
        assert!(TariffRestriction::builder().end_date(ymd(2025, 1, 1)).build().is_ok());
    }

    #[test]
    fn fractional_second_durations_are_rejected() {
        let err = TariffRestriction::builder()
            .min_duration(TimeDelta::milliseconds(1500))
            .build()
            .unwrap_err();
        assert!(matches!(err, TariffError::InvalidConstruction { .. }));

        assert!(TariffRestriction::builder()
            .max_duration(TimeDelta::milliseconds(90_001))
            .build()
            .is_err());
        assert!(TariffRestriction::builder()
            .max_duration(TimeDelta::milliseconds(90_000))
            .build()
            .is_ok());
    }

    #[test]
    fn days_are_deduplicated() {
        let r = TariffRestriction::builder()
            .days_of_week([Weekday::Sun, Weekday::Sat, Weekday::Sun])
            .build()
            .unwrap();
        assert_eq!(r.days_of_week(), Some(&[Weekday::Sat, Weekday::Sun][..]));
    }

    #[test]
    fn empty_day_set_is_rejected() {
        let err = TariffRestriction::builder()
            .days_of_week(Vec::<Weekday>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, TariffError::AmbiguousRestriction(_)));
    }

    #[test]
    fn time_window_end_is_exclusive() {
        let w = TimeWindow::new(Some(hm(13, 30)), Some(hm(19, 45))).unwrap();
        assert!(!w.contains(hm(13, 29)));
        assert!(w.contains(hm(13, 30)));
        assert!(w.contains(hm(19, 44)));
        assert!(!w.contains(hm(19, 45)));
        assert!(!w.wraps());
    }

    #[test]
    fn time_window_wraps_past_midnight() {
        let w = TimeWindow::new(Some(hm(22, 0)), Some(hm(6, 0))).unwrap();
        assert!(w.wraps());
        assert!(w.contains(hm(23, 0)));
        assert!(w.contains(hm(0, 0)));
        assert!(w.contains(hm(5, 59)));
        assert!(!w.contains(hm(6, 0)));
        assert!(!w.contains(hm(12, 0)));
        assert!(w.contains(hm(22, 0)));
    }

    #[test]
    fn half_open_time_windows() {
        let from = TimeWindow::new(Some(hm(18, 0)), None).unwrap();
        assert!(from.contains(hm(23, 59)));
        assert!(!from.contains(hm(17, 59)));

        let until = TimeWindow::new(None, Some(hm(7, 0))).unwrap();
        assert!(until.contains(hm(0, 0)));
        assert!(!until.contains(hm(7, 0)));
    }

    #[test]
    fn zero_length_time_window_is_ambiguous() {
        let err = TimeWindow::new(Some(hm(8, 0)), Some(hm(8, 0))).unwrap_err();
        assert!(matches!(err, TariffError::AmbiguousRestriction(_)));
    }

    #[test]
    fn date_window_excludes_end_date() {
        let w = DateWindow::new(Some(ymd(2015, 12, 24)), Some(ymd(2015, 12, 27))).unwrap();
        assert!(!w.contains(ymd(2015, 12, 23)));
        assert!(w.contains(ymd(2015, 12, 24)));
        assert!(w.contains(ymd(2015, 12, 26)));
        assert!(!w.contains(ymd(2015, 12, 27)));
    }

    #[test]
    fn inverted_date_window_is_ambiguous() {
        let err = DateWindow::new(Some(ymd(2016, 1, 1)), Some(ymd(2015, 1, 1))).unwrap_err();
        assert!(matches!(err, TariffError::AmbiguousRestriction(_)));
        assert!(DateWindow::new(Some(ymd(2016, 1, 1)), Some(ymd(2016, 1, 1))).is_err());
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let b = Bounds::new("energy range", Some(d("20")), Some(d("50"))).unwrap();
        assert!(!b.contains(d("19.99")));
        assert!(b.contains(d("20")));
        assert!(b.contains(d("50")));
        assert!(!b.contains(d("50.01")));

        let open = Bounds::new("power range", None, Some(d("22"))).unwrap();
        assert!(open.contains(d("0")));
        assert!(!open.contains(d("22.1")));
    }

    #[test]
    fn min_above_max_is_ambiguous() {
        let err = TariffRestriction::builder()
            .min_kwh(d("50"))
            .max_kwh(d("20"))
            .build()
            .unwrap_err();
        assert!(matches!(err, TariffError::AmbiguousRestriction(_)));

        let err = TariffRestriction::builder()
            .min_duration(TimeDelta::hours(2))
            .max_duration(TimeDelta::hours(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, TariffError::AmbiguousRestriction(_)));
    }

    #[test]
    fn all_present_bounds_must_hold() {
        let r = TariffRestriction::builder()
            .start_time(hm(8, 0))
            .end_time(hm(20, 0))
            .min_power(d("50"))
            .max_duration(TimeDelta::minutes(90))
            .days_of_week([Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri])
            .build()
            .unwrap();

        assert!(r.matches(&session("2024-06-10 12:00", "30", "150", 45)));
        // too slow
        assert!(!r.matches(&session("2024-06-10 12:00", "30", "11", 45)));
        // too long
        assert!(!r.matches(&session("2024-06-10 12:00", "30", "150", 91)));
        // at night
        assert!(!r.matches(&session("2024-06-10 21:00", "30", "150", 45)));
        // Sunday
        assert!(!r.matches(&session("2024-06-09 12:00", "30", "150", 45)));
    }

    #[test]
    fn energy_and_date_bounds_use_session_values() {
        let r = TariffRestriction::builder()
            .min_kwh(d("20"))
            .start_date(ymd(2024, 6, 1))
            .end_date(ymd(2024, 7, 1))
            .build()
            .unwrap();

        assert!(r.matches(&session("2024-06-30 23:59", "20", "11", 10)));
        assert!(!r.matches(&session("2024-07-01 00:00", "20", "11", 10)));
        assert!(!r.matches(&session("2024-06-15 10:00", "19.9", "11", 10)));
    }
}
