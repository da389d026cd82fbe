//! E5 maintenance windows.
//!
//! E5 is taken offline once a week, and occasionally for planned work. The finance health check reports the system as
//! unavailable while either window is open, so that the front end can tell payers when to come back.
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use log::*;

#[derive(Clone, Debug, Default)]
pub struct MaintenanceConfig {
    pub weekly_day: Option<Weekday>,
    pub weekly_start: Option<NaiveTime>,
    pub weekly_end: Option<NaiveTime>,
    /// `Err` holds a description of a timestamp that could not be parsed.
    pub planned_start: Option<Result<DateTime<Utc>, String>>,
    pub planned_end: Option<Result<DateTime<Utc>, String>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinanceSystemStatus {
    Healthy,
    /// E5 is down for maintenance until the given time.
    Maintenance(DateTime<Utc>),
}

impl MaintenanceConfig {
    /// Works out whether E5 is in a maintenance window at `now`. If both windows are open, the one that ends last wins.
    ///
    /// Fails if the planned maintenance times are set but invalid.
    pub fn status_at(&self, now: DateTime<Utc>) -> Result<FinanceSystemStatus, String> {
        let mut available_at = self.weekly_window_end(now);
        if let (Some(start), Some(end)) = (&self.planned_start, &self.planned_end) {
            let start = start.clone()?;
            let end = end.clone()?;
            let later_than_weekly = available_at.map(|t| end > t).unwrap_or(true);
            if start < now && now < end && later_than_weekly {
                available_at = Some(end);
            }
        }
        match available_at {
            Some(end) => {
                trace!("🪛️ E5 is in a maintenance window until {end}");
                Ok(FinanceSystemStatus::Maintenance(end))
            },
            None => Ok(FinanceSystemStatus::Healthy),
        }
    }

    fn weekly_window_end(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let (day, start, end) = (self.weekly_day?, self.weekly_start?, self.weekly_end?);
        if now.weekday() != day {
            return None;
        }
        let today = now.date_naive();
        let start = today.and_time(start).and_utc();
        let end = today.and_time(end).and_utc();
        (start < now && now < end).then_some(end)
    }
}
