//! Common types used across the platform

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date range for reports and dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, &'static str> {
        if start > end {
            return Err("Range start must not be after range end");
        }
        Ok(Self { start, end })
    }

    /// Build a range from optional query values; both bounds are required
    pub fn from_bounds(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, &'static str> {
        match (from, to) {
            (Some(from), Some(to)) => Self::new(from, to),
            _ => Err("Both from and to dates are required"),
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Preset dashboard windows, all ending today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardRange {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "this_month")]
    ThisMonth,
    #[serde(rename = "custom")]
    Custom,
}

impl DashboardRange {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today" => Some(DashboardRange::Today),
            "7d" => Some(DashboardRange::Last7Days),
            "30d" => Some(DashboardRange::Last30Days),
            "90d" => Some(DashboardRange::Last90Days),
            "this_month" => Some(DashboardRange::ThisMonth),
            "custom" => Some(DashboardRange::Custom),
            _ => None,
        }
    }

    /// Resolve to concrete dates. `Custom` needs both explicit bounds.
    pub fn resolve(
        self,
        today: NaiveDate,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DateRange, &'static str> {
        let trailing = |days: i64| DateRange {
            start: today - Duration::days(days - 1),
            end: today,
        };

        match self {
            DashboardRange::Today => Ok(DateRange::single_day(today)),
            DashboardRange::Last7Days => Ok(trailing(7)),
            DashboardRange::Last30Days => Ok(trailing(30)),
            DashboardRange::Last90Days => Ok(trailing(90)),
            DashboardRange::ThisMonth => Ok(DateRange {
                start: today.with_day(1).unwrap_or(today),
                end: today,
            }),
            DashboardRange::Custom => match (from, to) {
                (Some(from), Some(to)) => DateRange::new(from, to),
                _ => Err("Custom range requires both from and to dates"),
            },
        }
    }
}
