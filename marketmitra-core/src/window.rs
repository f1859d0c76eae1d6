//! Historical date window for price requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed date range over which sector performance is measured.
///
/// `start` is always inclusive. `end` is exclusive unless `end_inclusive`
/// is set, matching how most market-data download APIs treat the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub end_inclusive: bool,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate, end_inclusive: bool) -> Self {
        Self {
            start,
            end,
            end_inclusive,
        }
    }

    /// Jan–Jun 2024, the post-budget window of the Feb 2024 Union Budget.
    pub fn default_post_budget() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default(),
            end_inclusive: false,
        }
    }

    /// A window is valid when it contains at least one calendar day.
    pub fn is_valid(&self) -> bool {
        if self.end_inclusive {
            self.start <= self.end
        } else {
            self.start < self.end
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if date < self.start {
            return false;
        }
        if self.end_inclusive {
            date <= self.end
        } else {
            date < self.end
        }
    }

    /// Last calendar day inside the window.
    pub fn last_day(&self) -> NaiveDate {
        if self.end_inclusive {
            self.end
        } else {
            self.end.pred_opt().unwrap_or(self.end)
        }
    }

    /// Short human label, e.g. `2024-01-01 → 2024-06-29`.
    pub fn label(&self) -> String {
        format!("{} → {}", self.start, self.last_day())
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::default_post_budget()
    }
}
