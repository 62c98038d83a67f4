//! Holding-period classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Holding period of the trade under debate, resolved to calendar days
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe {
    /// Label as supplied (`"3d"`, `"swing"`, ...)
    pub label: String,
    /// Horizon in days; 0 for intraday
    pub days: u32,
}

impl Timeframe {
    pub fn from_days(days: u32) -> Self {
        Self {
            label: format!("{}d", days),
            days,
        }
    }

    /// True when the horizon is at most `max_days`
    pub fn is_short(&self, max_days: u32) -> bool {
        self.days <= max_days
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for Timeframe {
    type Err = CoreError;

    /// Accepts `intraday`, `swing`, `position`, or `<n><unit>` where unit is
    /// `d`, `w`, `m`/`mo` or `y` (`3d`, `2w`, `6m`, `1y`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        let invalid = || CoreError::InvalidTimeframe(s.to_string());

        let days = match label.as_str() {
            "" => return Err(invalid()),
            "intraday" | "scalp" => 0,
            "swing" => 7,
            "position" => 90,
            _ => {
                let split = label
                    .find(|c: char| !c.is_ascii_digit())
                    .ok_or_else(invalid)?;
                let (count, unit) = label.split_at(split);
                let count: u32 = count.parse().map_err(|_| invalid())?;
                let per_unit = match unit {
                    "d" | "day" | "days" => 1,
                    "w" | "wk" | "week" | "weeks" => 7,
                    "m" | "mo" | "month" | "months" => 30,
                    "y" | "yr" | "year" | "years" => 365,
                    _ => return Err(invalid()),
                };
                count.checked_mul(per_unit).ok_or_else(invalid)?
            }
        };

        Ok(Self { label, days })
    }
}
