//! Peak hour classification.
//!
//! Forecast confidence is penalized for hours that fall inside configured
//! peak windows. The weekend/weekday window set is selected from the
//! *current* calendar day at call time, not the forecasted hour's own day;
//! callers pass the flag in.

use crate::forecast::config::PeakHours;

/// Pure lookup of whether an hour falls inside a configured peak window.
pub struct PeakHourClassifier {
    peak_hours: PeakHours,
}

impl PeakHourClassifier {
    pub fn new(peak_hours: PeakHours) -> Self {
        Self { peak_hours }
    }

    /// `true` iff `hour` lies in any configured inclusive range for the
    /// given day type.
    pub fn is_peak(&self, hour: u32, is_weekend: bool) -> bool {
        let ranges = if is_weekend {
            &self.peak_hours.weekend
        } else {
            &self.peak_hours.weekday
        };
        ranges
            .iter()
            .any(|&(start, end)| (start..=end).contains(&hour))
    }
}

impl Default for PeakHourClassifier {
    fn default() -> Self {
        Self::new(PeakHours::default())
    }
}
