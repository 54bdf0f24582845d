//! Crew throughput assumptions used to turn quantities into labor hours.
//!
//! These are business heuristics, not physics. The orchestrator only talks
//! to [`ProductivityModel`], so a contractor can plug in their own numbers.

use serde::{Deserialize, Serialize};

pub trait ProductivityModel {
    fn sealcoat_hours(&self, square_feet: f64) -> f64;
    fn crack_fill_hours(&self, linear_feet: f64) -> f64;
    fn patching_hours(&self, square_feet: f64) -> f64;
    fn striping_hours(&self, linear_feet: f64) -> f64;
}

/// Throughput rate with a minimum billable block of hours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Throughput {
    pub units_per_hour: f64,
    pub min_hours: f64,
}

impl Throughput {
    pub fn hours(&self, units: f64) -> f64 {
        let hours = if self.units_per_hour > 0.0 {
            units / self.units_per_hour
        } else {
            0.0
        };
        hours.max(self.min_hours)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardProductivity {
    /// Square feet per hour for a 2-3 person crew.
    pub sealcoat: Throughput,
    /// Linear feet of crack per hour.
    pub crack_fill: Throughput,
    pub patching: Throughput,
    /// Linear feet of paint per hour.
    pub striping: Throughput,
}

impl Default for StandardProductivity {
    fn default() -> Self {
        Self {
            sealcoat: Throughput {
                units_per_hour: 3000.0,
                min_hours: 2.0,
            },
            crack_fill: Throughput {
                units_per_hour: 100.0,
                min_hours: 1.0,
            },
            patching: Throughput {
                units_per_hour: 400.0,
                min_hours: 1.0,
            },
            striping: Throughput {
                units_per_hour: 300.0,
                min_hours: 1.0,
            },
        }
    }
}

impl ProductivityModel for StandardProductivity {
    fn sealcoat_hours(&self, square_feet: f64) -> f64 {
        self.sealcoat.hours(square_feet)
    }

    fn crack_fill_hours(&self, linear_feet: f64) -> f64 {
        self.crack_fill.hours(linear_feet)
    }

    fn patching_hours(&self, square_feet: f64) -> f64 {
        self.patching.hours(square_feet)
    }

    fn striping_hours(&self, linear_feet: f64) -> f64 {
        self.striping.hours(linear_feet)
    }
}
