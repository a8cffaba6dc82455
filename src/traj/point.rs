use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};

// ---------------------------------------------------------------------------
// Point: one sample along a trajectory
// ---------------------------------------------------------------------------

/// One time-stamped sample of a trajectory (record 6 line).
///
/// Points are built once by the loader and never mutated. Variable values are
/// stored positionally; the names are shared with the owning trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub(super) traj_num: u32,
    pub(super) grid_num: u32,
    pub(super) datetime: NaiveDateTime,
    pub(super) forecast_hour: i32,
    pub(super) traj_age: f64,
    pub(super) lat: f64,
    pub(super) lon: f64,
    pub(super) height: f64,
    pub(super) vars: Arc<[String]>,
    pub(super) values: Vec<f64>,
}

impl Point {
    /// Trajectory-local index (column 1).
    pub fn traj_num(&self) -> u32 {
        self.traj_num
    }

    /// Index of the meteorological grid the sample came from.
    pub fn grid_num(&self) -> u32 {
        self.grid_num
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn year(&self) -> i32 {
        self.datetime.year()
    }

    pub fn month(&self) -> u32 {
        self.datetime.month()
    }

    pub fn day(&self) -> u32 {
        self.datetime.day()
    }

    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    pub fn minute(&self) -> u32 {
        self.datetime.minute()
    }

    pub fn forecast_hour(&self) -> i32 {
        self.forecast_hour
    }

    /// Hours since release; negative along backward runs.
    pub fn traj_age(&self) -> f64 {
        self.traj_age
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// `(lat, lon)` pair.
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    /// Height above ground, metres.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Value of a diagnostic variable, `None` if the header does not declare it.
    pub fn value(&self, var: &str) -> Option<f64> {
        self.vars
            .iter()
            .position(|name| name == var)
            .map(|idx| self.values[idx])
    }

    /// Variable values in header order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(name, value)` pairs in header order.
    pub fn data(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.vars
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {}", self.lat, self.lon, self.datetime)
    }
}
