use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use super::aggregate::VarAggregates;
use super::point::Point;
use crate::error::{MalformedRecordError, TrajParseError};

// ---------------------------------------------------------------------------
// Header enums
// ---------------------------------------------------------------------------

/// Run direction declared in record 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl FromStr for Direction {
    type Err = MalformedRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORWARD" => Ok(Direction::Forward),
            "BACKWARD" => Ok(Direction::Backward),
            other => Err(MalformedRecordError::UnknownDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "FORWARD"),
            Direction::Backward => write!(f, "BACKWARD"),
        }
    }
}

/// Record 1 carries a single token in the old layout, more in the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    Old,
    New,
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatType::Old => write!(f, "old"),
            FormatType::New => write!(f, "new"),
        }
    }
}

/// Records 1–5 as read by the loader.
#[derive(Debug, Clone)]
pub(super) struct Header {
    pub(super) format: FormatType,
    pub(super) grids: Vec<Vec<String>>,
    pub(super) direction: Direction,
    pub(super) method: String,
    pub(super) starting_info: Vec<Vec<String>>,
    pub(super) vars: Arc<[String]>,
}

type CoordKey = (OrderedFloat<f64>, OrderedFloat<f64>);

fn coord_key(lat: f64, lon: f64) -> CoordKey {
    (OrderedFloat(lat), OrderedFloat(lon))
}

// ---------------------------------------------------------------------------
// Traj: one parsed trajectory file
// ---------------------------------------------------------------------------

/// A parsed HYSPLIT trajectory endpoint file.
///
/// Immutable after construction: the point sequence, the coordinate index and
/// the aggregates are all derived once in [`Traj::from_path`] /
/// [`Traj::parse_str`]. Two trajectories are equal iff their source paths are.
#[derive(Debug, Clone)]
pub struct Traj {
    path: PathBuf,
    name: String,
    header: Header,
    points: Vec<Point>,
    coords_to_point: HashMap<CoordKey, usize>,
    aggregates: VarAggregates,
}

impl Traj {
    pub(super) fn assemble(
        path: PathBuf,
        header: Header,
        points: Vec<Point>,
    ) -> Result<Self, TrajParseError> {
        if points.is_empty() {
            return Err(TrajParseError::NoPoints);
        }

        // A revisited coordinate keeps the later point in the index only.
        let coords_to_point = points
            .iter()
            .enumerate()
            .map(|(idx, p)| (coord_key(p.lat(), p.lon()), idx))
            .collect();

        let aggregates = VarAggregates::from_points(&header.vars, &points);

        Ok(Traj {
            name: derive_name(&path),
            path,
            header,
            points,
            coords_to_point,
            aggregates,
        })
    }

    /// Same trajectory backed by a file at another location.
    pub(crate) fn relocated(&self, path: PathBuf) -> Traj {
        Traj {
            name: derive_name(&path),
            path,
            ..self.clone()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the source path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid_count(&self) -> usize {
        self.header.grids.len()
    }

    pub fn format(&self) -> FormatType {
        self.header.format
    }

    /// Record 2 token tuples, one per meteorological grid.
    pub fn grids(&self) -> &[Vec<String>] {
        &self.header.grids
    }

    pub fn trajectory_count(&self) -> usize {
        self.header.starting_info.len()
    }

    pub fn direction(&self) -> Direction {
        self.header.direction
    }

    pub fn method(&self) -> &str {
        &self.header.method
    }

    /// Record 4 token tuples, one per declared trajectory.
    pub fn starting_info(&self) -> &[Vec<String>] {
        &self.header.starting_info
    }

    /// Diagnostic variable names from record 5, in file order.
    pub fn vars(&self) -> &[String] {
        &self.header.vars
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a trajectory without points fails to parse.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn start_point(&self) -> &Point {
        // non-empty by construction
        &self.points[0]
    }

    pub fn end_point(&self) -> &Point {
        &self.points[self.points.len() - 1]
    }

    /// Release point: first record of a backward run, last of a forward one.
    pub fn target_point(&self) -> &Point {
        match self.header.direction {
            Direction::Backward => self.start_point(),
            Direction::Forward => self.end_point(),
        }
    }

    /// Point recorded at exactly `(lat, lon)`.
    pub fn point_at(&self, lat: f64, lon: f64) -> Option<&Point> {
        self.coords_to_point
            .get(&coord_key(lat, lon))
            .map(|&idx| &self.points[idx])
    }

    /// Points whose value for `var` is non-zero, in order.
    pub fn nonzero_points(&self, var: &str) -> Vec<&Point> {
        self.points
            .iter()
            .filter(|p| p.value(var).is_some_and(|v| v != 0.0))
            .collect()
    }

    pub fn aggregates(&self) -> &VarAggregates {
        &self.aggregates
    }

    pub fn min(&self, var: &str) -> Option<f64> {
        self.aggregates.min(var)
    }

    pub fn max(&self, var: &str) -> Option<f64> {
        self.aggregates.max(var)
    }

    /// Sum of `var` over every point.
    pub fn total(&self, var: &str) -> Option<f64> {
        self.aggregates.total(var)
    }
}

fn derive_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl PartialEq for Traj {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Traj {}

impl fmt::Display for Traj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Traj '{}' ({} points)", self.name, self.points.len())
    }
}

impl<'a> IntoIterator for &'a Traj {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
