mod common;

use approx::assert_relative_eq;
use hytraj::{Direction, FormatType, Traj, TrajParseError};

use common::{assert_aggregates_consistent, data};

#[test]
fn backward_three_point_file() {
    let traj = Traj::from_path(data("backward_3pt.traj")).unwrap();

    assert_eq!(traj.name(), "backward_3pt.traj");
    assert_eq!(traj.vars(), ["PRESSURE", "TEMP"]);
    assert_eq!(traj.direction(), Direction::Backward);
    assert_eq!(traj.len(), 3);
    assert_eq!(traj.target_point(), &traj.points()[0]);
    assert_eq!(traj.start_point(), traj.target_point());
    assert_relative_eq!(traj.total("TEMP").unwrap(), 853.6, epsilon = 1e-9);
    assert_aggregates_consistent(&traj);
}

#[test]
fn forward_old_format_file() {
    let traj = Traj::from_path(data("forward_old.traj")).unwrap();

    assert_eq!(traj.format(), FormatType::Old);
    assert_eq!(traj.grid_count(), 2);
    assert_eq!(traj.grids()[1], ["EDAS", "19", "1", "1", "0", "0"]);
    assert_eq!(traj.trajectory_count(), 2);
    assert_eq!(traj.method(), "ISOBA");
    assert_eq!(traj.target_point(), traj.end_point());

    let target = traj.target_point();
    assert_eq!(target.coords(), (35.6, -89.1));
    assert_eq!((target.year(), target.month(), target.hour()), (2019, 1, 1));
    assert_eq!(traj.points()[0].year(), 2018);

    assert_relative_eq!(traj.total("RAINFALL").unwrap(), 1.5, epsilon = 1e-9);
    assert_eq!(traj.nonzero_points("RAINFALL").len(), 2);
    assert_eq!(traj.point_at(35.21, -89.7).unwrap().height(), 1040.0);
    assert_aggregates_consistent(&traj);
}

#[test]
fn garbage_file_is_a_parse_error() {
    let err = Traj::from_path(data("mixed/notes.txt")).unwrap_err();
    assert!(matches!(err, TrajParseError::Malformed { line: 1, .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Traj::from_path(data("nope.traj")).unwrap_err();
    assert!(matches!(err, TrajParseError::Io(_)));
}
