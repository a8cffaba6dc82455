#![allow(dead_code)]

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use hytraj::Traj;

pub fn data(name: &str) -> PathBuf {
    Path::new("tests/data").join(name)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Backward run with one `TEMP` value per point, released in `month` of 2019.
pub fn traj_text(month: u32, temps: &[f64]) -> String {
    let mut text = format!("1\nGDAS 19 {month} 1 0 0\n1 BACKWARD OMEGA\n19 {month} 1 0 10.0 20.0 500.0\n1 TEMP\n");
    for (i, t) in temps.iter().enumerate() {
        text.push_str(&format!(
            "1 1 19 {month} 1 {i} 0 0 -{i}.0 {}.0 20.0 500.0 {t}\n",
            10 + i
        ));
    }
    text
}

pub fn write_traj(dir: &Path, name: &str, temps: &[f64]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, traj_text(1, temps)).unwrap();
    path
}

/// Aggregates must agree with a direct pass over the points.
pub fn assert_aggregates_consistent(traj: &Traj) {
    for var in traj.vars() {
        let values: Vec<f64> = traj.iter().map(|p| p.value(var).unwrap()).collect();
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        assert!(traj.max(var).unwrap() >= traj.min(var).unwrap());
        assert_relative_eq!(traj.total(var).unwrap(), sum, epsilon = 1e-9);
        assert_eq!(traj.min(var), Some(min));
        assert_eq!(traj.max(var), Some(max));
    }
}
