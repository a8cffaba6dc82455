//! Builders shared by the unit tests.

use std::path::Path;
use std::sync::Arc;

use crate::traj::Traj;

/// Endpoint-file text for a one-variable (`TEMP`) trajectory, one point per value.
/// Point `i` sits at `(10 + i, 20)` on 2019-`month`-01 `i`:00.
pub(crate) fn traj_text(direction: &str, month: u32, temps: &[f64]) -> String {
    let mut text = format!("1\nGDAS 19 {month} 1 0 0\n1 {direction} OMEGA\n19 {month} 1 0 10.0 20.0 500.0\n1 TEMP\n");
    for (i, t) in temps.iter().enumerate() {
        text.push_str(&format!(
            "1 1 19 {month} 1 {i} 0 0 -{i}.0 {}.0 20.0 500.0 {t}\n",
            10 + i
        ));
    }
    text
}

/// In-memory backward trajectory identified by `path` (nothing on disk).
pub(crate) fn traj(path: &str, temps: &[f64]) -> Arc<Traj> {
    Arc::new(Traj::parse_str(path, &traj_text("BACKWARD", 1, temps)).unwrap())
}

/// Write a backward trajectory to `dir/name` and return its path.
pub(crate) fn write_traj(dir: &Path, name: &str, month: u32, temps: &[f64]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, traj_text("BACKWARD", month, temps)).unwrap();
    path
}
