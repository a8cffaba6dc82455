/// Trajectory layer: endpoint-file parsing and the point/trajectory model.
///
/// Architecture:
/// ```text
///  HYSPLIT endpoint file (records 1–6)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  records 1–5 → header, record 6 lines → Point
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   Traj    │  points, (lat, lon) index, target point
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ VarAggregates  │  per-variable min / max / total
///   └───────────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod point;

pub use aggregate::VarAggregates;
pub use loader::YEAR_BASE;
pub use model::{Direction, FormatType, Traj};
pub use point::Point;
