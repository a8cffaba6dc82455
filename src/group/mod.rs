/// Group layer: composing, combining, persisting and filtering trajectories.
///
/// Architecture:
/// ```text
///  Traj | TrajGroup | file | directory      (Member)
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  resolve members → dedup by path → merged aggregates
///   └──────────┘
///        │                      ▲
///        ▼                      │ new groups
///   ┌──────────┐   ┌──────────┐ │
///   │ algebra   │   │  filter   │─┘  predicate → matched / complement dirs
///   └──────────┘   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ persist   │  copy / move member files into a directory
///   └──────────┘
/// ```

pub mod algebra;
pub mod filter;
pub mod model;
pub mod persist;

pub use filter::{filter_fn, FilterOptions, FnFilter, TrajFilter};
pub use model::{Member, SkippedFile, TrajGroup};
