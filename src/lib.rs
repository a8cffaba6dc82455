//! HYSPLIT trajectory endpoint files as an in-memory model.
//!
//! ```text
//!  files ──► traj::loader ──► Traj / Point ──► group (compose, + / -)
//!                                                 │
//!                         predicates + reference ─┴─► filter_group ──► new groups on disk
//! ```

pub mod config;
pub mod error;
pub mod group;
pub mod predicates;
pub mod reference;
pub mod traj;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::Config;
pub use error::{Error, MalformedRecordError, Result, TrajParseError};
pub use group::{filter_fn, FilterOptions, Member, TrajFilter, TrajGroup};
pub use traj::{Direction, FormatType, Point, Traj};
