/// Reference datasets consumed by predicates.
///
/// The tables are produced outside this crate (web scrapers, manual
/// exports). A provider trait stands between each table and the predicates
/// so a filter pass can fetch once and share the result:
/// ```text
///   OniSource ──────────► OniTable           season (start, end) → ENSO type
///   WaterBalanceSource ─► WaterBalanceTable  month → 12 water-balance values
/// ```
/// Closures implement both traits; `Csv*Source` read local CSV exports.

pub mod oni;
pub mod water_balance;

/// `(lat, lon)` in degrees.
pub type Coords = (f64, f64);

pub use oni::{season_of, CsvOniSource, EnsoType, OniSeason, OniSource, OniTable, SeasonKey};
pub use water_balance::{
    CsvWaterBalanceSource, WaterBalanceSource, WaterBalanceTable, WaterBalanceVar,
};
