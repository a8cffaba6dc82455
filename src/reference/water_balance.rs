use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use super::Coords;
use crate::error::{Error, Result};

/// Coordinates in an export match a query within this many degrees.
const COORD_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// WaterBalanceVar
// ---------------------------------------------------------------------------

/// Monthly water-balance quantities, in table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterBalanceVar {
    Temp,
    Upe,
    Ape,
    Prec,
    Diff,
    St,
    Dst,
    Ae,
    Def,
    Surp,
    Smt,
    Sst,
}

impl WaterBalanceVar {
    pub const ALL: [WaterBalanceVar; 12] = [
        WaterBalanceVar::Temp,
        WaterBalanceVar::Upe,
        WaterBalanceVar::Ape,
        WaterBalanceVar::Prec,
        WaterBalanceVar::Diff,
        WaterBalanceVar::St,
        WaterBalanceVar::Dst,
        WaterBalanceVar::Ae,
        WaterBalanceVar::Def,
        WaterBalanceVar::Surp,
        WaterBalanceVar::Smt,
        WaterBalanceVar::Sst,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WaterBalanceVar::Temp => "TEMP",
            WaterBalanceVar::Upe => "UPE",
            WaterBalanceVar::Ape => "APE",
            WaterBalanceVar::Prec => "PREC",
            WaterBalanceVar::Diff => "DIFF",
            WaterBalanceVar::St => "ST",
            WaterBalanceVar::Dst => "DST",
            WaterBalanceVar::Ae => "AE",
            WaterBalanceVar::Def => "DEF",
            WaterBalanceVar::Surp => "SURP",
            WaterBalanceVar::Smt => "SMT",
            WaterBalanceVar::Sst => "SST",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for WaterBalanceVar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        WaterBalanceVar::ALL
            .into_iter()
            .find(|v| v.label() == s)
            .ok_or_else(|| Error::Config(format!("unknown water-balance variable {s:?}")))
    }
}

impl fmt::Display for WaterBalanceVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// WaterBalanceTable
// ---------------------------------------------------------------------------

/// Monthly water balance at one location, months 1–12.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterBalanceTable {
    coords: Coords,
    months: BTreeMap<u32, [f64; 12]>,
}

/// CSV row: `lat,lon,month,TEMP,UPE,...,SST`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct WaterBalanceRow {
    #[serde(rename = "lat")]
    lat: f64,
    #[serde(rename = "lon")]
    lon: f64,
    #[serde(rename = "month")]
    month: u32,
    temp: f64,
    upe: f64,
    ape: f64,
    prec: f64,
    diff: f64,
    st: f64,
    dst: f64,
    ae: f64,
    def: f64,
    surp: f64,
    smt: f64,
    sst: f64,
}

impl WaterBalanceRow {
    fn values(&self) -> [f64; 12] {
        [
            self.temp, self.upe, self.ape, self.prec, self.diff, self.st, self.dst, self.ae,
            self.def, self.surp, self.smt, self.sst,
        ]
    }

    fn is_at(&self, (lat, lon): Coords) -> bool {
        (self.lat - lat).abs() < COORD_TOLERANCE && (self.lon - lon).abs() < COORD_TOLERANCE
    }
}

impl WaterBalanceTable {
    pub fn new(coords: Coords, months: impl IntoIterator<Item = (u32, [f64; 12])>) -> Self {
        WaterBalanceTable {
            coords,
            months: months.into_iter().collect(),
        }
    }

    /// Rows of a CSV export that belong to `coords`.
    ///
    /// No matching row means the location has no data (open water, for
    /// instance) and yields [`Error::ReferenceDataUnavailable`].
    pub fn from_csv_reader<R: Read>(reader: R, coords: Coords) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut months = BTreeMap::new();
        for row in reader.deserialize::<WaterBalanceRow>() {
            let row = row.map_err(|e| Error::ReferenceDataUnavailable(e.to_string()))?;
            if row.is_at(coords) {
                months.insert(row.month, row.values());
            }
        }
        if months.is_empty() {
            return Err(Error::ReferenceDataUnavailable(format!(
                "no water-balance data at ({}, {})",
                coords.0, coords.1
            )));
        }
        Ok(WaterBalanceTable { coords, months })
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn value(&self, month: u32, var: WaterBalanceVar) -> Option<f64> {
        self.months.get(&month).map(|row| row[var.index()])
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Something that can produce the water-balance table for a location.
pub trait WaterBalanceSource {
    fn fetch_water_balance(&self, coords: Coords) -> Result<WaterBalanceTable>;
}

impl<F> WaterBalanceSource for F
where
    F: Fn(Coords) -> Result<WaterBalanceTable>,
{
    fn fetch_water_balance(&self, coords: Coords) -> Result<WaterBalanceTable> {
        self(coords)
    }
}

/// Water-balance tables read from a local CSV export covering many locations.
#[derive(Debug, Clone)]
pub struct CsvWaterBalanceSource {
    path: PathBuf,
}

impl CsvWaterBalanceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WaterBalanceSource for CsvWaterBalanceSource {
    fn fetch_water_balance(&self, coords: Coords) -> Result<WaterBalanceTable> {
        let file = std::fs::File::open(&self.path).map_err(Error::fs("open", &self.path))?;
        WaterBalanceTable::from_csv_reader(file, coords)
    }
}
