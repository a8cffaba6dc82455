use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traj::Point;

/// Running 3-month ONI periods, in season order (July → June).
pub const ONI_PERIODS: [&str; 12] = [
    "JJA", "JAS", "ASO", "SON", "OND", "NDJ", "DJF", "JFM", "FMA", "MAM", "AMJ", "MJJ",
];

/// `(start_year, end_year)` of an ONI season, which runs July to June.
pub type SeasonKey = (i32, i32);

/// Season containing the point's date: June–December belong to the season
/// starting that year, January–May to the one that started the year before.
pub fn season_of(point: &Point) -> SeasonKey {
    let year = point.year();
    if (6..=12).contains(&point.month()) {
        (year, year + 1)
    } else {
        (year - 1, year)
    }
}

// ---------------------------------------------------------------------------
// EnsoType
// ---------------------------------------------------------------------------

/// ENSO classification of a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnsoType {
    /// Weak El Niño
    WE,
    /// Moderate El Niño
    ME,
    /// Strong El Niño
    SE,
    /// Very strong El Niño
    VSE,
    /// Weak La Niña
    WL,
    /// Moderate La Niña
    ML,
    /// Strong La Niña
    SL,
    /// Neither El Niño nor La Niña
    N,
}

impl FromStr for EnsoType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "WE" => Ok(EnsoType::WE),
            "ME" => Ok(EnsoType::ME),
            "SE" => Ok(EnsoType::SE),
            "VSE" => Ok(EnsoType::VSE),
            "WL" => Ok(EnsoType::WL),
            "ML" => Ok(EnsoType::ML),
            "SL" => Ok(EnsoType::SL),
            "N" | "" => Ok(EnsoType::N),
            other => Err(Error::Config(format!("unknown ENSO type {other:?}"))),
        }
    }
}

impl fmt::Display for EnsoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// ---------------------------------------------------------------------------
// OniSeason / OniTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OniSeason {
    pub enso_type: EnsoType,
    pub season: SeasonKey,
    /// Indexed like [`ONI_PERIODS`]; `None` where the table has no value yet.
    pub oni_vals: [Option<f64>; 12],
}

impl OniSeason {
    /// Running mean for a period label such as `"DJF"`.
    pub fn oni(&self, period: &str) -> Option<f64> {
        ONI_PERIODS
            .iter()
            .position(|p| *p == period)
            .and_then(|idx| self.oni_vals[idx])
    }
}

/// ONI seasons keyed by [`SeasonKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OniTable {
    seasons: BTreeMap<SeasonKey, OniSeason>,
}

/// One CSV row: `type,start_year,end_year,JJA,...,MJJ`. A blank type means N.
#[derive(Debug, Deserialize)]
struct OniRow {
    #[serde(rename = "type", default)]
    enso_type: Option<EnsoType>,
    start_year: i32,
    end_year: i32,
    #[serde(rename = "JJA")]
    jja: Option<f64>,
    #[serde(rename = "JAS")]
    jas: Option<f64>,
    #[serde(rename = "ASO")]
    aso: Option<f64>,
    #[serde(rename = "SON")]
    son: Option<f64>,
    #[serde(rename = "OND")]
    ond: Option<f64>,
    #[serde(rename = "NDJ")]
    ndj: Option<f64>,
    #[serde(rename = "DJF")]
    djf: Option<f64>,
    #[serde(rename = "JFM")]
    jfm: Option<f64>,
    #[serde(rename = "FMA")]
    fma: Option<f64>,
    #[serde(rename = "MAM")]
    mam: Option<f64>,
    #[serde(rename = "AMJ")]
    amj: Option<f64>,
    #[serde(rename = "MJJ")]
    mjj: Option<f64>,
}

impl From<OniRow> for OniSeason {
    fn from(row: OniRow) -> Self {
        OniSeason {
            enso_type: row.enso_type.unwrap_or(EnsoType::N),
            season: (row.start_year, row.end_year),
            oni_vals: [
                row.jja, row.jas, row.aso, row.son, row.ond, row.ndj, row.djf, row.jfm, row.fma,
                row.mam, row.amj, row.mjj,
            ],
        }
    }
}

impl OniTable {
    pub fn from_seasons(seasons: impl IntoIterator<Item = OniSeason>) -> Self {
        OniTable {
            seasons: seasons.into_iter().map(|s| (s.season, s)).collect(),
        }
    }

    /// Read a CSV export with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let seasons = reader
            .deserialize::<OniRow>()
            .map(|row| row.map(OniSeason::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::from_seasons(seasons))
    }

    pub fn get(&self, season: SeasonKey) -> Option<&OniSeason> {
        self.seasons.get(&season)
    }

    pub fn len(&self) -> usize {
        self.seasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Something that can produce the ONI season table.
pub trait OniSource {
    fn fetch_oni(&self) -> Result<OniTable>;
}

impl<F> OniSource for F
where
    F: Fn() -> Result<OniTable>,
{
    fn fetch_oni(&self) -> Result<OniTable> {
        self()
    }
}

/// ONI table read from a local CSV export.
#[derive(Debug, Clone)]
pub struct CsvOniSource {
    path: PathBuf,
}

impl CsvOniSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OniSource for CsvOniSource {
    fn fetch_oni(&self) -> Result<OniTable> {
        let file = std::fs::File::open(&self.path).map_err(Error::fs("open", &self.path))?;
        OniTable::from_csv_reader(file).map_err(|source| Error::ReferenceTable {
            path: self.path.clone(),
            source,
        })
    }
}
