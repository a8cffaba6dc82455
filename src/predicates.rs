use std::borrow::Cow;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::group::TrajFilter;
use crate::reference::{
    season_of, Coords, EnsoType, OniSource, OniTable, WaterBalanceSource, WaterBalanceTable,
    WaterBalanceVar,
};
use crate::traj::Traj;

// ---------------------------------------------------------------------------
// Missing reference keys
// ---------------------------------------------------------------------------

/// What a reference-backed predicate does when the table lacks the key a
/// trajectory needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Treat the trajectory as not matching.
    #[default]
    Reject,
    /// Abort the whole filter pass with [`Error::ReferenceDataUnavailable`].
    Abort,
}

impl MissingKeyPolicy {
    fn resolve(self, traj: &Traj, what: String) -> Result<bool> {
        match self {
            MissingKeyPolicy::Reject => {
                debug!("{traj}: {what}, rejected");
                Ok(false)
            }
            MissingKeyPolicy::Abort => Err(Error::ReferenceDataUnavailable(format!("{traj}: {what}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// NameFilter
// ---------------------------------------------------------------------------

/// Keeps trajectories whose file name contains a substring.
#[derive(Debug, Clone)]
pub struct NameFilter {
    needle: String,
}

impl NameFilter {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl TrajFilter for NameFilter {
    type Context = ();

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("name_filter")
    }

    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn matches(&self, traj: &Traj, _context: &()) -> Result<bool> {
        Ok(traj.name().contains(&self.needle))
    }
}

// ---------------------------------------------------------------------------
// OniFilter
// ---------------------------------------------------------------------------

/// Keeps trajectories released during an ONI season of one of the given
/// ENSO types. The season is taken from the target point.
pub struct OniFilter<S> {
    source: S,
    enso_types: Vec<EnsoType>,
    on_missing: MissingKeyPolicy,
}

impl<S: OniSource> OniFilter<S> {
    /// Neutral seasons only until [`OniFilter::with_types`] says otherwise.
    pub fn new(source: S) -> Self {
        Self {
            source,
            enso_types: vec![EnsoType::N],
            on_missing: MissingKeyPolicy::default(),
        }
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = EnsoType>) -> Self {
        self.enso_types = types.into_iter().collect();
        self
    }

    pub fn on_missing(mut self, policy: MissingKeyPolicy) -> Self {
        self.on_missing = policy;
        self
    }
}

impl<S: OniSource> TrajFilter for OniFilter<S> {
    type Context = OniTable;

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("oni_filter")
    }

    fn prepare(&self) -> Result<OniTable> {
        self.source.fetch_oni()
    }

    fn matches(&self, traj: &Traj, table: &OniTable) -> Result<bool> {
        let season = season_of(traj.target_point());
        match table.get(season) {
            Some(s) => Ok(self.enso_types.contains(&s.enso_type)),
            None => self
                .on_missing
                .resolve(traj, format!("no ONI season {}-{}", season.0, season.1)),
        }
    }
}

// ---------------------------------------------------------------------------
// WaterBalanceFilter
// ---------------------------------------------------------------------------

/// Keeps trajectories whose target-point month has a non-zero value of one
/// water-balance variable at a fixed location.
///
/// A location without data rejects every member under
/// [`MissingKeyPolicy::Reject`] and aborts the pass under
/// [`MissingKeyPolicy::Abort`]. Other source failures always abort.
pub struct WaterBalanceFilter<S> {
    source: S,
    coords: Coords,
    var: WaterBalanceVar,
    on_missing: MissingKeyPolicy,
}

impl<S: WaterBalanceSource> WaterBalanceFilter<S> {
    /// Filters on [`WaterBalanceVar::Surp`] until [`WaterBalanceFilter::with_var`].
    pub fn new(source: S, coords: Coords) -> Self {
        Self {
            source,
            coords,
            var: WaterBalanceVar::Surp,
            on_missing: MissingKeyPolicy::default(),
        }
    }

    pub fn with_var(mut self, var: WaterBalanceVar) -> Self {
        self.var = var;
        self
    }

    pub fn on_missing(mut self, policy: MissingKeyPolicy) -> Self {
        self.on_missing = policy;
        self
    }
}

impl<S: WaterBalanceSource> TrajFilter for WaterBalanceFilter<S> {
    type Context = Option<WaterBalanceTable>;

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("water_balance_filter")
    }

    fn prepare(&self) -> Result<Option<WaterBalanceTable>> {
        match self.source.fetch_water_balance(self.coords) {
            Ok(table) => Ok(Some(table)),
            Err(Error::ReferenceDataUnavailable(why))
                if self.on_missing == MissingKeyPolicy::Reject =>
            {
                warn!("{why}; every trajectory will be rejected");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn matches(&self, traj: &Traj, table: &Option<WaterBalanceTable>) -> Result<bool> {
        let Some(table) = table else {
            return Ok(false);
        };
        let month = traj.target_point().month();
        match table.value(month, self.var) {
            Some(v) => Ok(v != 0.0),
            None => self
                .on_missing
                .resolve(traj, format!("no {} value for month {month}", self.var)),
        }
    }
}
