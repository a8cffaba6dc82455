use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use super::model::TrajGroup;
use super::persist::{ensure_dir, transfer};
use crate::error::Result;
use crate::traj::Traj;

// ---------------------------------------------------------------------------
// TrajFilter: predicate plug-in
// ---------------------------------------------------------------------------

/// A membership predicate for [`TrajGroup::filter_group`].
///
/// `Context` is whatever the predicate needs from outside the trajectory
/// (a reference table fetched from a provider, say). The engine calls
/// [`TrajFilter::prepare`] exactly once per pass, before evaluating any
/// member, and hands the result to every [`TrajFilter::matches`] call.
/// Predicates that need nothing use `()`.
pub trait TrajFilter {
    type Context;

    /// Default name used for the output directories.
    fn name(&self) -> Cow<'_, str>;

    fn prepare(&self) -> Result<Self::Context>;

    fn matches(&self, traj: &Traj, context: &Self::Context) -> Result<bool>;
}

/// Closure-backed predicate without shared context.
pub struct FnFilter<F> {
    name: String,
    predicate: F,
}

/// Wrap `predicate` as a [`TrajFilter`] called `name`.
pub fn filter_fn<F>(name: impl Into<String>, predicate: F) -> FnFilter<F>
where
    F: Fn(&Traj) -> bool,
{
    FnFilter {
        name: name.into(),
        predicate,
    }
}

impl<F> TrajFilter for FnFilter<F>
where
    F: Fn(&Traj) -> bool,
{
    type Context = ();

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn matches(&self, traj: &Traj, _context: &()) -> Result<bool> {
        Ok((self.predicate)(traj))
    }
}

// ---------------------------------------------------------------------------
// FilterOptions
// ---------------------------------------------------------------------------

/// How a filter pass names and materialises its output.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    /// Overrides [`TrajFilter::name`] in the output names.
    pub name: Option<String>,
    /// Also materialise the non-matching members.
    pub diff: bool,
    /// Move files instead of copying them (sources are deleted).
    pub move_files: bool,
    /// Suffix of the complement directory.
    pub diff_suffix: String,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            name: None,
            diff: false,
            move_files: false,
            diff_suffix: "diff".to_string(),
        }
    }
}

impl FilterOptions {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }

    pub fn moving(mut self, move_files: bool) -> Self {
        self.move_files = move_files;
        self
    }
}

// ---------------------------------------------------------------------------
// Filter / partition engine
// ---------------------------------------------------------------------------

impl TrajGroup {
    /// Partition the group with `filter`, materialising the result on disk.
    ///
    /// Matching members are copied (or moved) to
    /// `location/<group>_<filter>`; with `options.diff` the others go to
    /// `location/<group>_<filter>_<diff_suffix>`. Returns the matched group and,
    /// when `diff` is set, the complement. Returned members point at the new
    /// files; `self` is left as it was.
    ///
    /// Predicate and filesystem errors abort the pass; files already
    /// transferred stay where they are.
    pub fn filter_group<F>(
        &self,
        filter: &F,
        location: impl AsRef<Path>,
        options: &FilterOptions,
    ) -> Result<(TrajGroup, Option<TrajGroup>)>
    where
        F: TrajFilter,
    {
        let location = location.as_ref();
        let filter_name = match &options.name {
            Some(name) => name.clone(),
            None => filter.name().into_owned(),
        };

        // Shared context is fetched once, before any member is evaluated.
        let context = filter.prepare()?;

        let matched_name = format!("{}_{}", self.name, filter_name);
        let matched_dir = location.join(&matched_name);
        ensure_dir(&matched_dir)?;

        let complement = if options.diff {
            let name = format!("{}_{}", matched_name, options.diff_suffix);
            let dir = location.join(&name);
            ensure_dir(&dir)?;
            Some((name, dir))
        } else {
            None
        };

        let mut matched = Vec::new();
        let mut rest = Vec::new();
        for traj in &self.trajs {
            let keep = filter.matches(traj, &context)?;
            debug!("{} -> {}", traj, if keep { "match" } else { "no match" });

            let dir = if keep {
                &matched_dir
            } else if let Some((_, dir)) = &complement {
                dir
            } else {
                continue;
            };

            let dest = transfer(traj.path(), dir, options.move_files)?;
            let relocated = Arc::new(traj.relocated(dest));
            if keep {
                matched.push(relocated);
            } else {
                rest.push(relocated);
            }
        }

        let matched = TrajGroup::from_trajs(matched_name, matched);
        let complement = complement.map(|(name, _)| TrajGroup::from_trajs(name, rest));

        info!(
            "filtered {} with '{}': {} matched{}",
            self,
            filter_name,
            matched.len(),
            complement
                .as_ref()
                .map(|c| format!(", {} not", c.len()))
                .unwrap_or_default()
        );
        Ok((matched, complement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::error::Error;
    use crate::test_helpers::write_traj;

    /// Counts how often its context is prepared.
    struct Counting<'a> {
        prepared: &'a Cell<usize>,
        threshold: f64,
    }

    impl TrajFilter for Counting<'_> {
        type Context = f64;

        fn name(&self) -> Cow<'_, str> {
            Cow::Borrowed("counting")
        }

        fn prepare(&self) -> Result<f64> {
            self.prepared.set(self.prepared.get() + 1);
            Ok(self.threshold)
        }

        fn matches(&self, traj: &Traj, threshold: &f64) -> Result<bool> {
            Ok(traj.total("TEMP").unwrap_or(0.0) > *threshold)
        }
    }

    fn five_member_group(dir: &Path) -> TrajGroup {
        for i in 0..5 {
            write_traj(dir, &format!("t{i}.traj"), 1, &[i as f64]);
        }
        TrajGroup::new("g", [dir]).unwrap()
    }

    #[test]
    fn context_is_prepared_once_per_pass() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let group = five_member_group(src.path());

        let prepared = Cell::new(0);
        let filter = Counting { prepared: &prepared, threshold: 1.5 };
        let (matched, _) = group
            .filter_group(&filter, out.path(), &FilterOptions::default())
            .unwrap();

        assert_eq!(prepared.get(), 1);
        assert_eq!(matched.len(), 3);
        assert_eq!(matched.name(), "g_counting");
    }

    #[test]
    fn without_diff_no_complement_is_written() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let group = five_member_group(src.path());

        let filter = filter_fn("hot", |t: &Traj| t.total("TEMP").unwrap_or(0.0) >= 2.0);
        let (matched, complement) = group
            .filter_group(&filter, out.path(), &FilterOptions::default())
            .unwrap();

        assert_eq!(matched.len(), 3);
        assert!(complement.is_none());
        assert!(out.path().join("g_hot").is_dir());
        assert!(!out.path().join("g_hot_diff").exists());
        assert!(matched.paths().all(|p| p.starts_with(out.path().join("g_hot"))));
    }

    #[test]
    fn diff_partitions_every_member_once() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let group = five_member_group(src.path());

        let filter = filter_fn("odd", |t: &Traj| t.name() == "t1.traj" || t.name() == "t3.traj");
        let options = FilterOptions::default().with_diff(true);
        let (matched, complement) = group.filter_group(&filter, out.path(), &options).unwrap();
        let complement = complement.unwrap();

        assert_eq!(complement.name(), "g_odd_diff");
        assert_eq!(matched.len() + complement.len(), group.len());
        for traj in &group {
            let in_matched = matched.iter().any(|t| t.name() == traj.name());
            let in_complement = complement.iter().any(|t| t.name() == traj.name());
            assert!(in_matched != in_complement, "{} misplaced", traj.name());
        }
    }

    #[test]
    fn move_empties_the_source_directory() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let group = five_member_group(src.path());

        let filter = filter_fn("all", |_: &Traj| true);
        let options = FilterOptions::default().named("moved").moving(true);
        let (matched, _) = group.filter_group(&filter, out.path(), &options).unwrap();

        assert_eq!(matched.name(), "g_moved");
        assert_eq!(matched.len(), 5);
        assert_eq!(std::fs::read_dir(src.path()).unwrap().count(), 0);
        // the source group still describes the old locations
        assert_eq!(group.len(), 5);
    }

    #[test]
    fn failing_context_aborts_before_any_transfer() {
        struct Unavailable;
        impl TrajFilter for Unavailable {
            type Context = ();
            fn name(&self) -> Cow<'_, str> {
                Cow::Borrowed("unavailable")
            }
            fn prepare(&self) -> Result<()> {
                Err(Error::ReferenceDataUnavailable("offline".into()))
            }
            fn matches(&self, _: &Traj, _: &()) -> Result<bool> {
                Ok(true)
            }
        }

        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let group = five_member_group(src.path());

        let err = group
            .filter_group(&Unavailable, out.path(), &FilterOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::ReferenceDataUnavailable(_)));
        assert!(!out.path().join("g_unavailable").exists());
    }
}
