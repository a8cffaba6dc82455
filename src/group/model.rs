use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::traj::{Traj, VarAggregates};

// ---------------------------------------------------------------------------
// Member: one entry of a group definition
// ---------------------------------------------------------------------------

/// Anything a group can be composed from.
///
/// Paths are resolved when the group is built: a regular file is parsed as a
/// trajectory, a directory contributes every regular file it holds (no
/// recursion).
#[derive(Debug, Clone)]
pub enum Member {
    Traj(Arc<Traj>),
    Group(TrajGroup),
    Path(PathBuf),
}

impl From<Traj> for Member {
    fn from(traj: Traj) -> Self {
        Member::Traj(Arc::new(traj))
    }
}

impl From<Arc<Traj>> for Member {
    fn from(traj: Arc<Traj>) -> Self {
        Member::Traj(traj)
    }
}

impl From<TrajGroup> for Member {
    fn from(group: TrajGroup) -> Self {
        Member::Group(group)
    }
}

impl From<&TrajGroup> for Member {
    fn from(group: &TrajGroup) -> Self {
        Member::Group(group.clone())
    }
}

impl From<PathBuf> for Member {
    fn from(path: PathBuf) -> Self {
        Member::Path(path)
    }
}

impl From<&Path> for Member {
    fn from(path: &Path) -> Self {
        Member::Path(path.to_path_buf())
    }
}

impl From<&str> for Member {
    fn from(path: &str) -> Self {
        Member::Path(PathBuf::from(path))
    }
}

/// A file that was offered to a group but did not parse as a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// TrajGroup
// ---------------------------------------------------------------------------

/// Deduplicated, order-preserving collection of trajectories.
///
/// Identity is the *set* of member source paths: two groups are equal when
/// they hold the same paths, whatever their order or name.
#[derive(Debug, Clone)]
pub struct TrajGroup {
    pub(super) name: String,
    pub(super) trajs: Vec<Arc<Traj>>,
    aggregates: VarAggregates,
    skipped: Vec<SkippedFile>,
}

impl TrajGroup {
    /// Compose a group from members, resolved in the order given.
    ///
    /// Files that fail to parse are skipped with a warning and recorded in
    /// [`TrajGroup::skipped`]. A member path that is neither a file nor a
    /// directory is an error, as is an unreadable directory.
    pub fn new<I, M>(name: impl Into<String>, members: I) -> Result<Self>
    where
        I: IntoIterator<Item = M>,
        M: Into<Member>,
    {
        let mut composer = Composer::default();
        for member in members {
            composer.push(member.into())?;
        }
        let group = composer.finish(name.into());
        info!(
            "{} ({} skipped, {} variables)",
            group,
            group.skipped.len(),
            group.aggregates.total_vals().len()
        );
        Ok(group)
    }

    /// Group over already-parsed trajectories; never touches the filesystem.
    pub(crate) fn from_trajs(name: String, trajs: impl IntoIterator<Item = Arc<Traj>>) -> Self {
        let mut composer = Composer::default();
        for traj in trajs {
            composer.insert(traj);
        }
        composer.finish(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the group; membership is untouched.
    pub fn set_name(&mut self, name: impl Into<String>) -> &str {
        self.name = name.into();
        &self.name
    }

    pub fn len(&self) -> usize {
        self.trajs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajs.is_empty()
    }

    pub fn trajs(&self) -> &[Arc<Traj>] {
        &self.trajs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Traj> + '_ {
        self.trajs.iter().map(|t| t.as_ref())
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.trajs.iter().map(|t| t.path())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.trajs.iter().any(|t| t.path() == path)
    }

    pub fn aggregates(&self) -> &VarAggregates {
        &self.aggregates
    }

    pub fn min(&self, var: &str) -> Option<f64> {
        self.aggregates.min(var)
    }

    pub fn max(&self, var: &str) -> Option<f64> {
        self.aggregates.max(var)
    }

    /// Sum of `var` over every point of every member.
    pub fn total(&self, var: &str) -> Option<f64> {
        self.aggregates.total(var)
    }

    /// Files skipped while composing this group.
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }
}

impl PartialEq for TrajGroup {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let ours: BTreeSet<&Path> = self.paths().collect();
        let theirs: BTreeSet<&Path> = other.paths().collect();
        ours == theirs
    }
}

impl fmt::Display for TrajGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrajGroup '{}' ({} trajectories)", self.name, self.trajs.len())
    }
}

impl<'a> IntoIterator for &'a TrajGroup {
    type Item = &'a Arc<Traj>;
    type IntoIter = std::slice::Iter<'a, Arc<Traj>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trajs.iter()
    }
}

// ---------------------------------------------------------------------------
// Composer: member resolution and deduplication
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Composer {
    trajs: Vec<Arc<Traj>>,
    seen: HashSet<PathBuf>,
    skipped: Vec<SkippedFile>,
}

impl Composer {
    fn push(&mut self, member: Member) -> Result<()> {
        match member {
            Member::Traj(traj) => self.insert(traj),
            Member::Group(group) => {
                for traj in group.trajs {
                    self.insert(traj);
                }
            }
            Member::Path(path) => self.push_path(&path)?,
        }
        Ok(())
    }

    fn push_path(&mut self, path: &Path) -> Result<()> {
        if path.is_file() {
            self.push_file(path);
        } else if path.is_dir() {
            for entry in list_files(path)? {
                self.push_file(&entry);
            }
        } else {
            return Err(Error::PathResolution(path.to_path_buf()));
        }
        Ok(())
    }

    fn push_file(&mut self, path: &Path) {
        if self.seen.contains(path) {
            debug!("{} already in group", path.display());
            return;
        }
        match Traj::from_path(path) {
            Ok(traj) => self.insert(Arc::new(traj)),
            Err(err) => {
                warn!(
                    "File at [{}] not identified as a valid trajectory: {}",
                    path.display(),
                    err
                );
                self.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        }
    }

    fn insert(&mut self, traj: Arc<Traj>) {
        if self.seen.insert(traj.path().to_path_buf()) {
            self.trajs.push(traj);
        }
    }

    fn finish(self, name: String) -> TrajGroup {
        let aggregates = VarAggregates::merge(self.trajs.iter().map(|t| t.aggregates()));
        TrajGroup {
            name,
            trajs: self.trajs,
            aggregates,
            skipped: self.skipped,
        }
    }
}

/// Regular files directly inside `dir`, sorted by path.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = fs::read_dir(dir)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map(|e| e.path()))
                .collect::<io::Result<Vec<_>>>()
        })
        .map_err(Error::fs("read_dir", dir))?;
    files.retain(|p| p.is_file());
    files.sort();
    Ok(files)
}
