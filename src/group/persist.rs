use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::model::TrajGroup;
use crate::error::{Error, Result};

impl TrajGroup {
    /// Copy every member file into `location/<name>` and return that directory.
    ///
    /// `name` defaults to the group name. The directory is created if absent.
    /// Not transactional: a failed copy leaves the files copied so far.
    pub fn save_group(&self, location: impl AsRef<Path>, name: Option<&str>) -> Result<PathBuf> {
        let save_path = location.as_ref().join(name.unwrap_or(&self.name));
        ensure_dir(&save_path)?;

        for traj in &self.trajs {
            copy_into(traj.path(), &save_path)?;
        }

        info!("saved {} to {}", self, save_path.display());
        Ok(save_path)
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(Error::fs("create_dir", dir))
}

/// Copy or move `src` into `dir`, keeping its file name.
///
/// Never overwrites: an existing file at the destination that is not `src`
/// itself fails with [`io::ErrorKind::AlreadyExists`].
pub(crate) fn transfer(src: &Path, dir: &Path, move_file: bool) -> Result<PathBuf> {
    if move_file {
        move_into(src, dir)
    } else {
        copy_into(src, dir)
    }
}

pub(crate) fn copy_into(src: &Path, dir: &Path) -> Result<PathBuf> {
    let dest = destination(src, dir)?;
    if is_same_file(src, &dest) {
        debug!("{} already in {}", src.display(), dir.display());
        return Ok(dest);
    }
    ensure_vacant(&dest)?;
    fs::copy(src, &dest).map_err(Error::fs("copy", src))?;
    Ok(dest)
}

/// Rename when possible; across filesystems fall back to copy then delete.
pub(crate) fn move_into(src: &Path, dir: &Path) -> Result<PathBuf> {
    let dest = destination(src, dir)?;
    if is_same_file(src, &dest) {
        return Ok(dest);
    }
    ensure_vacant(&dest)?;
    if fs::rename(src, &dest).is_err() {
        fs::copy(src, &dest).map_err(Error::fs("copy", src))?;
        fs::remove_file(src).map_err(Error::fs("remove", src))?;
    }
    Ok(dest)
}

fn destination(src: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = src
        .file_name()
        .ok_or_else(|| Error::PathResolution(src.to_path_buf()))?;
    Ok(dir.join(file_name))
}

/// Another member with the same file name already landed here.
fn ensure_vacant(dest: &Path) -> Result<()> {
    if dest.exists() {
        return Err(Error::FileSystem {
            op: "transfer",
            path: dest.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "destination path already exists"),
        });
    }
    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
