//! Rename-chain rotation.
//!
//! Rotation is split into a pure planning step and an executor:
//!
//! ```text
//! scan_family(fs)        → which member indices exist
//! plan_rotation(listing) → [Remove.., Rename.., Create]
//! execute(fs, plan)      → fresh, empty live file
//! ```
//!
//! With `max_files = N` a completed rotation leaves the live file plus at most
//! `N-1` backups. Members with an index of `N` or more (left behind by a run
//! with a larger retention) are pruned as part of the same plan.

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::core::family::LogFamily;
use crate::core::fs::FileSystem;
use crate::core::{Error, Result};

/// One filesystem step of a rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOp {
    Remove(PathBuf),
    Rename { from: PathBuf, to: PathBuf },
    Create(PathBuf),
}

impl fmt::Display for RotationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationOp::Remove(path) => write!(f, "remove {}", path.display()),
            RotationOp::Rename { from, to } => {
                write!(f, "rename {} -> {}", from.display(), to.display())
            }
            RotationOp::Create(path) => write!(f, "create {}", path.display()),
        }
    }
}

/// Indices of the family members currently present.
///
/// The family directory is listed once. If it cannot be listed (a directory
/// without read permission, say) the retained indices `0..max_files` are
/// checked one by one instead, and stale members beyond the retention window
/// go unnoticed until a later rotation can list them.
pub fn scan_family<F: FileSystem>(fs: &F, family: &LogFamily) -> BTreeSet<u32> {
    match fs.list_dir(family.dir()) {
        Ok(names) => names
            .iter()
            .filter_map(|name| family.parse_member_index(name))
            .collect(),
        Err(err) => {
            log::warn!(
                "failed to list {}, checking retained members only: {err}",
                family.dir().display()
            );
            (0..family.max_files())
                .filter(|index| fs.exists(&family.member_path(*index)))
                .collect()
        }
    }
}

/// Build the steps that rotate `family` given the indices in `present`.
///
/// Steps run in order: stale members beyond the retention window and the
/// oldest retained member are removed, every remaining member shifts up by
/// one (oldest first, so no rename overwrites), and the live file is created
/// empty. Gaps in the chain are skipped. With `max_files = 1` this reduces to
/// removing the live file and creating it again.
pub fn plan_rotation(family: &LogFamily, present: &BTreeSet<u32>) -> Vec<RotationOp> {
    let oldest = family.oldest_index();
    let mut ops = Vec::new();

    for &index in present.range(oldest..).rev() {
        ops.push(RotationOp::Remove(family.member_path(index)));
    }

    for &index in present.range(..oldest).rev() {
        ops.push(RotationOp::Rename {
            from: family.member_path(index),
            to: family.member_path(index + 1),
        });
    }

    ops.push(RotationOp::Create(family.member_path(0)));
    ops
}

/// Run `ops` against `fs`, returning the handle opened by the final
/// `Create` step.
///
/// The first failing step aborts the rotation with `Error::RotationFailed`;
/// steps already applied are not undone.
pub fn execute<F: FileSystem>(fs: &F, ops: &[RotationOp]) -> Result<F::File> {
    let mut created = None;
    for op in ops {
        log::debug!("rotation step: {op}");
        let outcome = match op {
            RotationOp::Remove(path) => fs.remove_file(path),
            RotationOp::Rename { from, to } => fs.rename(from, to),
            RotationOp::Create(path) => fs.create(path).map(|file| {
                created = Some(file);
            }),
        };
        outcome.map_err(|err| Error::rotation(op.to_string(), err))?;
    }
    created.ok_or_else(|| {
        Error::rotation(
            "open live file",
            io::Error::new(io::ErrorKind::InvalidInput, "rotation plan has no create step"),
        )
    })
}

/// Rotate `family` on `fs`: scan, plan and execute in one call.
pub fn rotate<F: FileSystem>(fs: &F, family: &LogFamily) -> Result<F::File> {
    let present = scan_family(fs, family);
    let ops = plan_rotation(family, &present);
    let file = execute(fs, &ops)?;
    log::info!(
        "rotated {} ({} existing members)",
        family.base().display(),
        present.len()
    );
    Ok(file)
}
