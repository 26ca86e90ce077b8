//! Filepath: src/infra/walk.rs
//! Candidate scanner over a project tree.
//! - Ignored directory names are pruned before descent (any depth)
//! - Files pass only by extension allow-list and file-name deny-list
//! - No .gitignore / hidden-file policy: the fixed lists decide everything
//! - Unreadable entries are logged and skipped
//!
//! Backed by ripgrep's `ignore` crate with its standard filters turned off,
//! so only the pruning hook below shapes the traversal. Order is whatever
//! the filesystem yields; sorting happens at pack time.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, warn};

use crate::error::PackError;
use crate::infra::config::PackConfig;

/// A file that survived the scan filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile
{
    /// Path as walked (root-joined), used for reading and in artifacts
    pub path: Utf8PathBuf,

    /// Path relative to the scan root, used for classification
    pub rel: Utf8PathBuf,

    /// Extension without the dot
    pub extension: String,
}

impl CandidateFile
{
    /// Bare file name (last component).
    pub fn file_name(&self) -> &str
    {
        self.rel
            .file_name()
            .unwrap_or_default()
    }
}

/// Scanner with the static allow/deny lists from `PackConfig`.
pub struct FileWalker
{
    /// Allowed extensions (no dot)
    extensions: HashSet<String>,

    /// Bare file names never yielded
    ignore_files: HashSet<String>,

    /// Directory names pruned during traversal; shared with the walk hook
    ignore_dirs: Arc<HashSet<String>>,
}

impl FileWalker
{
    pub fn new(config: &PackConfig) -> Self
    {
        Self {
            extensions: config
                .extensions
                .iter()
                .cloned()
                .collect(),
            ignore_files: config
                .ignore_files
                .iter()
                .cloned()
                .collect(),
            ignore_dirs: Arc::new(
                config
                    .ignore_dirs
                    .iter()
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // Turn off hidden/.gitignore/.ignore/parent filters
        b.standard_filters(false);
        b.follow_links(false);

        // Early directory pruning by bare name; the root itself is never pruned.
        let pruned = Arc::clone(&self.ignore_dirs);
        b.filter_entry(move |ent: &DirEntry| {
            let is_dir = ent
                .file_type()
                .is_some_and(|ft| ft.is_dir());

            if is_dir
                && ent.depth() > 0
                && ent
                    .file_name()
                    .to_str()
                    .is_some_and(|name| pruned.contains(name))
            {
                debug!(dir = %ent.path().display(), "pruned ignored directory");
                return false;
            }
            true
        });

        b
    }

    /// Lazily yield candidate files under `root`.
    pub fn candidates<'a>(
        &'a self,
        root: &'a Path,
    ) -> impl Iterator<Item = CandidateFile> + 'a
    {
        self.build_walk(root)
            .build()
            .filter_map(|res| match res
            {
                Ok(entry) => Some(entry),
                Err(err) =>
                {
                    warn!(error = %PackError::from(err), "skipping unreadable entry");
                    None
                }
            })
            // Regular files, plus symlinks resolving to one (links are not descended)
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file() || (ft.is_symlink() && entry.path().is_file()))
            })
            .filter_map(move |entry| self.admit(root, entry.path()))
    }

    /// Apply the file filters to a walked path.
    fn admit(
        &self,
        root: &Path,
        path: &Path,
    ) -> Option<CandidateFile>
    {
        let Some(utf8) = Utf8Path::from_path(path)
        else
        {
            warn!(error = %PackError::NonUtf8Path(path.to_path_buf()), "skipping file");
            return None;
        };

        let name = utf8.file_name()?;
        let extension = utf8.extension()?;

        if !self
            .extensions
            .contains(extension)
            || self
                .ignore_files
                .contains(name)
        {
            return None;
        }

        let rel = path
            .strip_prefix(root)
            .ok()
            .and_then(Utf8Path::from_path)
            .unwrap_or(utf8);

        Some(CandidateFile {
            path: utf8.to_path_buf(),
            rel: rel.to_path_buf(),
            extension: extension.to_string(),
        })
    }
}
