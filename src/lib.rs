//! **sortpack** - Topic-grouped, size-balanced text snapshots of a source tree
//!
//! Walks a project, sorts eligible files into categories by path substring rules,
//! and writes each category as one or more balanced `.txt` batches for LLM readers.

/// Command-line interface with clap integration
pub mod cli;

/// Error taxonomy shared by the pipeline stages
pub mod error;

/// Core pipeline - classification, partitioning and batch writing
pub mod core {
    /// First-match path rule evaluation with root-config fallback
    pub mod classify;
    pub use classify::Classifier;

    /// Balanced slicing into labelled parts
    pub mod partition;
    pub use partition::{Batch, part_label, plan, split};

    /// Scan → classify → group → write runner
    pub mod pack;
    pub use pack::{RunSummary, run as pack_run};
}

/// Infrastructure - static table, file I/O and tree walking
pub mod infra {
    /// Built-in rule table and scan filters
    pub mod config;
    pub use config::{CategoryRule, PackConfig};

    /// Strict UTF-8 reads with mmap for large files
    pub mod io;
    pub use io::{FileBody, FileContent, read_text};

    /// Pruning directory walker
    pub mod walk;
    pub use walk::{CandidateFile, FileWalker};
}

pub use cli::{AppContext, Cli, PackArgs};
pub use crate::core::{Batch, Classifier, RunSummary, pack_run};
pub use error::PackError;
pub use infra::{CategoryRule, FileWalker, PackConfig};
