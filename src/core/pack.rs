//! Scan → classify → group → split → write.
//!
//! Each batch is an independent unit: a failing artifact is reported and
//! the run moves on, and a failing input file becomes an inline marker.

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::cli::{AppContext, PackArgs};
use crate::core::classify::Classifier;
use crate::core::partition::{Batch, plan};
use crate::error::PackError;
use crate::infra::config::PackConfig;
use crate::infra::io::FileBody;
use crate::infra::walk::FileWalker;

const SEPARATOR: &str = "==================================================";

/// Classified files per category, in rule-table order.
pub type Groups = IndexMap<String, Vec<Utf8PathBuf>>;

/// Counters from the scan/classify pass.
#[derive(Debug, Default, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ScanStats {
    pub scanned: usize,
    pub classified: usize,
    pub unclassified: usize,
}

/// Result of writing (or failing to write) one artifact.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub artifact: String,
    pub category: String,
    pub files: usize,
    pub unreadable: usize,
    /// Bytes written on success
    pub bytes: Option<u64>,
    /// Failure reason when the artifact could not be written
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything a run produced, for the final report.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub stats: ScanStats,
    pub batches: Vec<BatchOutcome>,
}

#[derive(Serialize)]
struct PlannedArtifact<'a> {
    artifact: String,
    #[serde(flatten)]
    batch: &'a Batch,
}

/// Walk `root` and bucket every classified candidate by category.
#[instrument(skip(config))]
pub fn collect_groups(root: &Path, config: &PackConfig) -> (Groups, ScanStats) {
    let walker = FileWalker::new(config);
    let classifier = Classifier::new(config);

    // Pre-seed so artifacts come out in rule order regardless of walk order
    let mut groups: Groups = config
        .rules
        .iter()
        .map(|r| (r.name.clone(), Vec::new()))
        .collect();
    let mut stats = ScanStats::default();

    for candidate in walker.candidates(root) {
        stats.scanned += 1;
        match classifier.classify(&candidate.rel) {
            Some(rule) => {
                stats.classified += 1;
                if let Some(bucket) = groups.get_mut(&rule.name) {
                    bucket.push(candidate.path);
                }
            }
            None => {
                stats.unclassified += 1;
                debug!(path = %candidate.rel, "unclassified, skipping");
            }
        }
    }

    (groups, stats)
}

/// Write one batch's text to `out`. Returns how many files were unreadable.
pub fn render_batch<W: Write>(out: &mut W, batch: &Batch) -> std::io::Result<usize> {
    writeln!(out, "=== PARTIAL CONTENT: {} ===", batch.artifact_name())?;
    writeln!(out, "=== CONTAINS {} FILES ===", batch.files.len())?;
    writeln!(out)?;

    let mut unreadable = 0;
    for path in &batch.files {
        write!(out, "\n{SEPARATOR}\nFILE: {path}\n{SEPARATOR}\n")?;
        match FileBody::load(path) {
            FileBody::Text(content) => out.write_all(content.as_bytes())?,
            FileBody::Unreadable(err) => {
                unreadable += 1;
                warn!(path = %path, error = %err, "unreadable file, writing marker");
                write!(out, "[ERROR READING {path}: {}]", err.reason())?;
            }
        }
        writeln!(out)?;
    }

    Ok(unreadable)
}

/// Write one batch to `<out_dir>/<artifact>`; returns (bytes, unreadable).
///
/// Renders into a temp file beside the target and renames it into place,
/// so a failed write never leaves a truncated artifact behind.
pub fn write_batch(out_dir: &Path, batch: &Batch) -> Result<(u64, usize), PackError> {
    let target = out_dir.join(batch.artifact_name());
    let display = target.to_string_lossy().into_owned();
    let io_err = |e: std::io::Error| PackError::io(display.as_str(), e);

    let staging = NamedTempFile::new_in(out_dir).map_err(io_err)?;
    let mut writer = BufWriter::new(staging);

    let unreadable = render_batch(&mut writer, batch).map_err(io_err)?;
    let staging = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
    let bytes = staging.as_file().metadata().map_err(io_err)?.len();

    // Staged files are created 0600; artifacts are ordinary readable files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staging
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(io_err)?;
    }

    staging.persist(&target).map_err(|e| io_err(e.error))?;

    Ok((bytes, unreadable))
}

fn status_mark(ok: bool, ctx: &AppContext) -> String {
    match (ok, ctx.no_color) {
        (true, true) => "✓".to_string(),
        (false, true) => "✗".to_string(),
        (true, false) => "✓".green().to_string(),
        (false, false) => "✗".red().to_string(),
    }
}

/// Run the full pipeline for `args.path`.
#[instrument(skip(ctx), fields(root = %args.path.display()))]
pub fn run(args: PackArgs, ctx: &AppContext) -> Result<RunSummary> {
    let config = PackConfig::builtin().context("Built-in rule table is invalid")?;

    if !args.path.is_dir() {
        anyhow::bail!("{} is not a directory", args.path.display());
    }

    let chatty = !ctx.quiet && !ctx.json;
    if chatty {
        println!("Scanning {} ...", args.path.display());
    }

    let (groups, stats) = collect_groups(&args.path, &config);
    info!(
        scanned = stats.scanned,
        classified = stats.classified,
        unclassified = stats.unclassified,
        "scan complete"
    );

    let batches = plan(groups, &config);

    if ctx.dry_run {
        report_plan(&batches, &args, ctx)?;
        return Ok(RunSummary { stats, batches: Vec::new() });
    }

    if chatty {
        println!("Grouping {} files into {} artifacts ...", stats.classified, batches.len());
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create output directory {}", args.out_dir.display()))?;

    let progress = if ctx.quiet || ctx.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(batches.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    };

    let mut outcomes = Vec::with_capacity(batches.len());
    for batch in &batches {
        let artifact = batch.artifact_name();
        progress.set_message(artifact.clone());

        let outcome = match write_batch(&args.out_dir, batch) {
            Ok((bytes, unreadable)) => {
                info!(artifact = %artifact, files = batch.files.len(), bytes, "artifact written");
                if chatty {
                    progress.suspend(|| {
                        println!(
                            "{} Generated: {} ({} files)",
                            status_mark(true, ctx),
                            artifact,
                            batch.files.len()
                        )
                    });
                }
                BatchOutcome {
                    artifact,
                    category: batch.category.clone(),
                    files: batch.files.len(),
                    unreadable,
                    bytes: Some(bytes),
                    error: None,
                }
            }
            Err(err) => {
                warn!(artifact = %artifact, error = %err, "artifact failed");
                if !ctx.json {
                    progress.suspend(|| {
                        eprintln!("{} Failed to create {}: {}", status_mark(false, ctx), artifact, err)
                    });
                }
                BatchOutcome {
                    artifact,
                    category: batch.category.clone(),
                    files: batch.files.len(),
                    unreadable: 0,
                    bytes: None,
                    error: Some(err.to_string()),
                }
            }
        };

        outcomes.push(outcome);
        progress.inc(1);
    }

    progress.finish_and_clear();

    let summary = RunSummary { stats, batches: outcomes };

    if ctx.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else if !ctx.quiet {
        let failed = summary.batches.iter().filter(|b| !b.is_ok()).count();
        println!(
            "Done: {} artifacts written, {} failed, {} files skipped as unclassified",
            summary.batches.len() - failed,
            failed,
            stats.unclassified
        );
    }

    Ok(summary)
}

fn report_plan(batches: &[Batch], args: &PackArgs, ctx: &AppContext) -> Result<()> {
    if ctx.json {
        let planned: Vec<_> = batches
            .iter()
            .map(|b| PlannedArtifact { artifact: b.artifact_name(), batch: b })
            .collect();
        println!("{}", serde_json::to_string(&planned)?);
        return Ok(());
    }

    if ctx.quiet {
        return Ok(());
    }

    let heading = format!("DRY RUN: Would write into {}:", args.out_dir.display());
    if ctx.no_color {
        println!("{heading}");
    } else {
        println!("{}", heading.yellow());
    }
    for batch in batches {
        println!("  {} ({} files)", batch.artifact_name(), batch.files.len());
        for file in &batch.files {
            println!("    {file}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(path: &Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
    }

    fn write(root: &Path, rel: &str, body: &[u8]) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }

    #[test]
    fn render_matches_artifact_layout() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", b"const a = 1;");
        let path = utf8(&tmp.path().join("a.ts"));

        let batch = Batch { category: "CAT".into(), label: None, files: vec![path.clone()] };
        let mut out = Vec::new();
        let unreadable = render_batch(&mut out, &batch).unwrap();

        let expected = format!(
            "=== PARTIAL CONTENT: CAT.txt ===\n=== CONTAINS 1 FILES ===\n\n\n{SEPARATOR}\nFILE: {path}\n{SEPARATOR}\nconst a = 1;\n"
        );
        assert_eq!(unreadable, 0);
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn undecodable_file_becomes_marker() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", b"ok a");
        write(tmp.path(), "b.ts", &[0xff, 0xfe, 0x00]);
        write(tmp.path(), "c.ts", b"ok c");
        let files: Vec<_> = ["a.ts", "b.ts", "c.ts"].iter().map(|f| utf8(&tmp.path().join(f))).collect();

        let batch = Batch { category: "CAT".into(), label: Some("B".into()), files: files.clone() };
        let mut out = Vec::new();
        let unreadable = render_batch(&mut out, &batch).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(unreadable, 1);
        assert!(text.starts_with("=== PARTIAL CONTENT: CAT_PARTE_B.txt ===\n=== CONTAINS 3 FILES ===\n"));
        assert!(text.contains("ok a"));
        assert!(text.contains("ok c"));
        assert!(text.contains(&format!("[ERROR READING {}: invalid UTF-8", files[1])));
        assert_eq!(text.matches("FILE: ").count(), 3);
    }

    #[test]
    fn groups_follow_rule_order_and_count_drops() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "package.json", b"{}");
        write(root, "src/app/page.tsx", b"page");
        write(root, "src/components/Button.tsx", b"btn");
        write(root, "README.md", b"# readme");
        write(root, "node_modules/x/index.ts", b"dep");

        let cfg = PackConfig::builtin().unwrap();
        let (groups, stats) = collect_groups(root, &cfg);

        assert_eq!(stats, ScanStats { scanned: 4, classified: 3, unclassified: 1 });
        let keys: Vec<_> = groups.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["1_SCREENS_AND_ROUTES", "2_VISUAL_COMPONENTS", "3_DATA_RULES", "4_CONFIGURATION"]
        );
        assert_eq!(groups["1_SCREENS_AND_ROUTES"], vec![utf8(&root.join("src/app/page.tsx"))]);
        assert!(groups["3_DATA_RULES"].is_empty());
        assert_eq!(groups["4_CONFIGURATION"], vec![utf8(&root.join("package.json"))]);
    }

    #[test]
    fn write_failure_is_reported_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("no/such/dir");
        let batch = Batch { category: "CAT".into(), label: None, files: Vec::new() };

        let err = write_batch(&missing, &batch).unwrap_err();
        assert!(matches!(err, PackError::Io { .. }));
    }

    #[test]
    fn failed_write_leaves_no_partial_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "in/a.md", b"hello");
        let out = tmp.path().join("out");
        fs::create_dir_all(out.join("DOCS.txt")).unwrap();
        let batch = Batch {
            category: "DOCS".into(),
            label: None,
            files: vec![utf8(&tmp.path().join("in/a.md"))],
        };

        assert!(write_batch(&out, &batch).is_err());

        let left: Vec<_> = fs::read_dir(&out).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(left, ["DOCS.txt"]);
        assert!(out.join("DOCS.txt").is_dir());
    }

    #[test]
    fn rewrite_replaces_previous_artifact() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "in/a.md", b"fresh");
        write(tmp.path(), "DOCS.txt", b"stale content from an earlier run");
        let batch = Batch {
            category: "DOCS".into(),
            label: None,
            files: vec![utf8(&tmp.path().join("in/a.md"))],
        };

        write_batch(tmp.path(), &batch).unwrap();

        let written = fs::read_to_string(tmp.path().join("DOCS.txt")).unwrap();
        assert!(written.starts_with("=== PARTIAL CONTENT: DOCS.txt ==="));
        assert!(!written.contains("stale"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(tmp.path().join("DOCS.txt")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn write_batch_reports_size() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "in/a.md", b"hello");
        let batch = Batch {
            category: "DOCS".into(),
            label: None,
            files: vec![utf8(&tmp.path().join("in/a.md"))],
        };

        let (bytes, unreadable) = write_batch(tmp.path(), &batch).unwrap();
        let written = fs::read_to_string(tmp.path().join("DOCS.txt")).unwrap();
        assert_eq!(bytes as usize, written.len());
        assert_eq!(unreadable, 0);
        assert!(written.ends_with("hello\n"));
    }
}
