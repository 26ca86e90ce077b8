//! Balanced slicing of a category's sorted file list into labelled parts.

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::Serialize;

use crate::infra::config::PackConfig;

/// One output artifact's worth of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub category: String,
    /// `None` when the category fits in a single part
    pub label: Option<String>,
    pub files: Vec<Utf8PathBuf>,
}

impl Batch {
    /// `<category>.txt` or `<category>_PARTE_<label>.txt`
    pub fn artifact_name(&self) -> String {
        match &self.label {
            Some(label) => format!("{}_PARTE_{}.txt", self.category, label),
            None => format!("{}.txt", self.category),
        }
    }
}

/// Bijective base-26 label: 0 → A, 25 → Z, 26 → AA, 27 → AB, …
pub fn part_label(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Sort `files` and slice them into at most `parts` contiguous, non-empty runs.
pub fn split(category: &str, mut files: Vec<Utf8PathBuf>, parts: usize) -> Vec<Batch> {
    if files.is_empty() {
        return Vec::new();
    }

    // Plain string order, not component-wise `Path` order
    files.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    files.dedup();

    let effective = parts.clamp(1, files.len());
    let chunk = files.len().div_ceil(effective);

    let labelled = effective > 1;
    files
        .chunks(chunk)
        .enumerate()
        .map(|(i, slice)| Batch {
            category: category.to_string(),
            label: labelled.then(|| part_label(i)),
            files: slice.to_vec(),
        })
        .collect()
}

/// Plan every batch for the grouped files, in rule-table order.
pub fn plan(groups: IndexMap<String, Vec<Utf8PathBuf>>, config: &PackConfig) -> Vec<Batch> {
    groups
        .into_iter()
        .filter_map(|(category, files)| {
            let parts = config.rule(&category)?.parts.get();
            Some(split(&category, files, parts))
        })
        .flatten()
        .collect()
}
