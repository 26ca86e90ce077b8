//! Path → category assignment.
//!
//! Rules are tried in table order and the first literal substring hit wins.
//! Files no rule claims may still land in the fallback category when they
//! look like root-level project configuration. Everything else is dropped.

use camino::Utf8Path;

use crate::infra::config::{CategoryRule, PackConfig};

/// Borrowing view over the rule table.
pub struct Classifier<'a> {
    config: &'a PackConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a PackConfig) -> Self {
        Self { config }
    }

    /// Category for `path` (root-relative), or `None` if unclassified.
    pub fn classify(&self, path: &Utf8Path) -> Option<&'a CategoryRule> {
        let text = path.as_str();

        if let Some(rule) = self.config.rules.iter().find(|r| r.matches(text)) {
            return Some(rule);
        }

        let fallback = &self.config.fallback;
        let name = path.file_name()?;

        if !text.contains(fallback.source_marker.as_str())
            && fallback.file_names.iter().any(|f| f == name)
        {
            return self.config.rule(&fallback.category);
        }

        None
    }
}
