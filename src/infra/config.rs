//! Built-in pack table: category rules, scan filters and the
//! root-level fallback. Compiled in; there is no config file.

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::error::PackError;

/// One classification rule. Order inside `PackConfig::rules` is precedence.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRule
{
    /// Category name; also the artifact base name
    pub name: String,

    /// Literal path substrings, any of which selects this category
    pub keys: Vec<String>,

    /// Requested number of output parts
    pub parts: NonZeroUsize,
}

impl CategoryRule
{
    /// Build a rule, rejecting a zero part count or an empty key list.
    pub fn new(
        name: &str,
        keys: &[&str],
        parts: usize,
    ) -> Result<Self, PackError>
    {
        let parts = NonZeroUsize::new(parts).ok_or_else(|| PackError::InvalidRule {
            category: name.to_string(),
            reason: "part count must be at least 1".to_string(),
        })?;

        if keys.is_empty()
        {
            return Err(PackError::InvalidRule {
                category: name.to_string(),
                reason: "rule has no path keys".to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            keys: keys
                .iter()
                .map(|k| k.to_string())
                .collect(),
            parts,
        })
    }

    /// True when any key occurs literally in `path`.
    pub fn matches(
        &self,
        path: &str,
    ) -> bool
    {
        self.keys
            .iter()
            .any(|k| path.contains(k.as_str()))
    }
}

/// Root-level files that land in a designated category when no rule matched.
#[derive(Debug, Clone, Serialize)]
pub struct Fallback
{
    /// Category receiving recognized root files
    pub category: String,

    /// Paths containing this marker are never treated as root files
    pub source_marker: String,

    /// Recognized bare file names
    pub file_names: Vec<String>,
}

/// Complete static table driving one run.
#[derive(Debug, Clone, Serialize)]
pub struct PackConfig
{
    /// Ordered rules, first match wins
    pub rules: Vec<CategoryRule>,

    /// Fallback for root configuration files
    pub fallback: Fallback,

    /// Allowed extensions, without the dot
    pub extensions: Vec<String>,

    /// Bare file names that are never packed
    pub ignore_files: Vec<String>,

    /// Directory names that are never descended into
    pub ignore_dirs: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String>
{
    items
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl PackConfig
{
    /// The built-in table for a Next.js style project.
    pub fn builtin() -> Result<Self, PackError>
    {
        let rules = vec![
            CategoryRule::new("1_SCREENS_AND_ROUTES", &["src\\app", "src/app"], 6)?,
            CategoryRule::new("2_VISUAL_COMPONENTS", &["src\\components", "src/components"], 12)?,
            CategoryRule::new(
                "3_DATA_RULES",
                &["src\\lib", "src\\actions", "src/lib", "src/actions"],
                2,
            )?,
            CategoryRule::new("4_CONFIGURATION", &["package.json", "tsconfig.json", "next.config"], 1)?,
        ];

        let config = Self {
            rules,
            fallback: Fallback {
                category: "4_CONFIGURATION".to_string(),
                source_marker: "src".to_string(),
                file_names: strings(&[
                    "package.json",
                    "next.config.ts",
                    "next.config.js",
                    "tailwind.config.js",
                    "tsconfig.json",
                    "middleware.ts",
                ]),
            },
            extensions: strings(&["ts", "tsx", "sql", "css", "json", "md"]),
            ignore_files: strings(&["package-lock.json", "next-env.d.ts", "yarn.lock"]),
            ignore_dirs: strings(&["node_modules", ".next", ".git", ".vscode", "dist", "build"]),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-rule invariants the per-rule constructor cannot see.
    pub fn validate(&self) -> Result<(), PackError>
    {
        for (i, rule) in self
            .rules
            .iter()
            .enumerate()
        {
            if self.rules[..i]
                .iter()
                .any(|r| r.name == rule.name)
            {
                return Err(PackError::InvalidRule {
                    category: rule.name.clone(),
                    reason: "duplicate category name".to_string(),
                });
            }
        }

        if self
            .rule(&self.fallback.category)
            .is_none()
        {
            return Err(PackError::InvalidRule {
                category: self
                    .fallback
                    .category
                    .clone(),
                reason: "fallback category is not in the rule table".to_string(),
            });
        }

        Ok(())
    }

    /// Look up a rule by category name.
    pub fn rule(
        &self,
        name: &str,
    ) -> Option<&CategoryRule>
    {
        self.rules
            .iter()
            .find(|r| r.name == name)
    }
}
