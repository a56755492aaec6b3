//! Pattern filter
//!
//! Glob-based include/exclude filtering of candidate file names. A file must
//! match at least one include pattern (when any are given) and none of the
//! exclude patterns.

use anyhow::Result;
use glob::Pattern;

use crate::error::RelayError;

/// Compiled include/exclude glob filter
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PatternFilter {
    /// Compile a filter from pattern strings
    ///
    /// An invalid pattern is a configuration error surfaced at construction,
    /// not at match time.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: Self::compile(include, "include")?,
            exclude: Self::compile(exclude, "exclude")?,
        })
    }

    fn compile(patterns: &[String], field: &str) -> Result<Vec<Pattern>> {
        patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    RelayError::config_error_with_field(
                        format!("Invalid glob pattern '{}': {}", p, e),
                        field,
                    )
                    .into()
                })
            })
            .collect()
    }

    /// Whether any patterns are configured
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Evaluate a candidate file name against the filter
    pub fn matches(&self, name: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(name)) {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(name))
    }
}
