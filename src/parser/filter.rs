// src/parser/filter.rs

//! Drops operator-ignored lines from a raw scanner log before parsing.

use crate::config::ConfigError;
use regex::Regex;

/// Line filter built from the `[scan].ignores` patterns.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    /// All patterns joined into one alternation; `None` keeps every line.
    combined: Option<Regex>,
}

impl IgnoreFilter {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns: Vec<&String> = patterns.iter().filter(|p| !p.is_empty()).collect();
        if patterns.is_empty() {
            return Ok(Self { combined: None });
        }
        for p in &patterns {
            Regex::new(p).map_err(|e| ConfigError::InvalidIgnore((*p).clone(), e))?;
        }
        let joined = patterns
            .iter()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|");
        let combined = Regex::new(&joined).map_err(|e| ConfigError::InvalidIgnore(joined, e))?;
        Ok(Self { combined: Some(combined) })
    }

    /// Return `raw` without the lines matching any ignore pattern.
    pub fn apply(&self, raw: &str) -> String {
        let Some(re) = &self.combined else {
            return raw.to_owned();
        };
        let mut out = String::with_capacity(raw.len());
        for line in raw.lines() {
            if !re.is_match(line) {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}
