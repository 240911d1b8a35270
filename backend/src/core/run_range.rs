//! Run-ranged directive tables
//!
//! Calibration inputs that change with the data-taking epoch are configured as
//! ordered lists of directives. Each directive is either a literal payload
//! (typically a file path) or a range directive of the form `min:max:payload`:
//!
//! ```text
//! "1:100:Residual_A.txt"      runs 1..99
//! "100:-1:Residual_B.txt"     runs 100 and above (-1 = open bound)
//! "/maps/vetomap.vmap"        literal, matches every run
//! ```
//!
//! # Critical Invariants
//!
//! 1. **First match wins**: rules are tested in declaration order
//! 2. **Half-open ranges**: `min` inclusive, `max` exclusive
//! 3. **No parse errors**: a directive whose bounds are not integers degrades to
//!    a literal payload instead of failing the job
//!
//! # Example
//!
//! ```rust
//! use jet_calib_core::RunRangeTable;
//!
//! let table = RunRangeTable::parse(&["1:100:fileA", "100:-1:fileB"]);
//! assert_eq!(table.resolve(50).unwrap().payload, "fileA");
//! assert_eq!(table.resolve(100).unwrap().payload, "fileB");
//! assert!(table.resolve(0).is_none());
//! ```

use serde::{Deserialize, Serialize};

/// Bound value meaning "unbounded" in a range directive.
pub const OPEN_BOUND: i64 = -1;

/// A single run-ranged rule.
///
/// Negative bounds are open. Literal directives are stored as a rule with both
/// bounds open so that they match any run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRangeRule {
    /// Lowest run covered (inclusive), negative = open
    pub min_run: i64,

    /// First run no longer covered (exclusive), negative = open
    pub max_run: i64,

    /// Payload attached to the rule (file path, payload name, ...)
    pub payload: String,

    /// Directive text the rule was parsed from, used as a cache key
    pub source: String,
}

impl RunRangeRule {
    /// Build a rule that matches every run.
    pub fn literal(payload: impl Into<String>) -> Self {
        let payload = payload.into();
        Self {
            min_run: OPEN_BOUND,
            max_run: OPEN_BOUND,
            source: payload.clone(),
            payload,
        }
    }

    /// Whether `run` falls inside `[min_run, max_run)`.
    pub fn contains(&self, run: u32) -> bool {
        let run = i64::from(run);
        let above_min = self.min_run < 0 || run >= self.min_run;
        let below_max = self.max_run < 0 || run < self.max_run;
        above_min && below_max
    }

    /// True when both bounds are open (literal directive or `-1:-1:...`).
    pub fn is_unbounded(&self) -> bool {
        self.min_run < 0 && self.max_run < 0
    }
}

/// Result of resolving a run against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRangeMatch {
    /// Payload of the matching rule
    pub payload: String,

    /// Directive text of the matching rule (stable cache key)
    pub key: String,

    /// Declaration index of the matching rule
    pub index: usize,
}

/// Ordered, immutable table of run-ranged rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRangeTable {
    rules: Vec<RunRangeRule>,
}

impl RunRangeTable {
    /// Parse a directive list.
    ///
    /// Blank entries are skipped. Never fails: malformed range directives are
    /// kept as literal payloads.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Self {
        let rules = entries
            .iter()
            .map(|e| e.as_ref().trim())
            .filter(|e| !e.is_empty())
            .map(parse_directive)
            .collect();
        Self { rules }
    }

    /// Build a table from already-constructed rules.
    pub fn from_rules(rules: Vec<RunRangeRule>) -> Self {
        Self { rules }
    }

    /// Return the first rule, in declaration order, whose range contains `run`.
    pub fn resolve(&self, run: u32) -> Option<RunRangeMatch> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.contains(run))
            .map(|(index, rule)| RunRangeMatch {
                payload: rule.payload.clone(),
                key: rule.source.clone(),
                index,
            })
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[RunRangeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parse one trimmed, non-empty directive.
///
/// Only the first two `:` separate fields, so payloads may contain colons.
fn parse_directive(entry: &str) -> RunRangeRule {
    let mut parts = entry.splitn(3, ':');
    let (Some(min), Some(max), Some(payload)) = (parts.next(), parts.next(), parts.next()) else {
        return RunRangeRule::literal(entry);
    };

    let payload = payload.trim();
    match (parse_bound(min), parse_bound(max)) {
        (Some(min_run), Some(max_run)) if !payload.is_empty() => RunRangeRule {
            min_run,
            max_run,
            payload: payload.to_string(),
            source: entry.to_string(),
        },
        _ => RunRangeRule::literal(entry),
    }
}

/// Accepts an optionally signed run of ASCII digits, nothing else.
fn parse_bound(field: &str) -> Option<i64> {
    let field = field.trim();
    let digits = field.strip_prefix(['-', '+']).unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse::<i64>().ok()
}
