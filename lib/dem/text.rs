//! `stim` text format for detector error models.
//!
//! ```text
//! # comment
//! error(0.001) D0 D3 L1
//! detector D0
//! logical_observable L1
//! ```
//!
//! Only `error` instructions carry content; `detector` and
//! `logical_observable` declarations are accepted and ignored, as are the `^`
//! separators of suggested decompositions. Targets listed more than once on
//! one line cancel pairwise.

use std::{ fmt, str::FromStr };
use thiserror::Error;
use crate::dem::{ Dem, DemError, DemRecord };

/// Error type for DEM text parsing. Line numbers start at 1.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DemParseError {
    #[error("line {0}: unsupported instruction `{1}`")]
    UnknownInstruction(usize, String),

    #[error("line {0}: expected `error(<probability>)`")]
    MissingProbability(usize),

    #[error("line {0}: invalid probability `{1}`")]
    InvalidProbability(usize, String),

    #[error("line {0}: invalid target `{1}`")]
    InvalidTarget(usize, String),
}

impl fmt::Display for DemRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error({})", self.probability)?;
        for d in self.detectors.iter() { write!(f, " D{d}")?; }
        for l in self.observables.iter() { write!(f, " L{l}")?; }
        Ok(())
    }
}

impl fmt::Display for Dem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rec in self.records.iter() { writeln!(f, "{rec}")?; }
        Ok(())
    }
}

fn parse_error_line(lineno: usize, line: &str)
    -> Result<DemRecord, DemParseError>
{
    let rest =
        line.strip_prefix("error")
        .map(|rest| rest.trim_start())
        .and_then(|rest| rest.strip_prefix('('))
        .ok_or(DemParseError::MissingProbability(lineno))?;
    let (prob_str, targets) =
        rest.split_once(')')
        .ok_or(DemParseError::MissingProbability(lineno))?;
    let probability: f64 =
        prob_str.trim().parse().ok()
        .filter(|p: &f64| p.is_finite() && *p > 0.0 && *p <= 1.0)
        .ok_or_else(|| DemParseError::InvalidProbability(lineno, prob_str.into()))?;
    let mut detectors: Vec<usize> = Vec::new();
    let mut observables: Vec<usize> = Vec::new();
    for token in targets.split_whitespace().filter(|t| *t != "^") {
        let invalid = || DemParseError::InvalidTarget(lineno, token.into());
        if let Some(id) = token.strip_prefix('D') {
            detectors.push(id.parse().map_err(|_| invalid())?);
        } else if let Some(id) = token.strip_prefix('L') {
            observables.push(id.parse().map_err(|_| invalid())?);
        } else {
            return Err(invalid());
        }
    }
    Ok(DemRecord::new(probability, detectors, observables))
}

fn instruction(line: &str) -> &str {
    let end =
        line.find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(line.len());
    &line[..end]
}

impl FromStr for Dem {
    type Err = DemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut records: Vec<DemRecord> = Vec::new();
        for (k, line) in s.lines().enumerate() {
            let lineno = k + 1;
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() { continue; }
            match instruction(line) {
                "error" => { records.push(parse_error_line(lineno, line)?); },
                "detector" | "logical_observable" => { },
                other => {
                    return Err(
                        DemParseError::UnknownInstruction(lineno, other.into())
                            .into()
                    );
                },
            }
        }
        Ok(Self { records })
    }
}

impl Dem {
    /// Render `self` in `stim` text format, one `error` line per record.
    ///
    /// Probabilities are written in the shortest form that parses back to the
    /// same value.
    pub fn to_stim_string(&self) -> String { self.to_string() }

    /// Parse a model from `stim` text format.
    pub fn from_stim_str(s: &str) -> Result<Self, DemError> { s.parse() }
}
