//! Compact expected-result strings for literal pulls.
//!
//! `<rank>[=<sum test>][&<hit test>]`, either test first, whitespace ignored.
//! Each test is `<base>[$<fortune>]`. A sum side is `<signed int><outcome>`,
//! a hit side is `<hits>/<misses><outcome>`, and the outcome is one of
//! `.` failure, `-` partial, `+` full, `^` crit. `0=2+$1-&2/0+` checks rank 0
//! for a full sum of 2 on base, a partial sum of 1 on fortune, and a full 2/0
//! on the base hit track.

use crate::{
    Outcome, Pool, PullConfig, PullMode, RankEvaluator, RankResult, Tally, TestCase,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssertionError {
    #[error("empty test")]
    Empty,
    #[error("test is missing its rank")]
    MissingRank,
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("unexpected `{0}`, expected `=` or `&`")]
    UnexpectedMarker(char),
    #[error("`{0}` section given twice")]
    DuplicateSection(char),
    #[error("test has neither a sum (`=`) nor a hit (`&`) section")]
    NoChecks,
    #[error("missing outcome in `{0}`")]
    MissingOutcome(String),
    #[error("unknown outcome `{0}`")]
    UnknownOutcome(char),
    #[error("missing `/` in hit test `{0}`")]
    MissingSlash(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitCount {
    pub hits: i64,
    pub misses: i64,
}

impl fmt::Display for HitCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hits, self.misses)
    }
}

/// A value a track check can compare against a [`Tally`].
pub trait Measured: Copy + PartialEq + fmt::Display {
    fn read(tally: Tally) -> Option<Self>;
    fn parse(text: &str) -> Result<Self, AssertionError>;
}

impl Measured for i64 {
    fn read(tally: Tally) -> Option<Self> {
        match tally {
            Tally::Sum { sum } => Some(sum),
            Tally::Hits { .. } => None,
        }
    }

    fn parse(text: &str) -> Result<Self, AssertionError> {
        parse_number(text)
    }
}

impl Measured for HitCount {
    fn read(tally: Tally) -> Option<Self> {
        match tally {
            Tally::Hits { hits, misses } => Some(HitCount { hits, misses }),
            Tally::Sum { .. } => None,
        }
    }

    fn parse(text: &str) -> Result<Self, AssertionError> {
        let (hits, misses) = text
            .split_once('/')
            .ok_or_else(|| AssertionError::MissingSlash(text.to_string()))?;
        Ok(HitCount {
            hits: parse_number(hits)?,
            misses: parse_number(misses)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected<T> {
    pub value: T,
    pub outcome: Outcome,
}

impl<T: Measured> Expected<T> {
    fn parse(text: &str) -> Result<Self, AssertionError> {
        let mut chars = text.chars();
        let symbol = chars
            .next_back()
            .filter(|symbol| !symbol.is_ascii_digit())
            .ok_or_else(|| AssertionError::MissingOutcome(text.to_string()))?;
        let outcome = Outcome::from_symbol(symbol).ok_or(AssertionError::UnknownOutcome(symbol))?;
        Ok(Self {
            value: T::parse(chars.as_str())?,
            outcome,
        })
    }

    fn observed(tally: Tally, outcome: Outcome) -> Option<Self> {
        Some(Self {
            value: T::read(tally)?,
            outcome,
        })
    }

    fn matches(&self, tally: Tally, outcome: Outcome) -> bool {
        T::read(tally) == Some(self.value) && outcome == self.outcome
    }
}

impl<T: fmt::Display> fmt::Display for Expected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.outcome.symbol())
    }
}

/// Expectations for one measure: the base track and, optionally, fortune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackCheck<T> {
    pub base: Expected<T>,
    pub fortune: Option<Expected<T>>,
}

impl<T: Measured> TrackCheck<T> {
    fn parse(text: &str) -> Result<Self, AssertionError> {
        let (base, fortune) = match text.split_once('$') {
            Some((base, fortune)) => (base, Some(fortune)),
            None => (text, None),
        };
        Ok(Self {
            base: Expected::parse(base)?,
            fortune: fortune.map(Expected::parse).transpose()?,
        })
    }

    fn observed(result: &RankResult) -> Option<Self> {
        let outcome = result.outcome?;
        Some(Self {
            base: Expected::observed(result.base, outcome.base)?,
            fortune: Some(Expected::observed(result.fortune, outcome.fortune)?),
        })
    }

    fn compare(&self, label: &str, result: &RankResult, mismatches: &mut Vec<String>) {
        let Some(outcome) = result.outcome else {
            mismatches.push(format!("{label}: no outcome evaluated"));
            return;
        };
        if !self.base.matches(result.base, outcome.base) {
            mismatches.push(format!(
                "{label} base expected {} got {}",
                self.base,
                describe(result.base, outcome.base)
            ));
        }
        if let Some(fortune) = &self.fortune {
            if !fortune.matches(result.fortune, outcome.fortune) {
                mismatches.push(format!(
                    "{label} fortune expected {} got {}",
                    fortune,
                    describe(result.fortune, outcome.fortune)
                ));
            }
        }
    }
}

impl<T: fmt::Display> fmt::Display for TrackCheck<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(fortune) = &self.fortune {
            write!(f, "${fortune}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub rank: u32,
    pub sums: Option<TrackCheck<i64>>,
    pub hits: Option<TrackCheck<HitCount>>,
}

impl Assertion {
    pub fn parse(text: &str) -> Result<Self, AssertionError> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(AssertionError::Empty);
        }
        let rank_end = compact
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(compact.len());
        if rank_end == 0 {
            return Err(AssertionError::MissingRank);
        }
        let rank = compact[..rank_end]
            .parse()
            .map_err(|_| AssertionError::InvalidNumber(compact[..rank_end].to_string()))?;

        let mut sums = None;
        let mut hits = None;
        let mut rest = &compact[rank_end..];
        while let Some(marker) = rest.chars().next() {
            if marker != '=' && marker != '&' {
                return Err(AssertionError::UnexpectedMarker(marker));
            }
            let body = &rest[1..];
            let end = body.find(['=', '&']).unwrap_or(body.len());
            let section = &body[..end];
            match marker {
                '=' if sums.is_some() => return Err(AssertionError::DuplicateSection(marker)),
                '&' if hits.is_some() => return Err(AssertionError::DuplicateSection(marker)),
                '=' => sums = Some(TrackCheck::parse(section)?),
                _ => hits = Some(TrackCheck::parse(section)?),
            }
            rest = &body[end..];
        }
        if sums.is_none() && hits.is_none() {
            return Err(AssertionError::NoChecks);
        }
        Ok(Self { rank, sums, hits })
    }

    /// Builds the assertion that `sums` and `hits` (standard-mode results at
    /// `rank`) satisfy, checking both tracks.
    pub fn observe(rank: u32, sums: Option<&RankResult>, hits: Option<&RankResult>) -> Option<Self> {
        let sums = match sums {
            Some(result) => Some(TrackCheck::<i64>::observed(result)?),
            None => None,
        };
        let hits = match hits {
            Some(result) => Some(TrackCheck::<HitCount>::observed(result)?),
            None => None,
        };
        if sums.is_none() && hits.is_none() {
            return None;
        }
        Some(Self { rank, sums, hits })
    }

    /// Evaluates the pull once per measure the assertion names. Returns the
    /// observed assertion on success and a diagnostic on mismatch.
    pub fn check(&self, pool: &Pool, config: &PullConfig, pull: &[String]) -> Result<String, String> {
        let mut mismatches = Vec::new();
        let sums = match &self.sums {
            Some(expected) => {
                let result = evaluate(pool, config, true, self.rank, pull)?;
                expected.compare("sum", &result, &mut mismatches);
                Some(result)
            }
            None => None,
        };
        let hits = match &self.hits {
            Some(expected) => {
                let result = evaluate(pool, config, false, self.rank, pull)?;
                expected.compare("hit", &result, &mut mismatches);
                Some(result)
            }
            None => None,
        };
        let observed = Self::observe(self.rank, sums.as_ref(), hits.as_ref())
            .map(|assertion| assertion.to_string())
            .unwrap_or_default();
        if mismatches.is_empty() {
            Ok(observed)
        } else {
            Err(format!(
                "rank {}: {} (observed {observed})",
                self.rank,
                mismatches.join("; ")
            ))
        }
    }
}

impl FromStr for Assertion {
    type Err = AssertionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank)?;
        if let Some(sums) = &self.sums {
            write!(f, "={sums}")?;
        }
        if let Some(hits) = &self.hits {
            write!(f, "&{hits}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResult {
    pub pull: Vec<String>,
    pub test: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestReport {
    pub results: Vec<TestResult>,
}

impl TestReport {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|result| result.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> + '_ {
        self.results.iter().filter(|result| !result.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|result| result.passed).count()
    }
}

/// Runs every test string of `case` against its literal pull. Malformed
/// strings fail on their own without stopping the rest.
pub fn verify_case(pool: &Pool, config: &PullConfig, case: &TestCase) -> Vec<TestResult> {
    let config = match &case.config {
        Some(overrides) => config.with_overrides(overrides),
        None => config.clone(),
    };
    case.tests
        .iter()
        .map(|test| {
            let outcome = Assertion::parse(test)
                .map_err(|err| format!("malformed test `{test}`: {err}"))
                .and_then(|assertion| assertion.check(pool, &config, &case.pull));
            let (passed, detail) = match outcome {
                Ok(observed) => (true, observed),
                Err(detail) => {
                    log::debug!("test `{test}` on {:?} failed: {detail}", case.pull);
                    (false, detail)
                }
            };
            TestResult {
                pull: case.pull.clone(),
                test: test.clone(),
                passed,
                detail,
            }
        })
        .collect()
}

fn evaluate(
    pool: &Pool,
    config: &PullConfig,
    sums: bool,
    rank: u32,
    pull: &[String],
) -> Result<RankResult, String> {
    let config = PullConfig {
        sums,
        mode: PullMode::Standard,
        ..config.clone()
    };
    RankEvaluator::new(pool, &config)
        .evaluate(rank, pull)
        .map_err(|err| format!("rank {rank}: {err}"))
}

fn describe(tally: Tally, outcome: Outcome) -> String {
    match tally {
        Tally::Sum { sum } => format!("{sum}{}", outcome.symbol()),
        Tally::Hits { hits, misses } => format!("{hits}/{misses}{}", outcome.symbol()),
    }
}

fn parse_number(text: &str) -> Result<i64, AssertionError> {
    text.parse()
        .map_err(|_| AssertionError::InvalidNumber(text.to_string()))
}
