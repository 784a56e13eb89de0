//! Shrink-to-budget for share URLs.
//!
//! Applies shrink transforms from least to most lossy and stops at the first
//! query that fits the length budget.

use super::share_url::{build_query, ShareState};
use crate::config::ShrinkConfig;
use crate::model::tree::Tree;
use crate::store::shrink::{normalize_tags, renumber_ids, truncate_titles};
use log::debug;

/// One shrink transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkStep {
    NormalizeTags,
    RenumberIds,
    /// Lossy.
    TruncateTitles,
}

impl ShrinkStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NormalizeTags => "normalize_tags",
            Self::RenumberIds => "renumber_ids",
            Self::TruncateTitles => "truncate_titles",
        }
    }
}

/// Outcome of [`shrink_to_budget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkReport {
    /// Tree after the applied steps.
    pub tree: Tree,
    /// Query string for `tree`.
    pub query: String,
    /// Steps applied, in order.
    pub applied: Vec<ShrinkStep>,
    /// Whether `query` fits the budget.
    pub fits: bool,
}

/// Shrinks `tree` until its share query is at most `config.url_budget`
/// bytes, or every step has been applied.
pub fn shrink_to_budget(tree: &Tree, state: &ShareState, config: &ShrinkConfig) -> ShrinkReport {
    let mut current = tree.clone();
    let mut query = build_query(&current, state);
    let mut applied = Vec::new();

    for step in [
        ShrinkStep::NormalizeTags,
        ShrinkStep::RenumberIds,
        ShrinkStep::TruncateTitles,
    ] {
        if query.len() <= config.url_budget {
            break;
        }
        current = match step {
            ShrinkStep::NormalizeTags => normalize_tags(&current),
            ShrinkStep::RenumberIds => renumber_ids(&current),
            ShrinkStep::TruncateTitles => truncate_titles(&current, config.title_max_chars),
        };
        query = build_query(&current, state);
        applied.push(step);
        debug!(
            "event=url_shrink module=codec status=step step={} query_len={} budget={}",
            step.as_str(),
            query.len(),
            config.url_budget
        );
    }

    let fits = query.len() <= config.url_budget;
    ShrinkReport {
        tree: current,
        query,
        applied,
        fits,
    }
}
