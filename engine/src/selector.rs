//! Target selection
//!
//! Resolves a selection spec against the full candidate set for a
//! service. Pure given the injected random source, so callers own the
//! randomness and tests can seed it.

use crate::error::{EngineError, EngineResult};
use crate::handle::RemoteProcessHandle;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

/// How the target subset is chosen from a service's candidate handles
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionSpec {
    /// Every candidate
    All,
    /// Explicit host addresses; each must resolve against the candidates
    Nodes(Vec<String>),
    /// N distinct handles, sampled uniformly without replacement
    Count(usize),
    /// round-half-up(|candidates| * p / 100) handles, p in (0, 100]
    Percentage(f64),
}

/// Wire form of a selection, as the HTTP/CLI layer submits it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub nodes: Option<Vec<String>>,
    pub count: Option<u64>,
    pub percentage: Option<f64>,
}

impl SelectionSpec {
    /// Validate a wire-level selection into a spec
    ///
    /// At most one of nodes/count/percentage may be set; none set means
    /// all candidates.
    pub fn from_request(request: SelectionRequest) -> EngineResult<Self> {
        let set = [
            request.nodes.is_some(),
            request.count.is_some(),
            request.percentage.is_some(),
        ]
        .iter()
        .filter(|&&s| s)
        .count();
        if set > 1 {
            return Err(EngineError::validation(
                "at most one of nodes, count, percentage may be set",
            ));
        }

        if let Some(nodes) = request.nodes {
            if nodes.is_empty() {
                return Err(EngineError::validation("node list must not be empty"));
            }
            return Ok(SelectionSpec::Nodes(nodes));
        }
        if let Some(count) = request.count {
            if count == 0 {
                return Err(EngineError::validation("count must be positive"));
            }
            return Ok(SelectionSpec::Count(count as usize));
        }
        if let Some(percentage) = request.percentage {
            if !(percentage > 0.0 && percentage <= 100.0) {
                return Err(EngineError::validation(
                    "percentage must be in (0, 100]",
                ));
            }
            return Ok(SelectionSpec::Percentage(percentage));
        }
        Ok(SelectionSpec::All)
    }

    /// Shape-level validation, independent of any candidate set
    ///
    /// Checked before the target service is even looked up, so a
    /// malformed selection reports a validation error rather than
    /// whatever the lookup would have said.
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            SelectionSpec::All => Ok(()),
            SelectionSpec::Nodes(addresses) => {
                if addresses.is_empty() {
                    return Err(EngineError::validation("node list must not be empty"));
                }
                Ok(())
            }
            SelectionSpec::Count(count) => {
                if *count == 0 {
                    return Err(EngineError::validation("count must be positive"));
                }
                Ok(())
            }
            SelectionSpec::Percentage(percentage) => {
                if !(*percentage > 0.0 && *percentage <= 100.0) {
                    return Err(EngineError::validation("percentage must be in (0, 100]"));
                }
                Ok(())
            }
        }
    }
}

/// Resolve a spec into a concrete target subset
///
/// Deterministic given `rng`. A spec that names unknown addresses fails
/// with a validation error enumerating every invalid address; nothing is
/// partially selected. The address list is a set: a repeated address
/// resolves to its handle once.
pub fn select<R: Rng + ?Sized>(
    candidates: &[Arc<RemoteProcessHandle>],
    spec: &SelectionSpec,
    rng: &mut R,
) -> EngineResult<Vec<Arc<RemoteProcessHandle>>> {
    spec.validate()?;
    match spec {
        SelectionSpec::All => Ok(candidates.to_vec()),

        SelectionSpec::Nodes(addresses) => {
            let mut targets = Vec::with_capacity(addresses.len());
            let mut seen = HashSet::with_capacity(addresses.len());
            let mut invalid = Vec::new();
            for address in addresses {
                if !seen.insert(address.as_str()) {
                    continue;
                }
                match candidates.iter().find(|h| h.host() == address) {
                    Some(handle) => targets.push(handle.clone()),
                    None => invalid.push(address.clone()),
                }
            }
            if !invalid.is_empty() {
                return Err(EngineError::validation(format!(
                    "unknown node addresses: {}",
                    invalid.join(", ")
                )));
            }
            Ok(targets)
        }

        SelectionSpec::Count(count) => {
            let take = (*count).min(candidates.len());
            Ok(sample(candidates, take, rng))
        }

        SelectionSpec::Percentage(percentage) => {
            // round half up
            let share = candidates.len() as f64 * percentage / 100.0;
            let take = (share + 0.5).floor() as usize;
            Ok(sample(candidates, take, rng))
        }
    }
}

/// Uniform sample of `take` distinct handles, without replacement
fn sample<R: Rng + ?Sized>(
    candidates: &[Arc<RemoteProcessHandle>],
    take: usize,
    rng: &mut R,
) -> Vec<Arc<RemoteProcessHandle>> {
    candidates
        .choose_multiple(rng, take)
        .cloned()
        .collect()
}
