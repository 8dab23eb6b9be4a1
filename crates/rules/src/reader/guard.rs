//! Per-request record of rulesets already merged.

use std::collections::HashSet;

use crate::identity::RulesetIdentity;

/// Identities visited during one top-level read.
///
/// A second visit of the same identity contributes nothing: this both ends
/// `extends` cycles and drops the repeated leg of a diamond.
#[derive(Debug, Default)]
pub struct CycleGuard {
    visited: HashSet<RulesetIdentity>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identity`; `false` if it was already recorded.
    pub fn visit(&mut self, identity: &RulesetIdentity) -> bool {
        self.visited.insert(identity.clone())
    }

    pub fn clear(&mut self) {
        self.visited.clear();
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}
