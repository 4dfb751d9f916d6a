//! Contact filtering hooks

use crate::collider::ColliderHandle;
use rapier3d::prelude as rapier;
use std::collections::HashSet;

/// Collider pairs whose contacts are discarded by the narrow phase
///
/// Colliders only consult these hooks when they carry the
/// `FILTER_CONTACT_PAIRS` / `FILTER_INTERSECTION_PAIR` active hooks, which
/// the world sets when a pair is first ignored.
#[derive(Debug, Default)]
pub struct IgnoredPairs {
    pairs: HashSet<(u64, u64)>,
}

impl IgnoredPairs {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: ColliderHandle, b: ColliderHandle) -> (u64, u64) {
        let (a, b) = (a.id().0, b.id().0);
        (a.min(b), a.max(b))
    }

    /// Add or remove a pair; returns true if the set changed
    pub fn set(&mut self, a: ColliderHandle, b: ColliderHandle, ignored: bool) -> bool {
        let key = Self::key(a, b);
        if ignored {
            self.pairs.insert(key)
        } else {
            self.pairs.remove(&key)
        }
    }

    /// Check whether contacts between `a` and `b` are ignored
    pub fn contains(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    /// Forget every pair involving `collider`
    pub fn remove_collider(&mut self, collider: ColliderHandle) {
        let id = collider.id().0;
        self.pairs.retain(|&(a, b)| a != id && b != id);
    }

    /// Number of ignored pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check whether no pair is ignored
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl rapier::PhysicsHooks for IgnoredPairs {
    fn filter_contact_pair(&self, context: &rapier::PairFilterContext) -> Option<rapier::SolverFlags> {
        if self.contains(
            ColliderHandle(context.collider1),
            ColliderHandle(context.collider2),
        ) {
            None
        } else {
            Some(rapier::SolverFlags::COMPUTE_IMPULSES)
        }
    }

    fn filter_intersection_pair(&self, context: &rapier::PairFilterContext) -> bool {
        !self.contains(
            ColliderHandle(context.collider1),
            ColliderHandle(context.collider2),
        )
    }
}
