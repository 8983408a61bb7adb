// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ancestor tracking for expansion cycle detection.
//!
//! Every entity written while an expand is active is entered under its id
//! for the duration of its own emission. Meeting an id that is already on
//! the path means the graph loops back; that occurrence is written as a
//! reference only. Leaving the scope (normally or through `?`) removes the
//! id again, so sibling branches can still expand the same entity.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

/// Ids on the current expansion path. Scoped to one top-level serialize
/// call; the set allocates on first entry only.
#[derive(Debug, Default)]
pub struct Ancestors {
    ids: HashSet<String>,
}

impl Ancestors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `id` for the lifetime of the returned scope.
    pub fn enter(&mut self, id: &str) -> AncestorScope<'_> {
        let entered = self.ids.insert(id.to_string()).then(|| id.to_string());
        AncestorScope {
            ancestors: self,
            entered,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Guard returned by [`Ancestors::enter`].
#[derive(Debug)]
pub struct AncestorScope<'a> {
    ancestors: &'a mut Ancestors,
    /// `None` when the id was already on the path.
    entered: Option<String>,
}

impl AncestorScope<'_> {
    /// `true` when the entered id closes a cycle.
    pub fn is_cycle(&self) -> bool {
        self.entered.is_none()
    }
}

impl Deref for AncestorScope<'_> {
    type Target = Ancestors;

    fn deref(&self) -> &Ancestors {
        self.ancestors
    }
}

impl DerefMut for AncestorScope<'_> {
    fn deref_mut(&mut self) -> &mut Ancestors {
        self.ancestors
    }
}

impl Drop for AncestorScope<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.entered.take() {
            self.ancestors.ids.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_scopes() {
        let mut ancestors = Ancestors::new();
        {
            let mut a = ancestors.enter("A");
            assert!(!a.is_cycle());
            {
                let mut b = a.enter("B");
                assert!(!b.is_cycle());
                let again = b.enter("A");
                assert!(again.is_cycle());
            }
            assert!(a.contains("A"));
            assert!(!a.contains("B"));
        }
        assert!(ancestors.is_empty());
    }

    #[test]
    fn test_removed_on_error_path() {
        fn fails(ancestors: &mut Ancestors) -> Result<(), &'static str> {
            let scope = ancestors.enter("X");
            assert_eq!(scope.len(), 1);
            Err::<(), _>("boom")?;
            Ok(())
        }
        let mut ancestors = Ancestors::new();
        assert!(fails(&mut ancestors).is_err());
        assert!(ancestors.is_empty());
    }

    #[test]
    fn test_cycle_scope_keeps_outer_entry() {
        let mut ancestors = Ancestors::new();
        let mut outer = ancestors.enter("A");
        drop(outer.enter("A"));
        assert!(outer.contains("A"));
    }
}
