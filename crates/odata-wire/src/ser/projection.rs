// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Projection resolver: which properties to write, which navigation
//! properties to inline, and with which nested options.

use crate::edm::{EdmProvider, StructuredType};
use crate::query::{ExpandItem, ExpandOption, SelectItem, SelectOption};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Structural properties selected on one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(name),
        }
    }
}

/// `true` when `select` is absent, empty or contains `*`.
pub fn is_all(select: Option<&SelectOption>) -> bool {
    select.map_or(true, |s| {
        s.items.is_empty() || s.items.iter().any(|i| matches!(i, SelectItem::Star))
    })
}

/// Structural properties of `ty` to write. Key properties are always part
/// of a restricted entity selection; names not declared on the type are
/// ignored.
pub fn selected_properties(
    edm: &dyn EdmProvider,
    ty: &StructuredType,
    select: Option<&SelectOption>,
) -> Selection {
    let Some(select) = select.filter(|s| !is_all(Some(*s))) else {
        return Selection::All;
    };
    let declared = edm.structural_properties(ty);
    let mut names = BTreeSet::new();
    for item in &select.items {
        if let SelectItem::Path(path) = item {
            if let Some(first) = path.first() {
                if declared.iter().any(|p| &p.name == first) {
                    names.insert(first.clone());
                }
            }
        }
    }
    if ty.is_entity() {
        for key in edm.key_refs(ty) {
            let first = key.name.split('/').next().unwrap_or(&key.name);
            names.insert(first.to_string());
        }
    }
    Selection::Only(names)
}

/// `true` when the navigation property is named by the selection.
pub fn is_navigation_selected(select: Option<&SelectOption>, name: &str) -> bool {
    is_all(select)
        || select.is_some_and(|s| {
            s.items.iter().any(|i| matches!(i, SelectItem::Path(p) if p.len() == 1 && p[0] == name))
        })
}

/// Selection for the value of complex property `property`: the paths below
/// it, or `None` (everything) when the property itself is selected whole.
pub fn reduced_select(select: Option<&SelectOption>, property: &str) -> Option<SelectOption> {
    let select = select.filter(|s| !is_all(Some(*s)))?;
    let mut items = Vec::new();
    for item in &select.items {
        let SelectItem::Path(path) = item else { continue };
        match path.split_first() {
            Some((first, [])) if first == property => return None,
            Some((first, rest)) if first == property => {
                items.push(SelectItem::Path(rest.to_vec()));
            }
            _ => {}
        }
    }
    if items.is_empty() {
        None
    } else {
        Some(SelectOption { items })
    }
}

/// `true` when `expand` has at least one item.
pub fn has_expand(expand: Option<&ExpandOption>) -> bool {
    expand.is_some_and(|e| !e.items.is_empty())
}

/// Explicit expand item for `name` (single-segment path).
pub fn expand_item<'a>(expand: &'a ExpandOption, name: &str) -> Option<&'a ExpandItem> {
    expand
        .items
        .iter()
        .find(|i| !i.star && i.path.len() == 1 && i.path[0] == name)
}

/// `$expand=*` item, if present.
pub fn expand_all(expand: &ExpandOption) -> Option<&ExpandItem> {
    expand.items.iter().find(|i| i.star)
}

/// Expand items continuing below complex property `property`; star items
/// carry over.
pub fn reduced_expand(expand: Option<&ExpandOption>, property: &str) -> Option<ExpandOption> {
    let expand = expand?;
    let items: Vec<ExpandItem> = expand
        .items
        .iter()
        .filter_map(|item| {
            if item.star {
                return Some(item.clone());
            }
            match item.path.split_first() {
                Some((first, rest)) if first == property && !rest.is_empty() => {
                    let mut reduced = item.clone();
                    reduced.path = rest.to_vec();
                    Some(reduced)
                }
                _ => None,
            }
        })
        .collect();
    (!items.is_empty()).then_some(ExpandOption { items })
}

/// Projection in effect for one structured value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projection<'p> {
    pub select: Option<&'p SelectOption>,
    pub expand: Option<&'p ExpandOption>,
    /// Remaining `$levels` hops, when counting.
    pub to_depth: Option<u32>,
}

impl<'p> Projection<'p> {
    pub fn new(select: Option<&'p SelectOption>, expand: Option<&'p ExpandOption>) -> Self {
        Self {
            select,
            expand,
            to_depth: None,
        }
    }
}

/// How one navigation property is expanded.
#[derive(Debug, Clone)]
pub struct Expansion<'a> {
    /// Matched item, explicit or `*`.
    pub item: &'a ExpandItem,
    /// Selection for the inlined entities; explicit items only.
    pub select: Option<&'a SelectOption>,
    /// Expand option for the inlined entities.
    pub child_expand: Option<Cow<'a, ExpandOption>>,
    /// Remaining `$levels` hops for the inlined entities, when counting.
    pub child_depth: Option<u32>,
}

impl Expansion<'_> {
    /// Projection of the inlined entities.
    pub fn child(&self) -> Projection<'_> {
        Projection {
            select: self.select,
            expand: self.child_expand.as_deref(),
            to_depth: self.child_depth,
        }
    }
}

/// Resolve the expansion of navigation property `name`.
///
/// `to_depth` is the remaining hop budget when the current entity was
/// itself reached through a `$levels` expansion. An item with `$levels`
/// re-expands with itself until the budget runs out; without `$levels` the
/// item's own nested `$expand` applies. A zero budget expands nothing.
pub fn expansion<'a>(
    expand: Option<&'a ExpandOption>,
    name: &str,
    to_depth: Option<u32>,
) -> Option<Expansion<'a>> {
    let expand = expand.filter(|e| !e.items.is_empty())?;
    let explicit = expand_item(expand, name);
    let item = explicit.or_else(|| expand_all(expand))?;
    let select = explicit.and_then(|i| i.select.as_ref());

    let (child_expand, child_depth) = if let Some(depth) = to_depth {
        if depth == 0 {
            return None;
        }
        (Some(Cow::Borrowed(expand)), Some(depth - 1))
    } else if let Some(levels) = item.levels {
        let depth = levels.depth();
        if depth == 0 {
            return None;
        }
        let only_this = ExpandOption {
            items: vec![item.clone()],
        };
        (Some(Cow::Owned(only_this)), Some(depth - 1))
    } else {
        (item.expand.as_ref().map(Cow::Borrowed), None)
    };
    Some(Expansion {
        item,
        select,
        child_expand,
        child_depth,
    })
}

/// Select list of a context URL (`PropertyInt16,PropertyComp/PropertyString,Nav()`),
/// `None` when nothing restricts the payload shape.
pub fn context_select_list(
    select: Option<&SelectOption>,
    expand: Option<&ExpandOption>,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(select) = select.filter(|s| !is_all(Some(*s))) {
        for item in &select.items {
            if let SelectItem::Path(path) = item {
                parts.push(path.join("/"));
            }
        }
    }
    if let Some(expand) = expand {
        for item in expand.items.iter().filter(|i| !i.star && !i.is_ref) {
            let nested =
                context_select_list(item.select.as_ref(), item.expand.as_ref()).unwrap_or_default();
            parts.push(format!("{}({})", item.path.join("/"), nested));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}
