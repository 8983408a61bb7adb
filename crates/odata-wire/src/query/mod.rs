// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Already-parsed `$select` / `$expand` option trees.
//!
//! Produced by the URI layer; the serializers only read them.

/// One `$select` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    /// `*`: every structural property.
    Star,
    /// Property path, e.g. `["PropertyComp", "PropertyInt16"]`.
    Path(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectOption {
    pub items: Vec<SelectItem>,
}

impl SelectOption {
    pub fn star() -> Self {
        Self {
            items: vec![SelectItem::Star],
        }
    }

    /// Selection from `/`-separated paths (`"PropertyComp/PropertyInt16"`).
    pub fn paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            items: paths
                .into_iter()
                .map(|p| SelectItem::Path(p.as_ref().split('/').map(str::to_string).collect()))
                .collect(),
        }
    }
}

/// `$levels` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Levels {
    Max,
    Value(u32),
}

impl Levels {
    /// Hop count; `max` becomes a bound no real graph reaches.
    pub fn depth(self) -> u32 {
        match self {
            Self::Max => u32::MAX,
            Self::Value(n) => n,
        }
    }
}

/// One `$expand` item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandItem {
    /// Navigation path; leading segments may be complex properties.
    pub path: Vec<String>,
    /// `$expand=*`.
    pub star: bool,
    /// `Nav/$ref`: write references only.
    pub is_ref: bool,
    /// `Nav($count=true)`.
    pub count: bool,
    /// `Nav/$count`: write the count only.
    pub count_path: bool,
    pub levels: Option<Levels>,
    pub select: Option<SelectOption>,
    pub expand: Option<ExpandOption>,
}

impl ExpandItem {
    /// Expand item for a navigation path (`"PropertyComp/NavPropertyETTwoKeyNavOne"`).
    pub fn path(path: &str) -> Self {
        Self {
            path: path.split('/').map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn star() -> Self {
        Self {
            star: true,
            ..Self::default()
        }
    }

    pub fn levels(mut self, levels: Levels) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn select(mut self, select: SelectOption) -> Self {
        self.select = Some(select);
        self
    }

    pub fn expand(mut self, expand: ExpandOption) -> Self {
        self.expand = Some(expand);
        self
    }

    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn count_only(mut self) -> Self {
        self.count_path = true;
        self
    }

    pub fn reference(mut self) -> Self {
        self.is_ref = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandOption {
    pub items: Vec<ExpandItem>,
}

impl ExpandOption {
    pub fn new(items: Vec<ExpandItem>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_split() {
        let select = SelectOption::paths(["PropertyComp/PropertyInt16", "PropertyString"]);
        assert_eq!(
            select.items[0],
            SelectItem::Path(vec!["PropertyComp".into(), "PropertyInt16".into()])
        );
        let item = ExpandItem::path("NavPropertyETTwoPrimOne").levels(Levels::Max);
        assert_eq!(item.levels.map(Levels::depth), Some(u32::MAX));
    }
}
