use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::collation::NameMatcher;
use super::member::MemberRef;

/// Schema metadata for a cube, as visible to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeMeta {
    pub name: String,
    pub dimensions: Vec<DimensionMeta>,
}

impl CubeMeta {
    pub fn dimension(&self, matcher: NameMatcher, name: &str) -> Option<&DimensionMeta> {
        self.dimensions
            .iter()
            .find(|d| matcher.matches(&d.name, name))
    }
}

/// A named axis of analysis. A dimension may expose multiple hierarchies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionMeta {
    pub name: String,
    pub hierarchies: Vec<Arc<HierarchyMeta>>,
}

impl DimensionMeta {
    pub fn hierarchy(&self, matcher: NameMatcher, name: &str) -> Option<&Arc<HierarchyMeta>> {
        self.hierarchies
            .iter()
            .find(|h| matcher.matches(&h.name, name))
    }

    /// The hierarchy addressed when a path names only the dimension: the one
    /// sharing the dimension's name, else the first declared.
    pub fn default_hierarchy(&self, matcher: NameMatcher) -> Option<&Arc<HierarchyMeta>> {
        self.hierarchies
            .iter()
            .find(|h| matcher.matches(&h.name, &self.name))
            .or_else(|| self.hierarchies.first())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyMeta {
    /// The hierarchy's own name. Equal to the dimension name for the default
    /// hierarchy of a dimension.
    pub name: String,
    /// Name of the owning dimension.
    pub dimension: String,
    /// Canonical bracketed unique name under the active naming convention,
    /// e.g. `[Time.Weekly]` or `[Time].[Weekly]`.
    pub unique_name: String,
    /// The synthetic all-member, when the hierarchy declares one.
    pub all_member: Option<MemberRef>,
    /// Top-level members for hierarchies without an all-member. Empty when
    /// `all_member` is set.
    pub top_members: Vec<MemberRef>,
}

impl HierarchyMeta {
    pub fn has_all(&self) -> bool {
        self.all_member.is_some()
    }

    /// Find a top-level member by name.
    pub fn top_member(&self, matcher: NameMatcher, name: &str) -> Option<MemberRef> {
        self.top_members
            .iter()
            .find(|m| matcher.matches(&m.name, name))
            .cloned()
    }
}
