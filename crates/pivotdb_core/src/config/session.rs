use serde::{Deserialize, Serialize};

use crate::catalog::collation::NameMatcher;

/// How multi-hierarchy dimensions are addressed in member paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HierarchyNaming {
    /// Dimension and hierarchy in one dotted segment, e.g. `[Time.Weekly]`.
    #[default]
    Compact,
    /// Dimension and hierarchy as separate segments, e.g. `[Time].[Weekly]`.
    Split,
}

/// Configuration for the session.
///
/// Threaded explicitly into the resolver; nothing here is read from ambient
/// global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Naming convention for hierarchies of multi-hierarchy dimensions.
    pub hierarchy_naming: HierarchyNaming,
    /// Name given to members backed by a NULL key value. Resolves like any
    /// other member name.
    pub null_member_name: String,
    /// Whether member name comparison is case sensitive.
    pub case_sensitive_names: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            hierarchy_naming: HierarchyNaming::default(),
            null_member_name: "#null".to_string(),
            case_sensitive_names: false,
        }
    }
}

impl SessionConfig {
    pub fn name_matcher(&self) -> NameMatcher {
        NameMatcher::new(self.case_sensitive_names)
    }
}
