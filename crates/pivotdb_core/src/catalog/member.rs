use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::collation::quoted_segment;

/// Shared handle to a resolved member.
pub type MemberRef = Arc<Member>;

/// A single addressable point in a dimension hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// The member's own name, e.g. `Dairy`.
    pub name: String,
    /// Fully qualified unique name, e.g. `[Product].[Food].[Dairy]`.
    pub unique_name: String,
    /// Unique name of the hierarchy this member belongs to.
    pub hierarchy: String,
    /// Unique name of the parent member, if any.
    pub parent: Option<String>,
    /// True for a hierarchy's synthetic all-member.
    pub is_all: bool,
}

impl Member {
    /// Unique name a child with the given name would have under this member.
    pub fn child_unique_name(&self, child: &str) -> String {
        format!("{}.{}", self.unique_name, quoted_segment(child))
    }
}

// Members are compared by identity, which for schema members is the unique
// name.
impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.unique_name == other.unique_name
    }
}

impl Eq for Member {}

impl Hash for Member {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_name.hash(state);
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unique_name)
    }
}
