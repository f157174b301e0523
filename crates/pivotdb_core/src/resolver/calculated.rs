//! Registry of calculated members and sets declared by the query's formulas.
//!
//! Consulted before any path segment is treated as requiring a physical
//! lookup. Calculated entities resolve from the query itself and never
//! appear in the resolved map.

use std::collections::HashMap;

use pivotdb_parser::ast::{Formula, PathSegment};

use crate::catalog::collation::{NameMatcher, quoted_segment};
use crate::catalog::cube::CubeMeta;
use crate::config::session::SessionConfig;
use crate::resolver::normalize::match_hierarchy_head;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculatedKind {
    Member,
    Set,
}

/// A calculated member or set declaration.
#[derive(Debug, Clone)]
pub struct CalculatedEntity {
    pub kind: CalculatedKind,
    pub unique_name: String,
}

#[derive(Debug)]
pub struct CalculatedRegistry {
    matcher: NameMatcher,
    entries: HashMap<String, CalculatedEntity>,
}

impl CalculatedRegistry {
    /// Build the registry from the query's formula list.
    pub fn from_formulas(cube: &CubeMeta, config: &SessionConfig, formulas: &[Formula]) -> Self {
        let matcher = config.name_matcher();
        let mut entries = HashMap::new();
        for formula in formulas {
            let unique_name = canonical_unique_name(cube, config, &formula.name().segments);
            let kind = match formula.is_set() {
                true => CalculatedKind::Set,
                false => CalculatedKind::Member,
            };
            entries.insert(
                matcher.fold(&unique_name),
                CalculatedEntity { kind, unique_name },
            );
        }
        CalculatedRegistry { matcher, entries }
    }

    /// Look up a calculated entity by canonical unique name.
    pub fn lookup(&self, unique_name: &str) -> Option<&CalculatedEntity> {
        self.entries.get(&self.matcher.fold(unique_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the canonical unique name for a segment sequence.
///
/// The head is replaced by the canonical hierarchy unique name when it
/// matches a hierarchy of the cube, so `time.foo` and `[Time].[foo]` (and
/// both multi-hierarchy encodings) produce the same key. Heads matching no
/// hierarchy (e.g. named sets like `[*NATIVE_CJ_SET]`) keep their raw
/// segments.
pub(crate) fn canonical_unique_name(
    cube: &CubeMeta,
    config: &SessionConfig,
    segments: &[PathSegment],
) -> String {
    let matcher = config.name_matcher();

    let (mut out, consumed) =
        match match_hierarchy_head(cube, config.hierarchy_naming, matcher, segments) {
            Some((hierarchy, consumed)) => (hierarchy.unique_name.clone(), consumed),
            None => (String::new(), 0),
        };

    for segment in &segments[consumed..] {
        if !out.is_empty() {
            out.push('.');
        }
        match segment {
            PathSegment::Name { value, .. } => out.push_str(&quoted_segment(value)),
            PathSegment::Key(_) => out.push_str(&segment.to_string()),
        }
    }
    out
}
