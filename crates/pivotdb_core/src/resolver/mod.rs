//! Batched identifier resolution.
//!
//! A best-effort pre-pass over a parsed statement that resolves member paths
//! against the catalog before authoritative binding. Sibling paths sharing a
//! resolution parent are grouped and resolved with one gateway call per
//! round of depth, so an enumeration of N siblings costs one call instead of
//! N.
//!
//! A path this pass cannot resolve is simply absent from the output; the
//! downstream binder re-resolves it and raises any user-facing error.

pub mod calculated;
pub mod collect;
pub mod normalize;

mod batch;

use std::collections::HashMap;

use pivotdb_error::Result;
use pivotdb_parser::ast::{PathId, SelectStatement};
use tracing::debug;

use crate::catalog::cube::CubeMeta;
use crate::catalog::lookup::MemberLookup;
use crate::catalog::member::MemberRef;
use crate::config::session::SessionConfig;
use crate::functions::FunctionTable;
use calculated::CalculatedRegistry;
use collect::collect_member_paths;

/// Map from path node identity to resolved member.
///
/// Every entry is correct; completeness is not guaranteed. Never contains an
/// entry for a calculated member or set use.
#[derive(Debug, Default)]
pub struct ResolvedMemberMap {
    entries: HashMap<PathId, MemberRef>,
}

impl ResolvedMemberMap {
    pub fn get(&self, id: PathId) -> Option<&MemberRef> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: PathId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PathId, &MemberRef)> {
        self.entries.iter().map(|(id, member)| (*id, member))
    }

    pub(crate) fn insert(&mut self, id: PathId, member: MemberRef) {
        self.entries.insert(id, member);
    }
}

/// The batched identifier resolver.
#[derive(Debug)]
pub struct Resolver<'a> {
    pub(crate) cube: &'a CubeMeta,
    pub(crate) config: &'a SessionConfig,
    pub(crate) functions: &'a FunctionTable,
    pub(crate) lookup: &'a dyn MemberLookup,
}

impl<'a> Resolver<'a> {
    pub fn new(
        cube: &'a CubeMeta,
        config: &'a SessionConfig,
        functions: &'a FunctionTable,
        lookup: &'a dyn MemberLookup,
    ) -> Self {
        Resolver {
            cube,
            config,
            functions,
            lookup,
        }
    }

    /// Resolve every member path in the statement that can be resolved with
    /// batched catalog lookups.
    ///
    /// Runs synchronously to completion; all state is local to the call. A
    /// gateway failure aborts the whole call with an error and no partial
    /// map is returned.
    pub fn resolve(&self, statement: &SelectStatement) -> Result<ResolvedMemberMap> {
        let registry = CalculatedRegistry::from_formulas(self.cube, self.config, &statement.formulas);
        let paths = collect_member_paths(statement, self.functions);
        debug!(
            paths = paths.len(),
            calculated = registry.len(),
            "collected member paths"
        );
        self.resolve_rounds(paths, &registry)
    }
}
