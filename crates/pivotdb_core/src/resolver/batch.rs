//! Round scheduling and batched lookups.
//!
//! Each round partitions the pending resolution contexts by their resolved
//! parent and issues one gateway call per partition. Rounds repeat until
//! every context is resolved or abandoned; the depth of the deepest path
//! bounds the number of rounds. Batch sets are rebuilt fresh each round from
//! the previous round's survivors.

use std::collections::{BTreeMap, HashMap, HashSet};

use pivotdb_error::Result;
use pivotdb_parser::ast::PathExpr;
use tracing::{debug, trace};

use super::calculated::{CalculatedRegistry, canonical_unique_name};
use super::normalize::normalize_head;
use super::{ResolvedMemberMap, Resolver};
use crate::catalog::collation::NameMatcher;
use crate::catalog::lookup::MatchMode;
use crate::catalog::member::MemberRef;

/// Per-path cursor over the remaining unresolved segments.
#[derive(Debug)]
struct ResolutionContext<'a> {
    path: &'a PathExpr,
    /// Currently resolved parent member.
    parent: MemberRef,
    /// Index of the next unresolved segment.
    next: usize,
}

/// Sibling lookups waiting on one parent.
#[derive(Debug)]
struct Batch<'a> {
    parent: MemberRef,
    /// Distinct pending child names, first-seen order.
    names: Vec<String>,
    seen: HashSet<String>,
    contexts: Vec<ResolutionContext<'a>>,
}

impl<'a> Batch<'a> {
    fn new(parent: MemberRef) -> Self {
        Batch {
            parent,
            names: Vec::new(),
            seen: HashSet::new(),
            contexts: Vec::new(),
        }
    }

    fn push(&mut self, matcher: NameMatcher, name: &str, ctx: ResolutionContext<'a>) {
        if self.seen.insert(matcher.fold(name)) {
            self.names.push(name.to_string());
        }
        self.contexts.push(ctx);
    }
}

impl Resolver<'_> {
    pub(crate) fn resolve_rounds(
        &self,
        paths: Vec<&PathExpr>,
        registry: &CalculatedRegistry,
    ) -> Result<ResolvedMemberMap> {
        let matcher = self.config.name_matcher();
        let mut resolved = ResolvedMemberMap::default();
        let mut pending = Vec::new();

        // Round 0: anchor every path.
        'paths: for path in paths {
            // A path whose prefix names a calculated member or set resolves
            // from the query's own formulas: an exact match needs no catalog
            // call, and a longer path is abandoned since calculated entities
            // have no children to descend into. Neither lands in the map.
            if !registry.is_empty() {
                for len in 1..=path.segments.len() {
                    let unique =
                        canonical_unique_name(self.cube, self.config, &path.segments[..len]);
                    if registry.lookup(&unique).is_some() {
                        trace!(%path, "calculated reference, not batched");
                        continue 'paths;
                    }
                }
            }

            // Key segments are left to the authoritative binder.
            if path.segments.iter().any(|s| s.name().is_none()) {
                continue;
            }

            let head = match normalize_head(self.cube, self.config, matcher, &path.segments) {
                Some(head) => head,
                None => {
                    trace!(%path, "no anchor, abandoning path");
                    continue;
                }
            };

            if head.consumed == path.segments.len() {
                resolved.insert(path.id, head.anchor);
            } else {
                pending.push(ResolutionContext {
                    path,
                    parent: head.anchor,
                    next: head.consumed,
                });
            }
        }

        // Round k: one batched gateway call per distinct parent. Batches are
        // issued in sorted parent order so identical queries produce an
        // identical call sequence.
        let mut round = 0usize;
        while !pending.is_empty() {
            round += 1;
            debug!(round, pending = pending.len(), "resolving round");

            let mut batches: BTreeMap<String, Batch> = BTreeMap::new();
            for ctx in pending.drain(..) {
                let name = ctx.path.segments[ctx.next]
                    .name()
                    .expect("key segments filtered in round 0");

                // Calculated names shadow physical children.
                if registry
                    .lookup(&ctx.parent.child_unique_name(name))
                    .is_some()
                {
                    trace!(path = %ctx.path, "calculated reference, not batched");
                    continue;
                }

                let parent = ctx.parent.clone();
                batches
                    .entry(parent.unique_name.clone())
                    .or_insert_with(|| Batch::new(parent))
                    .push(matcher, name, ctx);
            }

            let mut requeued = Vec::new();
            for batch in batches.into_values() {
                trace!(
                    parent = %batch.parent,
                    names = batch.names.len(),
                    contexts = batch.contexts.len(),
                    "batched child lookup"
                );
                let children = self.lookup.lookup_children_by_names(
                    &batch.parent,
                    &batch.names,
                    MatchMode::Exact,
                )?;

                let mut by_name: HashMap<String, MemberRef> =
                    HashMap::with_capacity(children.len());
                for (name, member) in children {
                    by_name.insert(matcher.fold(&name), member);
                }

                for ctx in batch.contexts {
                    let name = ctx.path.segments[ctx.next].name().expect("name segment");
                    match by_name.get(&matcher.fold(name)) {
                        Some(member) => {
                            if ctx.next + 1 == ctx.path.segments.len() {
                                resolved.insert(ctx.path.id, member.clone());
                            } else {
                                requeued.push(ResolutionContext {
                                    path: ctx.path,
                                    parent: member.clone(),
                                    next: ctx.next + 1,
                                });
                            }
                        }
                        // Absence is a normal non-match, never an error.
                        None => trace!(path = %ctx.path, "child not found, abandoning path"),
                    }
                }
            }

            pending = requeued;
        }

        debug!(resolved = resolved.len(), rounds = round, "resolution done");
        Ok(resolved)
    }
}
