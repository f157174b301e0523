use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use pivotdb_error::Result;
use serde::{Deserialize, Serialize};

use super::collation::NameMatcher;
use super::member::MemberRef;

/// Name-matching strictness requested for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMode {
    Exact,
    /// Closest preceding member when the exact name is absent.
    Before,
    /// Closest following member when the exact name is absent.
    After,
}

/// Gateway for resolving child members under a parent by name.
///
/// One call resolves a whole batch of sibling names. Names absent under the
/// parent are simply missing from the result; only backend failures are
/// errors. Implementations must be idempotent and safe for concurrent use.
pub trait MemberLookup: fmt::Debug + Send + Sync {
    fn lookup_children_by_names(
        &self,
        parent: &MemberRef,
        names: &[String],
        match_mode: MatchMode,
    ) -> Result<Vec<(String, MemberRef)>>;
}

impl<L: MemberLookup + ?Sized> MemberLookup for &L {
    fn lookup_children_by_names(
        &self,
        parent: &MemberRef,
        names: &[String],
        match_mode: MatchMode,
    ) -> Result<Vec<(String, MemberRef)>> {
        (**self).lookup_children_by_names(parent, names, match_mode)
    }
}

/// Member lookup serving from an in-memory member tree.
///
/// Children are indexed by the parent's unique name. This is the fixture
/// backend for tests and the reference for name-matching semantics; a
/// SQL-backed gateway would fan a batch out into its own storage queries.
#[derive(Debug)]
pub struct CatalogMemberLookup {
    matcher: NameMatcher,
    children: HashMap<String, Vec<MemberRef>>,
}

impl CatalogMemberLookup {
    pub fn new(matcher: NameMatcher) -> Self {
        CatalogMemberLookup {
            matcher,
            children: HashMap::new(),
        }
    }

    /// Register a member under its parent.
    pub fn insert(&mut self, member: MemberRef) {
        let parent = match &member.parent {
            Some(parent) => parent.clone(),
            // Parentless members are never the target of a child lookup.
            None => return,
        };
        self.children.entry(parent).or_default().push(member);
    }
}

impl MemberLookup for CatalogMemberLookup {
    fn lookup_children_by_names(
        &self,
        parent: &MemberRef,
        names: &[String],
        _match_mode: MatchMode,
    ) -> Result<Vec<(String, MemberRef)>> {
        // Approximate match modes degenerate to exact against a fully loaded
        // in-memory tree.
        let children = match self.children.get(&parent.unique_name) {
            Some(children) => children,
            None => return Ok(Vec::new()),
        };

        let mut out = Vec::new();
        for name in names {
            for child in children {
                if self.matcher.matches(&child.name, name) {
                    out.push((name.clone(), child.clone()));
                    break;
                }
            }
        }
        Ok(out)
    }
}

/// Caching wrapper around another lookup.
///
/// Cache entries are keyed by (parent identity, folded name, match mode) and
/// outlive individual resolve calls; repeated executions of an identical
/// query hit the cache instead of the inner gateway. Absent names are cached
/// too.
#[derive(Debug)]
pub struct CachingMemberLookup<L> {
    inner: L,
    matcher: NameMatcher,
    cache: Mutex<HashMap<(String, String, MatchMode), Option<MemberRef>>>,
}

impl<L> CachingMemberLookup<L> {
    pub fn new(inner: L, matcher: NameMatcher) -> Self {
        CachingMemberLookup {
            inner,
            matcher,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: MemberLookup> MemberLookup for CachingMemberLookup<L> {
    fn lookup_children_by_names(
        &self,
        parent: &MemberRef,
        names: &[String],
        match_mode: MatchMode,
    ) -> Result<Vec<(String, MemberRef)>> {
        let mut out = Vec::new();
        let mut misses = Vec::new();
        {
            let cache = self.cache.lock();
            for name in names {
                let key = (
                    parent.unique_name.clone(),
                    self.matcher.fold(name),
                    match_mode,
                );
                match cache.get(&key) {
                    Some(Some(member)) => out.push((name.clone(), member.clone())),
                    Some(None) => (),
                    None => misses.push(name.clone()),
                }
            }
        }

        if misses.is_empty() {
            return Ok(out);
        }

        let resolved = self
            .inner
            .lookup_children_by_names(parent, &misses, match_mode)?;

        let mut resolved_by_name: HashMap<String, MemberRef> = HashMap::new();
        for (name, member) in resolved {
            resolved_by_name.insert(self.matcher.fold(&name), member);
        }

        let mut cache = self.cache.lock();
        for name in misses {
            let folded = self.matcher.fold(&name);
            let member = resolved_by_name.get(&folded).cloned();
            cache.insert(
                (parent.unique_name.clone(), folded, match_mode),
                member.clone(),
            );
            if let Some(member) = member {
                out.push((name, member));
            }
        }

        Ok(out)
    }
}

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub parent: String,
    pub names: Vec<String>,
    pub match_mode: MatchMode,
}

impl RecordedCall {
    /// The batched names in sorted order, for order-insensitive assertions.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names = self.names.clone();
        names.sort();
        names
    }
}

/// Test double recording every call before delegating to the inner lookup.
///
/// Batching behavior is verified by inspecting the recorded calls; no
/// production hook is needed.
#[derive(Debug)]
pub struct RecordingMemberLookup<L> {
    inner: L,
    calls: Mutex<Vec<RecordedCall>>,
}

impl<L> RecordingMemberLookup<L> {
    pub fn new(inner: L) -> Self {
        RecordingMemberLookup {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<L: MemberLookup> MemberLookup for RecordingMemberLookup<L> {
    fn lookup_children_by_names(
        &self,
        parent: &MemberRef,
        names: &[String],
        match_mode: MatchMode,
    ) -> Result<Vec<(String, MemberRef)>> {
        self.calls.lock().push(RecordedCall {
            parent: parent.unique_name.clone(),
            names: names.to_vec(),
            match_mode,
        });
        self.inner.lookup_children_by_names(parent, names, match_mode)
    }
}
