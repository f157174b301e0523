//! Normalization of a path head into a hierarchy and resolution anchor.
//!
//! Both encodings of a multi-hierarchy member path must land on the same
//! anchor object so sibling paths entered under either encoding share a
//! batch.

use std::sync::Arc;

use pivotdb_parser::ast::PathSegment;

use crate::catalog::collation::NameMatcher;
use crate::catalog::cube::{CubeMeta, HierarchyMeta};
use crate::catalog::member::MemberRef;
use crate::config::session::{HierarchyNaming, SessionConfig};

/// Result of normalizing the head of a path.
#[derive(Debug, Clone)]
pub struct NormalizedHead {
    pub hierarchy: Arc<HierarchyMeta>,
    /// The member resolution starts from: the hierarchy's all-member, or the
    /// top-level member named by the first literal segment when the
    /// hierarchy has no all-member.
    pub anchor: MemberRef,
    /// Number of leading segments consumed, including the top-level member
    /// segment in the no-all-member case.
    pub consumed: usize,
}

/// Match the leading segments of a path to a hierarchy of the cube.
///
/// Returns the hierarchy and the number of segments consumed by the root
/// reference. `None` for an unrecognized root.
pub(crate) fn match_hierarchy_head<'a>(
    cube: &'a CubeMeta,
    naming: HierarchyNaming,
    matcher: NameMatcher,
    segments: &[PathSegment],
) -> Option<(&'a Arc<HierarchyMeta>, usize)> {
    let head = segments.first()?.name()?;

    match naming {
        HierarchyNaming::Compact => {
            // The whole (possibly dotted) segment names the hierarchy.
            for dimension in &cube.dimensions {
                for hierarchy in &dimension.hierarchies {
                    let qualified = if matcher.matches(&hierarchy.name, &dimension.name) {
                        dimension.name.clone()
                    } else {
                        format!("{}.{}", dimension.name, hierarchy.name)
                    };
                    if matcher.matches(&qualified, head) {
                        return Some((hierarchy, 1));
                    }
                }
            }
            None
        }
        HierarchyNaming::Split => {
            let dimension = cube.dimension(matcher, head)?;

            if let Some(second) = segments.get(1).and_then(|s| s.name()) {
                let named = dimension
                    .hierarchies
                    .iter()
                    .find(|h| {
                        matcher.matches(&h.name, second)
                            && !matcher.matches(&h.name, &dimension.name)
                    });
                if let Some(hierarchy) = named {
                    return Some((hierarchy, 2));
                }
            }

            dimension.default_hierarchy(matcher).map(|h| (h, 1))
        }
    }
}

/// Normalize the head of a path into a hierarchy and anchor.
///
/// `None` means the root was unrecognized, or the hierarchy has no
/// all-member and the first literal segment names no top-level member; the
/// path is abandoned either way.
pub fn normalize_head(
    cube: &CubeMeta,
    config: &SessionConfig,
    matcher: NameMatcher,
    segments: &[PathSegment],
) -> Option<NormalizedHead> {
    let (hierarchy, consumed) =
        match_hierarchy_head(cube, config.hierarchy_naming, matcher, segments)?;

    if let Some(all) = &hierarchy.all_member {
        return Some(NormalizedHead {
            hierarchy: hierarchy.clone(),
            anchor: all.clone(),
            consumed,
        });
    }

    // No all-member: the next literal segment is itself a top-level member,
    // resolvable from metadata without a gateway call.
    let next = segments.get(consumed)?.name()?;
    let anchor = hierarchy.top_member(matcher, next)?;
    Some(NormalizedHead {
        hierarchy: hierarchy.clone(),
        anchor,
        consumed: consumed + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::session::HierarchyNaming;
    use crate::testutil::sales_cube;

    fn segments(names: &[&str]) -> Vec<PathSegment> {
        names.iter().map(|n| PathSegment::quoted(*n)).collect()
    }

    #[test]
    fn compact_naming_single_hierarchy() {
        let config = SessionConfig::default();
        let (cube, _) = sales_cube(&config);
        let matcher = config.name_matcher();

        let head =
            normalize_head(&cube, &config, matcher, &segments(&["Product", "Food"])).unwrap();
        assert_eq!("[Product]", head.hierarchy.unique_name);
        assert_eq!("[Product].[All Products]", head.anchor.unique_name);
        assert_eq!(1, head.consumed);
    }

    #[test]
    fn compact_naming_dotted_hierarchy() {
        let config = SessionConfig::default();
        let (cube, _) = sales_cube(&config);
        let matcher = config.name_matcher();

        let head =
            normalize_head(&cube, &config, matcher, &segments(&["Time.Weekly", "1997"])).unwrap();
        assert_eq!("[Time.Weekly]", head.hierarchy.unique_name);
        assert_eq!("[Time.Weekly].[All Weeks]", head.anchor.unique_name);
        assert_eq!(1, head.consumed);
    }

    #[test]
    fn split_naming_consumes_two_segments() {
        let config = SessionConfig {
            hierarchy_naming: HierarchyNaming::Split,
            ..SessionConfig::default()
        };
        let (cube, _) = sales_cube(&config);
        let matcher = config.name_matcher();

        let head = normalize_head(
            &cube,
            &config,
            matcher,
            &segments(&["Time", "Weekly", "1997"]),
        )
        .unwrap();
        assert_eq!("[Time].[Weekly]", head.hierarchy.unique_name);
        assert_eq!("[Time].[Weekly].[All Weeks]", head.anchor.unique_name);
        assert_eq!(2, head.consumed);
    }

    #[test]
    fn no_all_member_resolves_top_member() {
        let config = SessionConfig::default();
        let (cube, _) = sales_cube(&config);
        let matcher = config.name_matcher();

        // [Time] has no all-member; [1997] is a top-level member consumed as
        // part of the head.
        let head =
            normalize_head(&cube, &config, matcher, &segments(&["Time", "1997", "Q1"])).unwrap();
        assert_eq!("[Time].[1997]", head.anchor.unique_name);
        assert_eq!(2, head.consumed);

        // Unknown top-level member: no anchor.
        assert!(normalize_head(&cube, &config, matcher, &segments(&["Time", "foo"])).is_none());
    }

    #[test]
    fn unrecognized_root() {
        let config = SessionConfig::default();
        let (cube, _) = sales_cube(&config);
        let matcher = config.name_matcher();

        assert!(
            normalize_head(&cube, &config, matcher, &segments(&["*NATIVE_CJ_SET"])).is_none()
        );
    }

    #[test]
    fn measures_resolve_from_metadata() {
        let config = SessionConfig::default();
        let (cube, _) = sales_cube(&config);
        let matcher = config.name_matcher();

        let head = normalize_head(
            &cube,
            &config,
            matcher,
            &segments(&["Measures", "Unit Sales"]),
        )
        .unwrap();
        assert_eq!("[Measures].[Unit Sales]", head.anchor.unique_name);
        assert_eq!(2, head.consumed);
    }
}
