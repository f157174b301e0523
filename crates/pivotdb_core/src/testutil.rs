//! Test fixtures. Not part of the public API.

use std::sync::Arc;

use crate::catalog::collation::quoted_segment;
use crate::catalog::cube::{CubeMeta, DimensionMeta, HierarchyMeta};
use crate::catalog::lookup::CatalogMemberLookup;
use crate::catalog::member::{Member, MemberRef};
use crate::config::session::{HierarchyNaming, SessionConfig};

fn member(hierarchy: &str, parent: Option<&MemberRef>, name: &str, is_all: bool) -> MemberRef {
    let unique_name = match parent {
        Some(parent) => parent.child_unique_name(name),
        None => format!("{hierarchy}.{}", quoted_segment(name)),
    };
    Arc::new(Member {
        name: name.to_string(),
        unique_name,
        hierarchy: hierarchy.to_string(),
        parent: parent.map(|p| p.unique_name.clone()),
        is_all,
    })
}

fn child(
    lookup: &mut CatalogMemberLookup,
    hierarchy: &str,
    parent: &MemberRef,
    name: &str,
) -> MemberRef {
    let member = member(hierarchy, Some(parent), name, false);
    lookup.insert(member.clone());
    member
}

/// Sample cube with the dimension shapes the resolver cares about: plain
/// single-hierarchy dimensions with an all-member, a multi-hierarchy time
/// dimension, hierarchies without an all-member (time, measures), a
/// parent-child hierarchy and a dimension holding a null member.
pub fn sales_cube(config: &SessionConfig) -> (CubeMeta, CatalogMemberLookup) {
    let mut lookup = CatalogMemberLookup::new(config.name_matcher());
    let mut dimensions = Vec::new();

    // Measures, no all-member; the measures are top-level members known from
    // metadata.
    {
        let uq = "[Measures]";
        let top = vec![
            member(uq, None, "Unit Sales", false),
            member(uq, None, "Store Sales", false),
        ];
        dimensions.push(DimensionMeta {
            name: "Measures".to_string(),
            hierarchies: vec![Arc::new(HierarchyMeta {
                name: "Measures".to_string(),
                dimension: "Measures".to_string(),
                unique_name: uq.to_string(),
                all_member: None,
                top_members: top,
            })],
        });
    }

    // Product, all-member, three levels.
    {
        let uq = "[Product]";
        let all = member(uq, None, "All Products", true);
        let food = child(&mut lookup, uq, &all, "Food");
        let drink = child(&mut lookup, uq, &all, "Drink");
        for name in ["Dairy", "Deli", "Eggs", "Produce", "Starchy Foods"] {
            child(&mut lookup, uq, &food, name);
        }
        child(&mut lookup, uq, &drink, "Beverages");
        dimensions.push(DimensionMeta {
            name: "Product".to_string(),
            hierarchies: vec![Arc::new(HierarchyMeta {
                name: "Product".to_string(),
                dimension: "Product".to_string(),
                unique_name: uq.to_string(),
                all_member: Some(all),
                top_members: Vec::new(),
            })],
        });
    }

    // Time, two hierarchies: the default one has no all-member and exposes
    // years as top-level members; the weekly one has an all-member.
    {
        let time_uq = "[Time]";
        let y1997 = member(time_uq, None, "1997", false);
        let y1998 = member(time_uq, None, "1998", false);
        for name in ["Q1", "Q2", "Q3", "Q4"] {
            child(&mut lookup, time_uq, &y1997, name);
        }

        let weekly_uq = match config.hierarchy_naming {
            HierarchyNaming::Compact => "[Time.Weekly]".to_string(),
            HierarchyNaming::Split => "[Time].[Weekly]".to_string(),
        };
        let weekly_all = member(&weekly_uq, None, "All Weeks", true);
        let weekly_1997 = child(&mut lookup, &weekly_uq, &weekly_all, "1997");
        child(&mut lookup, &weekly_uq, &weekly_all, "1998");
        for week in ["1", "2", "3", "4", "5", "6"] {
            child(&mut lookup, &weekly_uq, &weekly_1997, week);
        }

        dimensions.push(DimensionMeta {
            name: "Time".to_string(),
            hierarchies: vec![
                Arc::new(HierarchyMeta {
                    name: "Time".to_string(),
                    dimension: "Time".to_string(),
                    unique_name: time_uq.to_string(),
                    all_member: None,
                    top_members: vec![y1997, y1998],
                }),
                Arc::new(HierarchyMeta {
                    name: "Weekly".to_string(),
                    dimension: "Time".to_string(),
                    unique_name: weekly_uq,
                    all_member: Some(weekly_all),
                    top_members: Vec::new(),
                }),
            ],
        });
    }

    // Store, all-member, geography levels.
    {
        let uq = "[Store]";
        let all = member(uq, None, "All Stores", true);
        let usa = child(&mut lookup, uq, &all, "USA");
        let ca = child(&mut lookup, uq, &usa, "CA");
        let wa = child(&mut lookup, uq, &usa, "WA");
        for name in ["Beverly Hills", "Los Angeles"] {
            child(&mut lookup, uq, &ca, name);
        }
        for name in ["Bellingham", "Bremerton"] {
            child(&mut lookup, uq, &wa, name);
        }
        dimensions.push(DimensionMeta {
            name: "Store".to_string(),
            hierarchies: vec![Arc::new(HierarchyMeta {
                name: "Store".to_string(),
                dimension: "Store".to_string(),
                unique_name: uq.to_string(),
                all_member: Some(all),
                top_members: Vec::new(),
            })],
        });
    }

    // Promotions, all-member, one level.
    {
        let uq = "[Promotions]";
        let all = member(uq, None, "All Promotions", true);
        for name in [
            "Coupon Mania",
            "Dollar Days",
            "Free Sample Day",
            "Green Tag Sale",
            "Price Slash",
            "Two For One",
        ] {
            child(&mut lookup, uq, &all, name);
        }
        dimensions.push(DimensionMeta {
            name: "Promotions".to_string(),
            hierarchies: vec![Arc::new(HierarchyMeta {
                name: "Promotions".to_string(),
                dimension: "Promotions".to_string(),
                unique_name: uq.to_string(),
                all_member: Some(all),
                top_members: Vec::new(),
            })],
        });
    }

    // Store Size in SQFT, holds the configured null member as an ordinary
    // child.
    {
        let uq = "[Store Size in SQFT]";
        let all = member(uq, None, "All Store Sizes", true);
        child(&mut lookup, uq, &all, &config.null_member_name);
        for name in ["20319", "21215", "22478", "23598"] {
            child(&mut lookup, uq, &all, name);
        }
        dimensions.push(DimensionMeta {
            name: "Store Size in SQFT".to_string(),
            hierarchies: vec![Arc::new(HierarchyMeta {
                name: "Store Size in SQFT".to_string(),
                dimension: "Store Size in SQFT".to_string(),
                unique_name: uq.to_string(),
                all_member: Some(all),
                top_members: Vec::new(),
            })],
        });
    }

    // Employees, parent-child hierarchy. Grouping by immediate parent works
    // the same even though the backend cannot consolidate such lookups.
    {
        let uq = "[Employees]";
        let all = member(uq, None, "All Employees", true);
        let ada = child(&mut lookup, uq, &all, "Ada Tran");
        child(&mut lookup, uq, &ada, "Ben Ortiz");
        child(&mut lookup, uq, &ada, "Cara Shaw");
        dimensions.push(DimensionMeta {
            name: "Employees".to_string(),
            hierarchies: vec![Arc::new(HierarchyMeta {
                name: "Employees".to_string(),
                dimension: "Employees".to_string(),
                unique_name: uq.to_string(),
                all_member: Some(all),
                top_members: Vec::new(),
            })],
        });
    }

    // Gender, used as the hierarchy for calculated-member declarations.
    {
        let uq = "[Gender]";
        let all = member(uq, None, "All Gender", true);
        child(&mut lookup, uq, &all, "F");
        child(&mut lookup, uq, &all, "M");
        dimensions.push(DimensionMeta {
            name: "Gender".to_string(),
            hierarchies: vec![Arc::new(HierarchyMeta {
                name: "Gender".to_string(),
                dimension: "Gender".to_string(),
                unique_name: uq.to_string(),
                all_member: Some(all),
                top_members: Vec::new(),
            })],
        });
    }

    (
        CubeMeta {
            name: "Sales".to_string(),
            dimensions,
        },
        lookup,
    )
}
