//! Batching behavior of the identifier resolver, verified against a
//! recording gateway over the fixture cube.

use std::collections::HashSet;

use pivotdb_core::catalog::lookup::{
    CachingMemberLookup, MatchMode, MemberLookup, RecordedCall, RecordingMemberLookup,
};
use pivotdb_core::catalog::member::MemberRef;
use pivotdb_core::config::session::{HierarchyNaming, SessionConfig};
use pivotdb_core::functions::FunctionTable;
use pivotdb_core::resolver::collect::collect_member_paths;
use pivotdb_core::resolver::{ResolvedMemberMap, Resolver};
use pivotdb_core::testutil::sales_cube;
use pivotdb_error::{DbError, Result};
use pivotdb_parser::ast::SelectStatement;

fn run(config: &SessionConfig, query: &str) -> (HashSet<String>, Vec<RecordedCall>) {
    logutil::init_test();
    let (cube, lookup) = sales_cube(config);
    let recording = RecordingMemberLookup::new(lookup);
    let statement = pivotdb_parser::parse(query).unwrap();
    let functions = FunctionTable::builtin();

    let resolver = Resolver::new(&cube, config, functions, &recording);
    let map = resolver.resolve(&statement).unwrap();

    (resolved_names(&statement, &map), recording.calls())
}

/// Render the canonical form of every collected path that landed in the map.
fn resolved_names(statement: &SelectStatement, map: &ResolvedMemberMap) -> HashSet<String> {
    collect_member_paths(statement, FunctionTable::builtin())
        .into_iter()
        .filter(|p| map.contains(p.id))
        .map(|p| p.to_string())
        .collect()
}

/// The resolved set is a superset of the expected names; extra entries are
/// legitimate.
fn assert_contains(names: &HashSet<String>, expected: &[&str]) {
    for name in expected {
        assert!(
            names.contains(*name),
            "resolved map omitted {name}, got {names:?}"
        );
    }
}

#[test]
fn simple_enum_batches_siblings() {
    let (names, calls) = run(
        &SessionConfig::default(),
        "SELECT \
         {[Product].[Food].[Dairy],\
         [Product].[Food].[Deli],\
         [Product].[Food].[Eggs],\
         [Product].[Food].[Produce],\
         [Product].[Food].[Starchy Foods]}\
         on 0 FROM SALES",
    );

    assert_contains(
        &names,
        &[
            "[Product].[Food].[Dairy]",
            "[Product].[Food].[Deli]",
            "[Product].[Food].[Eggs]",
            "[Product].[Food].[Produce]",
            "[Product].[Food].[Starchy Foods]",
        ],
    );

    assert_eq!(2, calls.len());
    assert_eq!("[Product].[All Products]", calls[0].parent);
    assert_eq!(vec!["Food".to_string()], calls[0].names);
    assert_eq!("[Product].[Food]", calls[1].parent);
    assert_eq!(
        vec!["Dairy", "Deli", "Eggs", "Produce", "Starchy Foods"],
        calls[1].sorted_names(),
    );
    assert!(calls.iter().all(|c| c.match_mode == MatchMode::Exact));
}

#[test]
fn calc_members_not_resolved() {
    let (names, _) = run(
        &SessionConfig::default(),
        "with member time.foo as '1' member time.bar as '2' \
         select \
         {[Time].[foo], [Time].[bar], \
          [Time].[1997],\
          [Time].[1997].[Q1], [Time].[1997].[Q2]} \
         on 0 from sales",
    );

    assert!(!names.contains("[Time].[foo]"));
    assert!(!names.contains("[Time].[bar]"));
}

#[test]
fn physical_members_resolve_when_calcs_mixed_in() {
    let (names, calls) = run(
        &SessionConfig::default(),
        "with member time.foo as '1' member time.bar as '2' \
         select \
         {[Time].[foo], [Time].[bar], \
          [Time].[1997],\
          [Time].[1997].[Q1], [Time].[1997].[Q2]} \
         on 0 from sales",
    );

    assert_contains(
        &names,
        &["[Time].[1997]", "[Time].[1997].[Q1]", "[Time].[1997].[Q2]"],
    );

    // The year resolves from metadata and the calcs from the formula list;
    // one batch remains for the two quarters.
    assert_eq!(1, calls.len());
    assert_eq!("[Time].[1997]", calls[0].parent);
    assert_eq!(vec!["Q1", "Q2"], calls[0].sorted_names());
}

#[test]
fn level_reference_not_batched() {
    // [Time.Weekly].Week names a level and must not be batched as a child of
    // the weekly all-member.
    let (names, calls) = run(
        &SessionConfig::default(),
        "with member Gender.levelRef as \
         'Sum(Descendants([Time.Weekly].CurrentMember, [Time.Weekly].Week))' \
         select Gender.levelRef on 0 from sales where [Time.Weekly].[1997]",
    );

    assert_contains(&names, &["[Time.Weekly].[1997]"]);
    assert_eq!(1, calls.len());
    assert_eq!("[Time.Weekly].[All Weeks]", calls[0].parent);
    assert_eq!(vec!["1997".to_string()], calls[0].names);
}

fn weekly_query(naming: HierarchyNaming) -> String {
    let (hierarchy, prefix) = match naming {
        HierarchyNaming::Compact => ("[Time.Weekly]", "[Time.Weekly]"),
        HierarchyNaming::Split => ("[Time].[Weekly]", "[Time].[Weekly]"),
    };
    format!(
        "WITH\n\
         SET [*NATIVE_CJ_SET] AS 'FILTER([*BASE_MEMBERS__Time.Weekly_], NOT ISEMPTY ([Measures].[Unit Sales]))'\n\
         SET [*BASE_MEMBERS__Time.Weekly_] AS '{{{prefix}.[1997].[4],{prefix}.[1997].[5],{prefix}.[1997].[6]}}'\n\
         SET [*BASE_MEMBERS__Measures_] AS '{{[Measures].[Unit Sales]}}'\n\
         SET [*CJ_SLICER_AXIS] AS 'GENERATE([*NATIVE_CJ_SET], {{({hierarchy}.CURRENTMEMBER)}})'\n\
         SELECT\n\
         [*BASE_MEMBERS__Measures_] ON COLUMNS\n\
         FROM [Sales]\n\
         WHERE ([*CJ_SLICER_AXIS])"
    )
}

#[test]
fn multi_hierarchy_compact_naming() {
    let config = SessionConfig::default();
    let (names, calls) = run(&config, &weekly_query(HierarchyNaming::Compact));

    assert_contains(
        &names,
        &[
            "[Time.Weekly].[1997].[4]",
            "[Time.Weekly].[1997].[5]",
            "[Time.Weekly].[1997].[6]",
        ],
    );

    assert_eq!(2, calls.len());
    assert_eq!("[Time.Weekly].[All Weeks]", calls[0].parent);
    assert_eq!(vec!["1997".to_string()], calls[0].names);
    assert_eq!(vec!["4", "5", "6"], calls[1].sorted_names());
}

#[test]
fn multi_hierarchy_split_naming() {
    let config = SessionConfig {
        hierarchy_naming: HierarchyNaming::Split,
        ..SessionConfig::default()
    };
    let (names, calls) = run(&config, &weekly_query(HierarchyNaming::Split));

    assert_contains(
        &names,
        &[
            "[Time].[Weekly].[1997].[4]",
            "[Time].[Weekly].[1997].[5]",
            "[Time].[Weekly].[1997].[6]",
        ],
    );

    // Same anchor, same batches, regardless of encoding.
    assert_eq!(2, calls.len());
    assert_eq!("[Time].[Weekly].[All Weeks]", calls[0].parent);
    assert_eq!(vec!["1997".to_string()], calls[0].names);
    assert_eq!(vec!["4", "5", "6"], calls[1].sorted_names());
}

#[test]
fn parent_child_hierarchy_grouped_by_parent() {
    // Parent-child resolution cannot be consolidated into one storage query
    // by the backend, but grouping by immediate parent works the same.
    let (names, calls) = run(
        &SessionConfig::default(),
        "SELECT \
         {[Employees].[Ada Tran].[Ben Ortiz],\
         [Employees].[Ada Tran].[Cara Shaw]}\
         on 0 FROM SALES",
    );

    assert_contains(
        &names,
        &[
            "[Employees].[Ada Tran].[Ben Ortiz]",
            "[Employees].[Ada Tran].[Cara Shaw]",
        ],
    );

    assert_eq!(2, calls.len());
    assert_eq!("[Employees].[All Employees]", calls[0].parent);
    assert_eq!(vec!["Ada Tran".to_string()], calls[0].names);
    assert_eq!("[Employees].[Ada Tran]", calls[1].parent);
    assert_eq!(vec!["Ben Ortiz", "Cara Shaw"], calls[1].sorted_names());
}

#[test]
fn null_member_resolves_like_any_name() {
    let (names, calls) = run(
        &SessionConfig::default(),
        "SELECT \
         {[Store Size in SQFT].[#null],\
         [Store Size in SQFT].[20319],\
         [Store Size in SQFT].[21215],\
         [Store Size in SQFT].[22478],\
         [Store Size in SQFT].[23598]}\
         on 0 FROM SALES",
    );

    assert_contains(
        &names,
        &[
            "[Store Size in SQFT].[#null]",
            "[Store Size in SQFT].[20319]",
            "[Store Size in SQFT].[21215]",
            "[Store Size in SQFT].[22478]",
            "[Store Size in SQFT].[23598]",
        ],
    );

    assert_eq!(1, calls.len());
    assert_eq!("[Store Size in SQFT].[All Store Sizes]", calls[0].parent);
    assert_eq!(
        vec!["#null", "20319", "21215", "22478", "23598"],
        calls[0].sorted_names(),
    );
}

#[test]
fn mixed_dimensions_deterministic_call_order() {
    let (names, calls) = run(
        &SessionConfig::default(),
        "WITH\n\
         SET [*NATIVE_CJ_SET] AS 'NONEMPTYCROSSJOIN([*BASE_MEMBERS__Promotions_],[*BASE_MEMBERS__Store_])'\n\
         SET [*BASE_MEMBERS__Store_] AS '{[Store].[USA].[WA].[Bellingham],[Store].[USA].[CA].[Beverly Hills],[Store].[USA].[WA].[Bremerton],[Store].[USA].[CA].[Los Angeles]}'\n\
         SET [*SORTED_COL_AXIS] AS 'ORDER([*CJ_COL_AXIS],[Promotions].CURRENTMEMBER.ORDERKEY,BASC)'\n\
         SET [*BASE_MEMBERS__Measures_] AS '{[Measures].[*FORMATTED_MEASURE_0]}'\n\
         SET [*CJ_ROW_AXIS] AS 'GENERATE([*NATIVE_CJ_SET], {([Store].CURRENTMEMBER)})'\n\
         SET [*BASE_MEMBERS__Promotions_] AS '{[Promotions].[Coupon Mania],[Promotions].[Dollar Days],[Promotions].[Free Sample Day],[Promotions].[Green Tag Sale],[Promotions].[Price Slash],[Promotions].[Two For One]}'\n\
         SET [*SORTED_ROW_AXIS] AS 'ORDER([*CJ_ROW_AXIS],[Store].CURRENTMEMBER.ORDERKEY,BASC,ANCESTOR([Store].CURRENTMEMBER,[Store].[Store State]).ORDERKEY,BASC)'\n\
         SET [*CJ_COL_AXIS] AS 'GENERATE([*NATIVE_CJ_SET], {([Promotions].CURRENTMEMBER)})'\n\
         MEMBER [Measures].[*FORMATTED_MEASURE_0] AS '[Measures].[Unit Sales]', FORMAT_STRING = 'Standard', SOLVE_ORDER=500\n\
         SELECT\n\
         CROSSJOIN([*SORTED_COL_AXIS],[*BASE_MEMBERS__Measures_]) ON COLUMNS\n\
         ,NON EMPTY\n\
         [*SORTED_ROW_AXIS] ON ROWS\n\
         FROM [Sales]",
    );

    assert_contains(
        &names,
        &[
            "[Store].[USA].[WA].[Bellingham]",
            "[Store].[USA].[CA].[Beverly Hills]",
            "[Store].[USA].[WA].[Bremerton]",
            "[Store].[USA].[CA].[Los Angeles]",
            "[Promotions].[Coupon Mania]",
            "[Promotions].[Dollar Days]",
            "[Promotions].[Free Sample Day]",
            "[Promotions].[Green Tag Sale]",
            "[Promotions].[Price Slash]",
            "[Promotions].[Two For One]",
        ],
    );

    // Batches issue in sorted parent order within each round, so the call
    // sequence is stable across runs.
    assert_eq!(5, calls.len());

    assert_eq!("[Promotions].[All Promotions]", calls[0].parent);
    assert_eq!(6, calls[0].names.len());
    assert_eq!(
        vec![
            "Coupon Mania",
            "Dollar Days",
            "Free Sample Day",
            "Green Tag Sale",
            "Price Slash",
            "Two For One",
        ],
        calls[0].sorted_names(),
    );

    // The level argument of ANCESTOR is excluded, so the all-stores batch
    // holds exactly the country name.
    assert_eq!("[Store].[All Stores]", calls[1].parent);
    assert_eq!(vec!["USA".to_string()], calls[1].names);

    assert_eq!("[Store].[USA]", calls[2].parent);
    assert_eq!(vec!["CA", "WA"], calls[2].sorted_names());

    assert_eq!("[Store].[USA].[CA]", calls[3].parent);
    assert_eq!(vec!["Beverly Hills", "Los Angeles"], calls[3].sorted_names());

    assert_eq!("[Store].[USA].[WA]", calls[4].parent);
    assert_eq!(vec!["Bellingham", "Bremerton"], calls[4].sorted_names());
}

#[test]
fn bare_hierarchy_path_resolves_to_all_member() {
    let (names, calls) = run(
        &SessionConfig::default(),
        "SELECT {[Promotions]} on 0 FROM SALES",
    );

    assert_contains(&names, &["[Promotions]"]);
    assert!(calls.is_empty());
}

#[test]
fn duplicate_sibling_names_collapse_in_batch() {
    let (names, calls) = run(
        &SessionConfig::default(),
        "SELECT {[Product].[Food].[Dairy]} on 0 FROM SALES \
         WHERE ([Product].[Food].[Dairy])",
    );

    // Both occurrences resolve, sharing one lookup entry per round.
    assert_contains(&names, &["[Product].[Food].[Dairy]"]);
    assert_eq!(2, calls.len());
    assert_eq!(vec!["Food".to_string()], calls[0].names);
    assert_eq!(vec!["Dairy".to_string()], calls[1].names);
}

#[test]
fn repeated_query_hits_gateway_cache() {
    let config = SessionConfig::default();
    let (cube, lookup) = sales_cube(&config);
    let recording = RecordingMemberLookup::new(lookup);
    let caching = CachingMemberLookup::new(&recording, config.name_matcher());
    let functions = FunctionTable::builtin();

    let query = "SELECT \
                 {[Product].[Food].[Dairy],\
                 [Product].[Food].[Deli],\
                 [Product].[Food].[Eggs]}\
                 on 0 FROM SALES";

    let statement = pivotdb_parser::parse(query).unwrap();
    let map = Resolver::new(&cube, &config, functions, &caching)
        .resolve(&statement)
        .unwrap();
    assert_eq!(3, map.len());
    let calls_after_first = recording.call_count();

    // Structurally identical query, fresh resolver state: the grouping is
    // stable, so every key hits the gateway's cache.
    let statement = pivotdb_parser::parse(query).unwrap();
    let map = Resolver::new(&cube, &config, functions, &caching)
        .resolve(&statement)
        .unwrap();
    assert_eq!(3, map.len());

    assert_eq!(calls_after_first, recording.call_count());
}

#[derive(Debug)]
struct FailingLookup;

impl MemberLookup for FailingLookup {
    fn lookup_children_by_names(
        &self,
        _parent: &MemberRef,
        _names: &[String],
        _match_mode: MatchMode,
    ) -> Result<Vec<(String, MemberRef)>> {
        Err(DbError::new("member store unavailable"))
    }
}

#[test]
fn gateway_failure_aborts_resolution() {
    let config = SessionConfig::default();
    let (cube, _) = sales_cube(&config);
    let statement =
        pivotdb_parser::parse("SELECT {[Product].[Food].[Dairy]} on 0 FROM SALES").unwrap();

    let lookup = FailingLookup;
    let resolver = Resolver::new(&cube, &config, FunctionTable::builtin(), &lookup);
    let err = resolver.resolve(&statement).unwrap_err();
    assert!(err.to_string().contains("unavailable"));
}

#[test]
fn key_segments_left_to_binder() {
    let (names, calls) = run(
        &SessionConfig::default(),
        "SELECT {[Time].&[1997]} on 0 FROM SALES",
    );
    assert!(names.is_empty());
    assert!(calls.is_empty());
}
