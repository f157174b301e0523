//! Function and property signature metadata.
//!
//! The identifier collector decides whether a path in a function argument
//! position is a member reference by looking the position up here, rather
//! than by inspecting the shape of the path.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Kind of value a function argument position or property base expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Member,
    MemberSet,
    Level,
    Hierarchy,
    Dimension,
    /// A scalar value; member paths here are cell references.
    Value,
    /// A boolean condition.
    Logical,
    /// A bare flag such as a sort direction.
    Symbol,
}

impl ArgKind {
    /// Whether a path in this position denotes a member (and should be
    /// collected for resolution).
    pub fn is_member_position(&self) -> bool {
        matches!(
            self,
            ArgKind::Member | ArgKind::MemberSet | ArgKind::Value | ArgKind::Logical
        )
    }
}

#[derive(Debug)]
pub struct FunctionSignature {
    pub name: &'static str,
    pub args: &'static [ArgKind],
    /// Kind of arguments beyond `args`, for variadic functions.
    pub rest: Option<ArgKind>,
}

impl FunctionSignature {
    pub fn arg_kind(&self, idx: usize) -> Option<ArgKind> {
        self.args.get(idx).copied().or(self.rest)
    }
}

#[derive(Debug)]
pub struct PropertySignature {
    pub name: &'static str,
    /// Kind of the expression the property is applied to.
    pub base: ArgKind,
}

use ArgKind::*;

#[rustfmt::skip]
const BUILTIN_FUNCTIONS: &[FunctionSignature] = &[
    FunctionSignature { name: "AGGREGATE",         args: &[MemberSet],               rest: Some(Value) },
    FunctionSignature { name: "ANCESTOR",          args: &[Member, Level],           rest: None },
    FunctionSignature { name: "AVG",               args: &[MemberSet],               rest: Some(Value) },
    FunctionSignature { name: "BOTTOMCOUNT",       args: &[MemberSet, Value],        rest: Some(Value) },
    FunctionSignature { name: "COUNT",             args: &[MemberSet],               rest: Some(Symbol) },
    FunctionSignature { name: "CROSSJOIN",         args: &[MemberSet, MemberSet],    rest: Some(MemberSet) },
    FunctionSignature { name: "DESCENDANTS",       args: &[Member, Level],           rest: Some(Symbol) },
    FunctionSignature { name: "DISTINCT",          args: &[MemberSet],               rest: None },
    FunctionSignature { name: "EXCEPT",            args: &[MemberSet, MemberSet],    rest: None },
    FunctionSignature { name: "FILTER",            args: &[MemberSet, Logical],      rest: None },
    FunctionSignature { name: "GENERATE",          args: &[MemberSet, MemberSet],    rest: Some(Symbol) },
    FunctionSignature { name: "HEAD",              args: &[MemberSet],               rest: Some(Value) },
    FunctionSignature { name: "HIERARCHIZE",       args: &[MemberSet],               rest: Some(Symbol) },
    FunctionSignature { name: "IIF",               args: &[Logical, Value, Value],   rest: None },
    FunctionSignature { name: "INTERSECT",         args: &[MemberSet, MemberSet],    rest: None },
    FunctionSignature { name: "ISEMPTY",           args: &[Value],                   rest: None },
    FunctionSignature { name: "LAG",               args: &[Member, Value],           rest: None },
    FunctionSignature { name: "LEAD",              args: &[Member, Value],           rest: None },
    FunctionSignature { name: "MAX",               args: &[MemberSet],               rest: Some(Value) },
    FunctionSignature { name: "MIN",               args: &[MemberSet],               rest: Some(Value) },
    FunctionSignature { name: "NONEMPTYCROSSJOIN", args: &[MemberSet, MemberSet],    rest: Some(MemberSet) },
    FunctionSignature { name: "ORDER",             args: &[MemberSet, Value],        rest: Some(Value) },
    FunctionSignature { name: "SUM",               args: &[MemberSet],               rest: Some(Value) },
    FunctionSignature { name: "TAIL",              args: &[MemberSet],               rest: Some(Value) },
    FunctionSignature { name: "TOPCOUNT",          args: &[MemberSet, Value],        rest: Some(Value) },
    FunctionSignature { name: "UNION",             args: &[MemberSet, MemberSet],    rest: Some(MemberSet) },
];

#[rustfmt::skip]
const BUILTIN_PROPERTIES: &[PropertySignature] = &[
    PropertySignature { name: "ALLMEMBERS",    base: Hierarchy },
    PropertySignature { name: "CHILDREN",      base: Member },
    PropertySignature { name: "CURRENTMEMBER", base: Hierarchy },
    PropertySignature { name: "DATAMEMBER",    base: Member },
    PropertySignature { name: "DEFAULTMEMBER", base: Hierarchy },
    PropertySignature { name: "DIMENSION",     base: Member },
    PropertySignature { name: "FIRSTCHILD",    base: Member },
    PropertySignature { name: "FIRSTSIBLING",  base: Member },
    PropertySignature { name: "HIERARCHY",     base: Member },
    PropertySignature { name: "LASTCHILD",     base: Member },
    PropertySignature { name: "LASTSIBLING",   base: Member },
    PropertySignature { name: "LEVEL",         base: Member },
    PropertySignature { name: "MEMBERS",       base: Hierarchy },
    PropertySignature { name: "NAME",          base: Member },
    PropertySignature { name: "NEXTMEMBER",    base: Member },
    PropertySignature { name: "ORDERKEY",      base: Member },
    PropertySignature { name: "PARENT",        base: Member },
    PropertySignature { name: "PREVMEMBER",    base: Member },
    PropertySignature { name: "UNIQUENAME",    base: Member },
    PropertySignature { name: "VALUE",         base: Member },
];

/// Signature lookup keyed by ascii-lowercased name.
#[derive(Debug)]
pub struct FunctionTable {
    functions: HashMap<String, &'static FunctionSignature>,
    properties: HashMap<String, &'static PropertySignature>,
}

impl FunctionTable {
    /// The builtin function table.
    pub fn builtin() -> &'static FunctionTable {
        static BUILTIN: LazyLock<FunctionTable> = LazyLock::new(|| {
            let mut functions = HashMap::new();
            for sig in BUILTIN_FUNCTIONS {
                if functions
                    .insert(sig.name.to_ascii_lowercase(), sig)
                    .is_some()
                {
                    panic!("Duplicate function signature: {}", sig.name);
                }
            }
            let mut properties = HashMap::new();
            for sig in BUILTIN_PROPERTIES {
                if properties
                    .insert(sig.name.to_ascii_lowercase(), sig)
                    .is_some()
                {
                    panic!("Duplicate property signature: {}", sig.name);
                }
            }
            FunctionTable {
                functions,
                properties,
            }
        });
        &BUILTIN
    }

    pub fn signature(&self, name: &str) -> Option<&'static FunctionSignature> {
        self.functions.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn property(&self, name: &str) -> Option<&'static PropertySignature> {
        self.properties.get(&name.to_ascii_lowercase()).copied()
    }
}
