/// Try to get a keyword from a string, ignoring string casing.
pub fn keyword_from_str(s: &str) -> Option<Keyword> {
    let s = unicase::Ascii::new(s);
    let idx = match KEYWORD_STRINGS.binary_search(&s) {
        Ok(idx) => idx,
        Err(_) => return None,
    };
    Some(ALL_KEYWORDS[idx])
}

/// Generate an enum of keywords.
macro_rules! define_keywords {
    ($($ident:ident),*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($ident),*
        }

        pub const ALL_KEYWORDS: &'static [Keyword] = &[
            $(Keyword::$ident),*
        ];

        pub const KEYWORD_STRINGS: &'static [unicase::Ascii<&'static str>] = &[
            $(unicase::Ascii::new(stringify!($ident)),)*
        ];
    };
}

#[rustfmt::skip]
define_keywords!(
    AND,
    AS,
    ASC,
    AXIS,
    BASC,
    BDESC,
    CELL,
    COLUMNS,
    DESC,
    DRILLTHROUGH,
    EMPTY,
    FROM,
    MEMBER,
    NON,
    NOT,
    ON,
    OR,
    PROPERTIES,
    ROWS,
    SELECT,
    SET,
    WHERE,
    WITH
);

/// Property names reserved by the query language.
///
/// An unquoted identifier following a '.' continues the enclosing member path
/// unless it is one of these, in which case it is parsed as a property access
/// on the expression so far. Quoting (`[Name]`) always forces a path segment.
#[rustfmt::skip]
pub const RESERVED_PROPERTIES: &[unicase::Ascii<&'static str>] = &[
    unicase::Ascii::new("ALLMEMBERS"),
    unicase::Ascii::new("CHILDREN"),
    unicase::Ascii::new("CURRENTMEMBER"),
    unicase::Ascii::new("DATAMEMBER"),
    unicase::Ascii::new("DEFAULTMEMBER"),
    unicase::Ascii::new("DIMENSION"),
    unicase::Ascii::new("FIRSTCHILD"),
    unicase::Ascii::new("FIRSTSIBLING"),
    unicase::Ascii::new("HIERARCHY"),
    unicase::Ascii::new("LASTCHILD"),
    unicase::Ascii::new("LASTSIBLING"),
    unicase::Ascii::new("LEVEL"),
    unicase::Ascii::new("MEMBERS"),
    unicase::Ascii::new("NAME"),
    unicase::Ascii::new("NEXTMEMBER"),
    unicase::Ascii::new("ORDERKEY"),
    unicase::Ascii::new("PARENT"),
    unicase::Ascii::new("PREVMEMBER"),
    unicase::Ascii::new("UNIQUENAME"),
    unicase::Ascii::new("VALUE"),
];

/// Check if a string names a reserved property, ignoring casing.
pub fn is_reserved_property(s: &str) -> bool {
    RESERVED_PROPERTIES
        .binary_search(&unicase::Ascii::new(s))
        .is_ok()
}
