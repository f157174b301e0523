/// Name comparison rule for member and hierarchy names.
///
/// Case sensitivity comes from the session configuration; the same matcher
/// must be used for comparison and for producing map keys so the two agree.
#[derive(Debug, Clone, Copy)]
pub struct NameMatcher {
    case_sensitive: bool,
}

impl NameMatcher {
    pub fn new(case_sensitive: bool) -> Self {
        NameMatcher { case_sensitive }
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            // Compare folded so non-ascii names behave the same as when used
            // as map keys.
            a.to_lowercase() == b.to_lowercase()
        }
    }

    /// Fold a name for use as a lookup key.
    pub fn fold(&self, s: &str) -> String {
        if self.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }
}

/// Render a name as a bracket-quoted segment of a unique name.
pub fn quoted_segment(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}
