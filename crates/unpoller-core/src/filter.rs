use std::time::Duration;

/// Selects which inputs and controllers a request reaches.
///
/// The default filter means "every configured source". Outputs targeting
/// a single controller set `path` (its URL) or `role` (its alias).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Input plugin name, matched case-insensitively. Empty matches all.
    pub name: String,
    /// Controller URL for targeted or dynamic scrapes.
    pub path: String,
    /// Configured controller alias.
    pub role: String,
    /// Raw dump kind: `device`, `client` or `other`.
    pub kind: String,
    /// Controller index for raw dumps.
    pub unit: usize,
    /// Skip IDS collection; set by outputs that already receive IDS elsewhere.
    pub skip: bool,
    /// Look-back window for events; one minute when unset.
    pub dur: Option<Duration>,
}

impl Filter {
    /// A filter that only skips IDS collection.
    pub fn skip_ids() -> Self {
        Self {
            skip: true,
            ..Self::default()
        }
    }

    /// Whether this filter selects one controller rather than all of them.
    pub fn is_targeted(&self) -> bool {
        !self.path.is_empty() || !self.role.is_empty()
    }

    /// Whether an input named `input` should serve this request.
    pub fn matches_input(&self, input: &str) -> bool {
        self.name.is_empty() || self.name.eq_ignore_ascii_case(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        let filter = Filter::default();
        assert!(!filter.is_targeted());
        assert!(filter.matches_input("unifi"));
    }

    #[test]
    fn input_name_is_case_insensitive() {
        let filter = Filter {
            name: "UniFi".into(),
            role: "office".into(),
            ..Filter::default()
        };
        assert!(filter.matches_input("unifi"));
        assert!(!filter.matches_input("other"));
        assert!(filter.is_targeted());
    }
}
