/// Current search text and tag filter. The single source of truth for the
/// engine's filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    query: String,
    selected_tags: Vec<String>,
}

impl QueryState {
    pub fn new(query: impl Into<String>, selected_tags: Vec<String>) -> Self {
        let mut state = Self {
            query: query.into(),
            selected_tags: Vec::new(),
        };
        for tag in selected_tags {
            if !state.has_tag(&tag) {
                state.selected_tags.push(tag);
            }
        }
        state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_tags(&self) -> &[String] {
        &self.selected_tags
    }

    /// A non-empty query or at least one tag.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || !self.selected_tags.is_empty()
    }

    /// Returns whether the query changed.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query == self.query {
            return false;
        }
        self.query = query;
        true
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    /// Returns whether a character was removed.
    pub fn pop_char(&mut self) -> bool {
        self.query.pop().is_some()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.selected_tags.iter().any(|t| same_tag(t, tag))
    }

    /// Removes `tag` if selected, appends it otherwise.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(idx) = self
            .selected_tags
            .iter()
            .position(|t| same_tag(t, tag))
        {
            self.selected_tags.remove(idx);
        } else {
            self.selected_tags.push(tag.to_string());
        }
    }

    /// Returns whether any tag was selected.
    pub fn clear_tags(&mut self) -> bool {
        let had_tags = !self.selected_tags.is_empty();
        self.selected_tags.clear();
        had_tags
    }
}

/// Tags compare the way the filter matches them: Unicode lowercase.
fn same_tag(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn activity_follows_query_and_tags() {
        let mut state = QueryState::default();
        assert!(!state.is_active());
        state.push_char('g');
        assert!(state.is_active());
        assert!(state.pop_char());
        assert!(!state.is_active());
        assert!(!state.pop_char());
        state.toggle_tag("git");
        assert!(state.is_active());
    }

    #[test]
    fn toggle_tag_appends_then_removes() {
        let mut state = QueryState::default();
        state.toggle_tag("git");
        state.toggle_tag("ci-cd");
        assert_eq!(state.selected_tags(), ["git".to_string(), "ci-cd".to_string()]);
        state.toggle_tag("GIT");
        assert_eq!(state.selected_tags(), ["ci-cd".to_string()]);
        assert!(state.clear_tags());
        assert!(!state.clear_tags());
    }

    #[test]
    fn tags_differing_only_in_unicode_case_are_one_tag() {
        let mut state = QueryState::new("", vec!["Ärger".to_string(), "ärger".to_string()]);
        assert_eq!(state.selected_tags(), ["Ärger".to_string()]);
        assert!(state.has_tag("ÄRGER"));

        state.toggle_tag("ärger");
        assert!(state.selected_tags().is_empty());
    }

    #[test]
    fn set_query_reports_changes() {
        let mut state = QueryState::default();
        assert!(state.set_query("grafana"));
        assert!(!state.set_query("grafana"));
        assert_eq!(state.query(), "grafana");
    }

    #[test]
    fn new_deduplicates_tags() {
        let state = QueryState::new(
            "",
            vec!["git".to_string(), "Git".to_string(), "docs".to_string()],
        );
        assert_eq!(state.selected_tags(), ["git".to_string(), "docs".to_string()]);
    }
}
