use crate::domain::{Link, LinkTarget};

const NEW_WINDOW_SIZE: (u16, u16) = (1200, 800);

/// What activating a link should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationAction {
    pub href: String,
    pub target: LinkTarget,
}

impl NavigationAction {
    /// Width and height hint for targets that open a sized window.
    pub fn window_size(&self) -> Option<(u16, u16)> {
        match self.target {
            LinkTarget::NewWindow => Some(NEW_WINDOW_SIZE),
            LinkTarget::SameTab | LinkTarget::NewTab => None,
        }
    }
}

/// Directional keys and Enter only drive the selection while a search input
/// is focused or a filter is narrowing the grid.
pub fn accepts_navigation(search_focused: bool, filter_active: bool) -> bool {
    search_focused || filter_active
}

/// Index into the current visible order. `None` means nothing is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: Option<usize>,
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.index == Some(index)
    }

    /// Call once per filter change, after the new visible order exists.
    pub fn on_filter_changed(&mut self, filter_active: bool) {
        self.index = filter_active.then_some(0);
    }

    pub fn move_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.index = Some(match self.index {
            None => 0,
            Some(idx) => (idx + 1).min(len - 1),
        });
    }

    pub fn move_previous(&mut self) {
        if let Some(idx) = self.index {
            self.index = Some(idx.saturating_sub(1));
        }
    }

    /// Point at `index`, ignored when it is outside the visible order.
    pub fn select(&mut self, index: usize, len: usize) {
        if index < len {
            self.index = Some(index);
        }
    }

    pub fn clear(&mut self) {
        self.index = None;
    }

    /// Keep the index inside a visible order that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        if let Some(idx) = self.index
            && idx >= len
        {
            self.index = len.checked_sub(1);
        }
    }

    /// Resolve the selected link into a navigation action. A stale or empty
    /// selection yields nothing.
    pub fn activate(&self, visible: &[Link], target: LinkTarget) -> Option<NavigationAction> {
        let link = visible.get(self.index?)?;
        Some(NavigationAction {
            href: link.href.clone(),
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn links(n: usize) -> Vec<Link> {
        (0..n)
            .map(|i| Link {
                href: format!("https://{i}.example.com"),
                title: format!("Link {i}"),
                description: None,
                icon: None,
                category: None,
                tags: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn filter_changes_select_first_or_nothing() {
        let mut selection = Selection::default();
        assert_eq!(selection.index(), None);

        selection.on_filter_changed(true);
        assert_eq!(selection.index(), Some(0));

        selection.move_next(5);
        selection.on_filter_changed(true);
        assert_eq!(selection.index(), Some(0));

        selection.on_filter_changed(false);
        assert_eq!(selection.index(), None);
    }

    #[test]
    fn move_next_stops_at_last_element() {
        let mut selection = Selection::default();
        selection.on_filter_changed(true);
        selection.move_next(3);
        selection.move_next(3);
        assert_eq!(selection.index(), Some(2));
        selection.move_next(3);
        assert_eq!(selection.index(), Some(2));
    }

    #[test]
    fn move_next_from_nothing_selects_first() {
        let mut selection = Selection::default();
        selection.move_next(3);
        assert_eq!(selection.index(), Some(0));
    }

    #[test]
    fn move_next_on_empty_order_is_noop() {
        let mut selection = Selection::default();
        selection.move_next(0);
        assert_eq!(selection.index(), None);
    }

    #[test]
    fn move_previous_stops_at_first_and_never_leaves_nothing() {
        let mut selection = Selection::default();
        selection.move_previous();
        assert_eq!(selection.index(), None);

        selection.on_filter_changed(true);
        selection.move_next(4);
        selection.move_previous();
        selection.move_previous();
        assert_eq!(selection.index(), Some(0));
    }

    #[test]
    fn clear_drops_selection() {
        let mut selection = Selection::default();
        selection.on_filter_changed(true);
        selection.clear();
        assert_eq!(selection.index(), None);
    }

    #[test]
    fn select_ignores_out_of_range_index() {
        let mut selection = Selection::default();
        selection.select(3, 2);
        assert_eq!(selection.index(), None);
        selection.select(1, 2);
        assert!(selection.is_selected(1));
    }

    #[test]
    fn clamp_follows_a_shrinking_order() {
        let mut selection = Selection::default();
        selection.on_filter_changed(true);
        selection.move_next(5);
        selection.move_next(5);
        selection.clamp(2);
        assert_eq!(selection.index(), Some(1));
        selection.clamp(0);
        assert_eq!(selection.index(), None);
    }

    #[test]
    fn activate_resolves_selected_link_with_target() {
        let visible = links(3);
        let mut selection = Selection::default();
        selection.on_filter_changed(true);
        selection.move_next(visible.len());

        let action = selection
            .activate(&visible, LinkTarget::NewWindow)
            .expect("action");
        assert_eq!(action.href, "https://1.example.com");
        assert_eq!(action.window_size(), Some((1200, 800)));

        let same_tab = selection.activate(&visible, LinkTarget::SameTab).expect("action");
        assert_eq!(same_tab.window_size(), None);
    }

    #[test]
    fn activate_with_stale_or_missing_index_is_noop() {
        let mut selection = Selection::default();
        assert_eq!(selection.activate(&links(2), LinkTarget::NewTab), None);

        selection.on_filter_changed(true);
        selection.move_next(5);
        selection.move_next(5);
        assert_eq!(selection.activate(&links(2), LinkTarget::NewTab), None);
    }

    #[test]
    fn navigation_gate() {
        assert!(!accepts_navigation(false, false));
        assert!(accepts_navigation(true, false));
        assert!(accepts_navigation(false, true));
    }
}
