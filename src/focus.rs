/// The two places the query can be typed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchInput {
    /// Large input at the top of the page.
    Hero,
    /// Compact input pinned to the header once the hero has scrolled away.
    Sticky,
}

/// Decides which search input should hold focus as the page scrolls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFocus {
    sticky_visible: bool,
    owner: Option<SearchInput>,
}

impl SearchFocus {
    pub fn owner(&self) -> Option<SearchInput> {
        self.owner
    }

    pub fn is_focused(&self) -> bool {
        self.owner.is_some()
    }

    pub fn sticky_visible(&self) -> bool {
        self.sticky_visible
    }

    /// The input currently on screen.
    pub fn visible_input(&self) -> SearchInput {
        if self.sticky_visible {
            SearchInput::Sticky
        } else {
            SearchInput::Hero
        }
    }

    /// Record the scroll threshold state. Returns the input that should now
    /// receive focus when a focused input just went out of view.
    pub fn on_scroll(&mut self, sticky_visible: bool) -> Option<SearchInput> {
        if sticky_visible == self.sticky_visible {
            return None;
        }
        self.sticky_visible = sticky_visible;

        let handoff = match (sticky_visible, self.owner) {
            (true, Some(SearchInput::Hero)) => Some(SearchInput::Sticky),
            (false, Some(SearchInput::Sticky)) => Some(SearchInput::Hero),
            _ => None,
        };
        if handoff.is_some() {
            self.owner = handoff;
        }
        handoff
    }

    /// The "focus search" shortcut. Repeating it keeps the same target.
    pub fn focus_shortcut(&mut self) -> SearchInput {
        let target = self.visible_input();
        self.on_focus(target);
        target
    }

    pub fn on_focus(&mut self, input: SearchInput) {
        self.owner = Some(input);
    }

    pub fn on_blur(&mut self) {
        self.owner = None;
    }
}
