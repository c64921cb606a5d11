use crate::backend::BackendTask;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::domain::Link;
use crate::focus::{SearchFocus, SearchInput};
use crate::query::QueryState;
use crate::selection::{Selection, accepts_navigation};
use crate::settings::{
    ConfigDefaults, EffectiveSettings, SettingsDraft, SettingsField, UserSettings, resolve,
};
use crate::store::FavoriteSet;
use crate::view::{ViewOutcome, compute_view};

/// Rows taken by the hero block (title, subtitle, search, tags, spacing)
/// at the top of the page. Scrolling past it reveals the sticky search.
pub const HERO_ROWS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    None,
    Help,
    Tags {
        cursor: usize,
    },
    Settings {
        draft: SettingsDraft,
        field: SettingsField,
    },
}

pub struct App {
    pub title: String,
    pub github_edit_url: Option<String>,
    pub focus: SearchFocus,
    pub selection: Selection,
    pub modal: ModalState,
    pub status: Option<String>,
    pub should_quit: bool,
    catalog: Catalog,
    all_tags: Vec<String>,
    defaults: ConfigDefaults,
    query: QueryState,
    favorites: FavoriteSet,
    user_settings: Option<UserSettings>,
    hydrated: bool,
    early_toggles: Vec<(String, bool)>,
    early_settings: Option<Option<UserSettings>>,
    view: ViewOutcome,
    page_scroll: usize,
    page_max_scroll: usize,
    follow_selection: bool,
}

impl App {
    pub fn new(config: &AppConfig, query: QueryState) -> Self {
        let catalog = Catalog::from_records(config.links.clone());
        let all_tags = catalog.all_tags();
        let mut app = Self {
            title: config.title(),
            github_edit_url: config.github_edit_url.clone(),
            focus: SearchFocus::default(),
            selection: Selection::default(),
            modal: ModalState::None,
            status: None,
            should_quit: false,
            catalog,
            all_tags,
            defaults: config.defaults(),
            query,
            favorites: FavoriteSet::default(),
            user_settings: None,
            hydrated: false,
            early_toggles: Vec::new(),
            early_settings: None,
            view: ViewOutcome::NoResults {
                query: String::new(),
            },
            page_scroll: 0,
            page_max_scroll: 0,
            follow_selection: false,
        };
        app.on_filter_changed();
        app
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn all_tags(&self) -> &[String] {
        &self.all_tags
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn view(&self) -> &ViewOutcome {
        &self.view
    }

    pub fn visible_links(&self) -> &[Link] {
        self.view.visible_order()
    }

    pub fn defaults(&self) -> &ConfigDefaults {
        &self.defaults
    }

    pub fn settings(&self) -> EffectiveSettings {
        resolve(self.user_settings.as_ref(), &self.defaults)
    }

    pub fn selected_link(&self) -> Option<&Link> {
        self.visible_links().get(self.selection.index()?)
    }

    pub fn navigation_enabled(&self) -> bool {
        accepts_navigation(self.focus.is_focused(), self.query.is_active())
    }

    /// Recompute the view without touching the selection beyond keeping it
    /// in range. Used when favorites or settings change.
    pub fn refresh_view(&mut self) {
        self.view = compute_view(
            &self.catalog,
            self.query.query(),
            self.query.selected_tags(),
            &self.favorites,
            &self.settings(),
        );
        self.selection.clamp(self.view.visible_order().len());
    }

    /// Recompute the view for new filter inputs, then reset the selection
    /// against the fresh visible order.
    fn on_filter_changed(&mut self) {
        self.refresh_view();
        self.selection.on_filter_changed(self.query.is_active());
        self.follow_selection = true;
    }

    pub fn type_char(&mut self, c: char) {
        self.query.push_char(c);
        self.on_filter_changed();
    }

    pub fn backspace(&mut self) {
        if self.query.pop_char() {
            self.on_filter_changed();
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        if self.query.set_query(query) {
            self.on_filter_changed();
        }
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        self.query.toggle_tag(tag);
        self.on_filter_changed();
    }

    pub fn clear_tags(&mut self) {
        if self.query.clear_tags() {
            self.on_filter_changed();
        }
    }

    pub fn move_next(&mut self) {
        self.selection.move_next(self.visible_links().len());
        self.follow_selection = true;
    }

    pub fn move_previous(&mut self) {
        self.selection.move_previous();
        self.follow_selection = true;
    }

    /// Escape: drop the selection and leave the search input.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.focus.on_blur();
    }

    pub fn focus_search(&mut self) -> SearchInput {
        self.focus.focus_shortcut()
    }

    pub fn activate(&self) -> Option<BackendTask> {
        let target = self.settings().link_target;
        self.selection
            .activate(self.visible_links(), target)
            .map(BackendTask::Open)
    }

    /// Persisted state arrived. Anything the user changed while it was
    /// loading is replayed on top and written back.
    pub fn apply_hydration(
        &mut self,
        favorites: FavoriteSet,
        settings: Option<UserSettings>,
    ) -> Vec<BackendTask> {
        let mut follow_up = Vec::new();
        self.hydrated = true;
        self.favorites = favorites;
        self.user_settings = settings;

        if !self.early_toggles.is_empty() {
            // Replay the state the user asked for, not a blind toggle.
            for (href, favorite) in std::mem::take(&mut self.early_toggles) {
                self.favorites.set(&href, favorite);
            }
            follow_up.push(BackendTask::SaveFavorites(self.favorites.to_vec()));
        }
        if let Some(settings) = self.early_settings.take() {
            self.user_settings = settings;
            follow_up.push(BackendTask::SaveSettings(settings));
        }

        tracing::info!(
            favorites = self.favorites.len(),
            custom_settings = self.user_settings.is_some(),
            replayed = follow_up.len(),
            "hydrated persisted state"
        );
        self.refresh_view();
        follow_up
    }

    /// Toggle the selected link as a favorite. The selection follows the
    /// link to its new place in the grid.
    pub fn toggle_selected_favorite(&mut self) -> Option<BackendTask> {
        let href = self.selected_link()?.href.clone();
        let now_favorite = self.favorites.toggle(&href);
        self.status = Some(if now_favorite {
            "Added to favorites".to_string()
        } else {
            "Removed from favorites".to_string()
        });
        self.refresh_view();
        if let Some(results) = self.view.as_results()
            && let Some(idx) = results.position_of(&href)
        {
            self.selection.select(idx, results.visible_order.len());
        }
        self.follow_selection = true;

        if self.hydrated {
            Some(BackendTask::SaveFavorites(self.favorites.to_vec()))
        } else {
            self.early_toggles.push((href, now_favorite));
            None
        }
    }

    pub fn open_help(&mut self) {
        self.modal = ModalState::Help;
    }

    pub fn open_tags(&mut self) {
        self.modal = ModalState::Tags { cursor: 0 };
    }

    pub fn open_settings(&mut self) {
        self.modal = ModalState::Settings {
            draft: SettingsDraft::new(&self.settings()),
            field: SettingsField::GridColumns,
        };
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::None;
    }

    /// Persist the draft. Saving values equal to the defaults clears the
    /// override instead.
    pub fn save_settings(&mut self, draft: &SettingsDraft) -> Option<BackendTask> {
        let current = self.settings();
        self.close_modal();
        if !draft.has_changes(&current) && draft.commit(&self.defaults) == self.user_settings {
            return None;
        }

        let saved = draft.commit(&self.defaults);
        let values = draft.values;
        tracing::info!(
            grid_columns = values.grid_columns,
            card_layout = values.card_layout.as_str(),
            link_target = values.link_target.as_str(),
            link_sorting = values.link_sorting.as_str(),
            category_sorting = values.category_sorting.as_str(),
            reset = saved.is_none(),
            "settings saved"
        );
        self.user_settings = saved;
        self.status = Some(if saved.is_some() {
            "Settings saved".to_string()
        } else {
            "Settings reset to defaults".to_string()
        });
        self.refresh_view();

        if self.hydrated {
            Some(BackendTask::SaveSettings(saved))
        } else {
            self.early_settings = Some(saved);
            None
        }
    }

    pub fn page_scroll(&self) -> usize {
        self.page_scroll
    }

    pub fn scroll_page_down(&mut self, rows: usize) {
        let scroll = self.page_scroll.saturating_add(rows).min(self.page_max_scroll);
        self.set_page_scroll(scroll);
    }

    pub fn scroll_page_up(&mut self, rows: usize) {
        self.set_page_scroll(self.page_scroll.saturating_sub(rows));
    }

    /// Called by the renderer once it knows how tall the page is.
    pub fn set_page_rows(&mut self, total_rows: usize, viewport_rows: usize) {
        self.page_max_scroll = total_rows.saturating_sub(viewport_rows.max(1));
        if self.page_scroll > self.page_max_scroll {
            self.set_page_scroll(self.page_max_scroll);
        }
    }

    /// Whether the selection moved since the renderer last scrolled to it.
    pub fn take_follow_selection(&mut self) -> bool {
        std::mem::take(&mut self.follow_selection)
    }

    /// Scroll just enough to show rows `top..bottom` of the page.
    pub fn sync_page_scroll(&mut self, top: usize, bottom: usize, viewport_rows: usize) {
        let rows = viewport_rows.max(1);
        let mut scroll = self.page_scroll;
        if top < scroll {
            scroll = top;
        } else if bottom > scroll + rows {
            scroll = bottom.saturating_sub(rows).min(top);
        }
        self.set_page_scroll(scroll);
    }

    fn set_page_scroll(&mut self, scroll: usize) {
        self.page_scroll = scroll;
        if let Some(input) = self.focus.on_scroll(scroll >= HERO_ROWS) {
            tracing::debug!(?input, "search focus handed over");
        }
    }
}
