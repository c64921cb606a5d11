use crate::domain::{CardLayout, LinkTarget, SortingOption};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_GRID_COLUMNS: u16 = 4;
pub const MIN_GRID_COLUMNS: u16 = 2;
pub const MAX_GRID_COLUMNS: u16 = 6;

/// Defaults declared in the static config. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDefaults {
    pub grid_columns: Option<u16>,
    pub card_layout: Option<CardLayout>,
    pub link_target: Option<LinkTarget>,
    pub link_sorting: Option<SortingOption>,
    pub category_sorting: Option<SortingOption>,
    pub categories: Vec<String>,
}

/// The user-editable settings bundle. Persisted as a whole; there is no
/// per-field override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub grid_columns: u16,
    pub card_layout: CardLayout,
    pub link_target: LinkTarget,
    pub link_sorting: SortingOption,
    pub category_sorting: SortingOption,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub grid_columns: u16,
    pub card_layout: CardLayout,
    pub link_target: LinkTarget,
    pub link_sorting: SortingOption,
    pub category_sorting: SortingOption,
    pub categories: Vec<String>,
}

impl EffectiveSettings {
    pub fn user_settings(&self) -> UserSettings {
        UserSettings {
            grid_columns: self.grid_columns,
            card_layout: self.card_layout,
            link_target: self.link_target,
            link_sorting: self.link_sorting,
            category_sorting: self.category_sorting,
        }
    }
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        resolve(None, &ConfigDefaults::default())
    }
}

pub fn default_settings(defaults: &ConfigDefaults) -> UserSettings {
    UserSettings {
        grid_columns: defaults.grid_columns.unwrap_or(DEFAULT_GRID_COLUMNS),
        card_layout: defaults.card_layout.unwrap_or(CardLayout::Default),
        link_target: defaults.link_target.unwrap_or(LinkTarget::NewTab),
        link_sorting: defaults.link_sorting.unwrap_or(SortingOption::Defined),
        category_sorting: defaults.category_sorting.unwrap_or(SortingOption::Defined),
    }
}

/// Overlay the user's saved bundle (if any) onto the static defaults.
pub fn resolve(user: Option<&UserSettings>, defaults: &ConfigDefaults) -> EffectiveSettings {
    let chosen = user.copied().unwrap_or_else(|| default_settings(defaults));
    EffectiveSettings {
        grid_columns: chosen.grid_columns,
        card_layout: chosen.card_layout,
        link_target: chosen.link_target,
        link_sorting: chosen.link_sorting,
        category_sorting: chosen.category_sorting,
        categories: defaults.categories.clone(),
    }
}

/// Settings as read back from storage. Fields are kept as raw JSON so a
/// corrupted or outdated value only loses that one field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoredSettings {
    grid_columns: Value,
    card_layout: Value,
    link_target: Value,
    link_sorting: Value,
    category_sorting: Value,
}

impl StoredSettings {
    pub fn into_settings(self, defaults: &ConfigDefaults) -> UserSettings {
        let fallback = default_settings(defaults);
        let grid_columns = self
            .grid_columns
            .as_u64()
            .map(|n| clamp_columns(n.min(u64::from(u16::MAX)) as u16))
            .unwrap_or(fallback.grid_columns);

        UserSettings {
            grid_columns,
            card_layout: parse_field(&self.card_layout, CardLayout::parse)
                .unwrap_or(fallback.card_layout),
            link_target: parse_field(&self.link_target, LinkTarget::parse)
                .unwrap_or(fallback.link_target),
            link_sorting: parse_field(&self.link_sorting, SortingOption::parse)
                .unwrap_or(fallback.link_sorting),
            category_sorting: parse_field(&self.category_sorting, SortingOption::parse)
                .unwrap_or(fallback.category_sorting),
        }
    }
}

fn parse_field<T>(value: &Value, parse: fn(&str) -> Option<T>) -> Option<T> {
    let parsed = value.as_str().and_then(parse);
    if parsed.is_none() && !value.is_null() {
        tracing::warn!(%value, "ignoring unknown stored setting value");
    }
    parsed
}

pub fn clamp_columns(columns: u16) -> u16 {
    columns.clamp(MIN_GRID_COLUMNS, MAX_GRID_COLUMNS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    GridColumns,
    CardLayout,
    LinkTarget,
    LinkSorting,
    CategorySorting,
}

impl SettingsField {
    pub const ALL: [SettingsField; 5] = [
        SettingsField::GridColumns,
        SettingsField::CardLayout,
        SettingsField::LinkTarget,
        SettingsField::LinkSorting,
        SettingsField::CategorySorting,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::GridColumns => "Grid columns",
            Self::CardLayout => "Card layout",
            Self::LinkTarget => "Open links",
            Self::LinkSorting => "Link sorting",
            Self::CategorySorting => "Category sorting",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Local form state for the settings dialog. Nothing is persisted until
/// [`SettingsDraft::commit`] is called by the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDraft {
    pub values: UserSettings,
}

impl SettingsDraft {
    pub fn new(current: &EffectiveSettings) -> Self {
        Self {
            values: current.user_settings(),
        }
    }

    pub fn has_changes(&self, current: &EffectiveSettings) -> bool {
        self.values != current.user_settings()
    }

    pub fn is_at_defaults(&self, defaults: &ConfigDefaults) -> bool {
        self.values == default_settings(defaults)
    }

    /// Only touches the draft; the saved override is unchanged until commit.
    pub fn reset_to_defaults(&mut self, defaults: &ConfigDefaults) {
        self.values = default_settings(defaults);
    }

    pub fn set_grid_columns(&mut self, columns: u16) {
        self.values.grid_columns = clamp_columns(columns);
    }

    pub fn adjust(&mut self, field: SettingsField, forward: bool) {
        let v = self.values;
        match field {
            SettingsField::GridColumns => {
                let columns = if forward {
                    v.grid_columns.saturating_add(1)
                } else {
                    v.grid_columns.saturating_sub(1)
                };
                self.set_grid_columns(columns);
            }
            SettingsField::CardLayout => {
                self.values.card_layout = cycle(&CardLayout::ALL, v.card_layout, forward);
            }
            SettingsField::LinkTarget => {
                self.values.link_target = cycle(&LinkTarget::ALL, v.link_target, forward);
            }
            SettingsField::LinkSorting => {
                self.values.link_sorting = cycle(&SortingOption::ALL, v.link_sorting, forward);
            }
            SettingsField::CategorySorting => {
                self.values.category_sorting =
                    cycle(&SortingOption::ALL, v.category_sorting, forward);
            }
        }
    }

    pub fn display_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::GridColumns => self.values.grid_columns.to_string(),
            SettingsField::CardLayout => self.values.card_layout.label().to_string(),
            SettingsField::LinkTarget => self.values.link_target.label().to_string(),
            SettingsField::LinkSorting => self.values.link_sorting.label().to_string(),
            SettingsField::CategorySorting => self.values.category_sorting.label().to_string(),
        }
    }

    /// The override to persist. Saving values equal to the defaults clears
    /// the override so later changes to the static config still apply.
    pub fn commit(&self, defaults: &ConfigDefaults) -> Option<UserSettings> {
        if self.is_at_defaults(defaults) {
            None
        } else {
            Some(self.values)
        }
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else {
        (idx + all.len() - 1) % all.len()
    };
    all[next]
}
