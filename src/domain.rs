use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CATEGORY: &str = "Other";

const DEVICON_CDN: &str = "https://cdn.jsdelivr.net/gh/devicons/devicon@latest/icons";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Link {
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref() {
            Some(category) if !category.trim().is_empty() => category,
            _ => DEFAULT_CATEGORY,
        }
    }

    pub fn icon(&self) -> Icon {
        Icon::parse(self.icon.as_deref())
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.title, self.href)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortingOption {
    Alphabetical,
    Defined,
}

impl SortingOption {
    pub const ALL: [SortingOption; 2] = [SortingOption::Alphabetical, SortingOption::Defined];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "alphabetical" => Some(Self::Alphabetical),
            "defined" => Some(Self::Defined),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::Defined => "defined",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Alphabetical => "Alphabetical (A-Z)",
            Self::Defined => "Defined order",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardLayout {
    Default,
    Compact,
}

impl CardLayout {
    pub const ALL: [CardLayout; 2] = [CardLayout::Default, CardLayout::Compact];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Compact => "compact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "Default (vertical)",
            Self::Compact => "Compact (horizontal)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkTarget {
    SameTab,
    NewTab,
    NewWindow,
}

impl LinkTarget {
    pub const ALL: [LinkTarget; 3] = [LinkTarget::NewTab, LinkTarget::SameTab, LinkTarget::NewWindow];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "same-tab" => Some(Self::SameTab),
            "new-tab" => Some(Self::NewTab),
            "new-window" => Some(Self::NewWindow),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SameTab => "same-tab",
            Self::NewTab => "new-tab",
            Self::NewWindow => "new-window",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SameTab => "Open in same tab",
            Self::NewTab => "Open in new tab",
            Self::NewWindow => "Open in new window",
        }
    }
}

/// How a link's `icon` field should be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    None,
    Glyph(String),
    Image(String),
    Devicon { name: String, variant: String },
}

impl Icon {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::None;
        };

        if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with('/') {
            return Self::Image(raw.to_string());
        }

        if let Some(full) = raw.strip_prefix("devicon/") {
            let (name, variant) = match full.rsplit_once('-') {
                Some((name, variant)) if !name.is_empty() && !variant.is_empty() => {
                    (name, variant)
                }
                _ => (full.trim_matches('-'), "original"),
            };
            return Self::Devicon {
                name: name.to_string(),
                variant: variant.to_string(),
            };
        }

        Self::Glyph(raw.to_string())
    }

    /// Original and original-wordmark variants only ship as colored SVGs.
    pub fn uses_svg(&self) -> bool {
        matches!(self, Self::Devicon { variant, .. } if variant.contains("original"))
    }

    pub fn svg_url(&self) -> Option<String> {
        match self {
            Self::Devicon { name, variant } => {
                Some(format!("{DEVICON_CDN}/{name}/{name}-{variant}.svg"))
            }
            _ => None,
        }
    }

    pub fn font_class(&self) -> Option<String> {
        match self {
            Self::Devicon { name, variant } => Some(format!("devicon-{name}-{variant}")),
            _ => None,
        }
    }

    /// Short text stand-in for the terminal grid.
    pub fn terminal_marker(&self) -> String {
        match self {
            Self::None => "·".to_string(),
            Self::Glyph(glyph) => glyph.clone(),
            Self::Image(_) => "▣".to_string(),
            Self::Devicon { name, .. } => name
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase().to_string())
                .unwrap_or_else(|| "◆".to_string()),
        }
    }
}
