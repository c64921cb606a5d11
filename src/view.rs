//! Filtering, grouping and ordering of the catalog into what the grid shows.
//!
//! Everything here is a pure function of its inputs: the same catalog, query,
//! tags, favorites and settings always produce the same view.

use crate::catalog::Catalog;
use crate::domain::{Link, SortingOption};
use crate::settings::EffectiveSettings;
use crate::store::FavoriteSet;
use std::cmp::Ordering;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub favorite_links: Vec<Link>,
    pub groups: Vec<CategoryGroup>,
    /// Favorites first, then every group in display order. This is the
    /// order keyboard navigation walks.
    pub visible_order: Vec<Link>,
}

impl ViewModel {
    pub fn position_of(&self, href: &str) -> Option<usize> {
        self.visible_order.iter().position(|link| link.href == href)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    NoResults { query: String },
    Results(ViewModel),
}

impl ViewOutcome {
    pub fn visible_order(&self) -> &[Link] {
        match self {
            Self::NoResults { .. } => &[],
            Self::Results(view) => &view.visible_order,
        }
    }

    pub fn as_results(&self) -> Option<&ViewModel> {
        match self {
            Self::NoResults { .. } => None,
            Self::Results(view) => Some(view),
        }
    }
}

pub fn compute_view(
    catalog: &Catalog,
    query: &str,
    selected_tags: &[String],
    favorites: &FavoriteSet,
    settings: &EffectiveSettings,
) -> ViewOutcome {
    let matched: Vec<&Link> = catalog
        .links()
        .iter()
        .filter(|link| link_matches(link, query, selected_tags))
        .collect();

    if matched.is_empty() {
        tracing::debug!(query, tags = ?selected_tags, "no links matched");
        return ViewOutcome::NoResults {
            query: query.to_string(),
        };
    }

    let (favorite_links, rest): (Vec<&Link>, Vec<&Link>) = matched
        .into_iter()
        .partition(|link| favorites.contains(&link.href));

    let mut groups = group_by_category(rest);
    order_categories(&mut groups, settings);
    if settings.link_sorting == SortingOption::Alphabetical {
        for group in &mut groups {
            // sort_by is stable, so equal titles keep catalog order.
            group.links.sort_by(|a, b| locale_compare(&a.title, &b.title));
        }
    }

    let favorite_links: Vec<Link> = favorite_links.into_iter().cloned().collect();
    let visible_order: Vec<Link> = favorite_links
        .iter()
        .chain(groups.iter().flat_map(|group| group.links.iter()))
        .cloned()
        .collect();

    tracing::debug!(
        query,
        matches = visible_order.len(),
        favorites = favorite_links.len(),
        groups = groups.len(),
        "computed view"
    );

    ViewOutcome::Results(ViewModel {
        favorite_links,
        groups,
        visible_order,
    })
}

/// Whether `link` passes the search box and tag filter.
pub fn link_matches(link: &Link, query: &str, selected_tags: &[String]) -> bool {
    let wanted_tags: Vec<String> = selected_tags.iter().map(|t| t.to_lowercase()).collect();
    matches_text(link, &query.to_lowercase()) && matches_tags(link, &wanted_tags)
}

fn matches_text(link: &Link, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(&link.title)
        || link.description.as_deref().is_some_and(contains)
        || link.category.as_deref().is_some_and(contains)
        || link.tags.iter().any(|tag| contains(tag))
}

fn matches_tags(link: &Link, wanted: &[String]) -> bool {
    wanted
        .iter()
        .all(|want| link.tags.iter().any(|tag| tag.to_lowercase() == *want))
}

fn group_by_category(links: Vec<&Link>) -> Vec<CategoryGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for link in links {
        let category = link.category_or_default();
        let slot = *index.entry(category).or_insert_with(|| {
            groups.push(CategoryGroup {
                category: category.to_string(),
                links: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].links.push(link.clone());
    }

    groups
}

/// `groups` arrives in order of first appearance.
fn order_categories(groups: &mut [CategoryGroup], settings: &EffectiveSettings) {
    match settings.category_sorting {
        SortingOption::Alphabetical => {
            groups.sort_by(|a, b| a.category.cmp(&b.category));
        }
        SortingOption::Defined if !settings.categories.is_empty() => {
            let rank = |category: &str| {
                settings
                    .categories
                    .iter()
                    .position(|c| c == category)
                    .unwrap_or(usize::MAX)
            };
            // Unlisted categories share usize::MAX, and the stable sort keeps
            // them in appearance order after the listed ones.
            groups.sort_by_key(|group| rank(&group.category));
        }
        SortingOption::Defined => {}
    }
}

/// Title comparison in the style of a root-locale collator. Base letters
/// decide first with accents and case ignored, then accents, then
/// lowercase before uppercase, then raw order.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    collation_key(a, false)
        .cmp(collation_key(b, false))
        .then_with(|| collation_key(a, true).cmp(collation_key(b, true)))
        .then_with(|| {
            a.nfd()
                .zip(b.nfd())
                .map(|(x, y)| x.is_uppercase().cmp(&y.is_uppercase()))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.cmp(b))
}

/// Lowercased, decomposed characters, optionally without combining marks.
fn collation_key(s: &str, keep_marks: bool) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(move |c| keep_marks || !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}
