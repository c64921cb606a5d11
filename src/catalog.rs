use crate::config::LinkRecord;
use crate::domain::Link;
use std::collections::{BTreeMap, HashSet};

/// Immutable, ordered set of links. `href` is unique within a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    links: Vec<Link>,
}

impl Catalog {
    pub fn from_records(records: impl IntoIterator<Item = LinkRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let Some(link) = link_from_record(record) else {
                tracing::warn!(index, "dropping link record without href or title");
                continue;
            };
            if !seen.insert(link.href.clone()) {
                tracing::warn!(index, href = %link.href, "dropping duplicate link");
                continue;
            }
            links.push(link);
        }

        Self { links }
    }

    /// Build from already-valid links, still applying the duplicate check.
    #[cfg(test)]
    pub fn from_links(links: impl IntoIterator<Item = Link>) -> Self {
        Self::from_records(links.into_iter().map(|link| LinkRecord {
            href: Some(link.href),
            title: Some(link.title),
            description: link.description,
            icon: link.icon,
            category: link.category,
            tags: link.tags,
        }))
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, href: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.href == href)
    }

    /// Distinct tags across the catalog, compared case-insensitively. The
    /// first spelling seen wins.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: BTreeMap<String, String> = BTreeMap::new();
        for tag in self.links.iter().flat_map(|link| link.tags.iter()) {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            tags.entry(tag.to_lowercase())
                .or_insert_with(|| tag.to_string());
        }
        tags.into_values().collect()
    }
}

fn link_from_record(record: LinkRecord) -> Option<Link> {
    let href = non_blank(record.href)?;
    let title = non_blank(record.title)?;
    Some(Link {
        href,
        title,
        description: non_blank(record.description),
        icon: non_blank(record.icon),
        category: non_blank(record.category).map(|category| category.trim().to_string()),
        tags: record
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(href: Option<&str>, title: Option<&str>) -> LinkRecord {
        LinkRecord {
            href: href.map(str::to_string),
            title: title.map(str::to_string),
            ..LinkRecord::default()
        }
    }

    #[test]
    fn malformed_records_are_dropped() {
        let catalog = Catalog::from_records(vec![
            record(Some("https://a.example.com"), Some("A")),
            record(None, Some("No href")),
            record(Some("https://b.example.com"), None),
            record(Some("https://c.example.com"), Some("   ")),
            record(Some("https://d.example.com"), Some("D")),
        ]);
        let titles: Vec<&str> = catalog.links().iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "D"]);
    }

    #[test]
    fn duplicate_hrefs_keep_first_occurrence() {
        let catalog = Catalog::from_records(vec![
            record(Some("https://a.example.com"), Some("First")),
            record(Some("https://a.example.com"), Some("Second")),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("https://a.example.com").map(|l| l.title.as_str()),
            Some("First")
        );
    }

    #[test]
    fn blank_optional_fields_become_absent() {
        let catalog = Catalog::from_records(vec![LinkRecord {
            href: Some("https://a.example.com".to_string()),
            title: Some("A".to_string()),
            description: Some(String::new()),
            icon: Some(" ".to_string()),
            category: Some(String::new()),
            tags: vec!["git".to_string(), " ".to_string()],
        }]);
        let link = &catalog.links()[0];
        assert!(link.description.is_none());
        assert!(link.icon.is_none());
        assert_eq!(link.category_or_default(), "Other");
        assert_eq!(link.tags, vec!["git".to_string()]);
    }

    #[test]
    fn categories_are_trimmed_once_for_every_consumer() {
        let mut a = record(Some("https://a.example.com"), Some("A"));
        a.category = Some("  DevOps ".to_string());
        let mut b = record(Some("https://b.example.com"), Some("B"));
        b.category = Some("DevOps".to_string());
        let catalog = Catalog::from_records(vec![a, b]);

        assert_eq!(catalog.links()[0].category.as_deref(), Some("DevOps"));
        assert_eq!(
            catalog.links()[0].category_or_default(),
            catalog.links()[1].category_or_default()
        );
    }

    #[test]
    fn all_tags_are_distinct_and_sorted() {
        let mut a = record(Some("https://a.example.com"), Some("A"));
        a.tags = vec!["git".to_string(), "CI-CD".to_string()];
        let mut b = record(Some("https://b.example.com"), Some("B"));
        b.tags = vec!["ci-cd".to_string(), "automation".to_string()];
        let catalog = Catalog::from_records(vec![a, b]);
        assert_eq!(
            catalog.all_tags(),
            vec!["automation".to_string(), "CI-CD".to_string(), "git".to_string()]
        );
    }
}
