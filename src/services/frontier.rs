use itertools::Itertools;
use url::Url;

use crate::domain::{CategorizedLinks, PageCategory};

/// One scheduled fetch. Entries are unique by URL across the whole plan.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierEntry {
    pub url: Url,
    pub category: PageCategory,
}

/// Flattens categorized links into the ordered fetch plan: category order
/// first, discovery order within a category, one entry per URL (first
/// category encountered wins), truncated to the global cap.
///
/// The per-category cap applies to successful fetches and is enforced by
/// the fetch loop, not here.
pub fn build_frontier(links: &CategorizedLinks, max_total: usize) -> Vec<FrontierEntry> {
    links
        .iter()
        .flat_map(|(category, urls)| {
            urls.iter().map(move |url| FrontierEntry {
                url: url.clone(),
                category,
            })
        })
        .unique_by(|entry| entry.url.clone())
        .take(max_total)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://example.com{}", path)).unwrap()
    }

    #[test]
    fn flattens_in_category_then_discovery_order() {
        let mut links = CategorizedLinks::new();
        links.push(PageCategory::Careers, url("/careers"));
        links.push(PageCategory::About, url("/about"));
        links.push(PageCategory::About, url("/company"));

        let frontier = build_frontier(&links, 20);

        let plan: Vec<(String, PageCategory)> = frontier
            .into_iter()
            .map(|e| (e.url.to_string(), e.category))
            .collect();
        assert_eq!(
            plan,
            vec![
                ("https://example.com/about".to_string(), PageCategory::About),
                ("https://example.com/company".to_string(), PageCategory::About),
                (
                    "https://example.com/careers".to_string(),
                    PageCategory::Careers
                ),
            ]
        );
    }

    #[test]
    fn a_url_under_two_categories_keeps_the_first() {
        let mut links = CategorizedLinks::new();
        links.push(PageCategory::About, url("/story"));
        links.push(PageCategory::Team, url("/story"));

        let frontier = build_frontier(&links, 20);

        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier[0].category, PageCategory::About);
    }

    #[test]
    fn truncates_to_the_global_cap() {
        let mut links = CategorizedLinks::new();
        for i in 0..10 {
            links.push(PageCategory::About, url(&format!("/a{}", i)));
        }

        let frontier = build_frontier(&links, 4);

        assert_eq!(frontier.len(), 4);
        assert_eq!(frontier[0].url.to_string(), "https://example.com/a0");
        assert_eq!(frontier[3].url.to_string(), "https://example.com/a3");
    }

    #[test]
    fn small_global_cap_favors_earlier_categories() {
        let mut links = CategorizedLinks::new();
        for category in PageCategory::ALL {
            links.push(category, url(&format!("/{}", category.as_str())));
        }

        let frontier = build_frontier(&links, 2);

        let categories: Vec<PageCategory> = frontier.into_iter().map(|e| e.category).collect();
        assert_eq!(categories, vec![PageCategory::About, PageCategory::Team]);
    }
}
