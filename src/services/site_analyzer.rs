use std::collections::HashSet;

use anyhow::Context;
use scraper::{Html, Selector};
use url::Url;

use crate::domain::{CategorizedLinks, PageCategory};

use super::content_extractor::clean_text;

const SKIPPED_HREF_PREFIXES: [&str; 4] = ["#", "mailto:", "tel:", "javascript:"];

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Finds relevant internal pages within a website based on keywords.
///
/// One analyzer serves exactly one analysis: it owns the set of URLs it has
/// already ruled on, so concurrent analyses must each construct their own
/// instance.
pub struct SiteAnalyzer {
    base_url: Url,
    base_host: String,
    processed_urls: HashSet<String>,
    max_pages_per_category: usize,
}

impl SiteAnalyzer {
    pub fn new(base_url: &str, max_pages_per_category: usize) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid base URL for site analyzer: {}", base_url))?;
        anyhow::ensure!(
            matches!(base_url.scheme(), "http" | "https"),
            "base URL must use http or https: {}",
            base_url
        );
        let base_host = base_url
            .host_str()
            .map(|host| strip_www(host).to_string())
            .filter(|host| !host.is_empty())
            .with_context(|| format!("could not extract domain from base URL: {}", base_url))?;

        log::info!("Site analyzer initialized for: {}", base_url);

        Ok(SiteAnalyzer {
            base_url,
            base_host,
            processed_urls: HashSet::new(),
            max_pages_per_category,
        })
    }

    /// Buckets every internal anchor into at most one category. Every
    /// configured category is present in the result, possibly empty; a URL
    /// accepted once is never handed out again by this instance.
    pub fn find_relevant_pages(&mut self, html: &str) -> CategorizedLinks {
        let mut categorized = CategorizedLinks::new();

        if html.trim().is_empty() {
            log::warn!(
                "Cannot find relevant pages on {}: HTML content empty",
                self.base_url
            );
            return categorized;
        }

        let document = Html::parse_document(html);
        let anchor_selector = Selector::parse("a[href]").unwrap();

        log::info!("Analyzing links on {}...", self.base_url);
        let mut anchors_seen = 0usize;
        let mut links_found = 0usize;

        for anchor in document.select(&anchor_selector) {
            anchors_seen += 1;

            let href = match anchor.value().attr("href") {
                Some(href) => href.trim(),
                None => continue,
            };
            if href.is_empty()
                || SKIPPED_HREF_PREFIXES
                    .iter()
                    .any(|prefix| href.starts_with(prefix))
            {
                continue;
            }

            let resolved = match self.resolve_internal(href) {
                Some(resolved) => resolved,
                None => continue,
            };
            let url_str = resolved.to_string();
            if self.processed_urls.contains(&url_str) {
                continue;
            }

            let anchor_text = clean_text(&anchor.text().collect::<String>()).to_lowercase();
            let path = resolved.path().to_lowercase();

            if let Some(category) = self.assign_category(&anchor_text, &path, &url_str, &mut categorized)
            {
                links_found += 1;
                log::debug!("Found '{}' link: {}", category.as_str(), url_str);
            }
        }

        log::info!(
            "Finished analyzing {} anchors on {}. Found {} categorized links.",
            anchors_seen,
            self.base_url,
            links_found
        );
        categorized
    }

    // Join against the base, strip the fragment, keep http(s) links whose
    // host matches the base host with one leading www. ignored on each side.
    fn resolve_internal(&self, href: &str) -> Option<Url> {
        let mut resolved = self.base_url.join(href).ok()?;
        resolved.set_fragment(None);
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }
        let host = resolved.host_str()?;
        if strip_www(host) != self.base_host {
            return None;
        }
        Some(resolved)
    }

    // First keyword match in configured category order wins. Categories at
    // capacity are skipped without consuming the link.
    fn assign_category(
        &mut self,
        anchor_text: &str,
        path: &str,
        url_str: &str,
        categorized: &mut CategorizedLinks,
    ) -> Option<PageCategory> {
        for category in PageCategory::ALL {
            if categorized.get(category).len() >= self.max_pages_per_category {
                continue;
            }
            for keyword in category.keywords() {
                if !keyword_matches(keyword, anchor_text, path) {
                    continue;
                }
                // Assignment re-validates the URL; one the value type
                // rejects is still marked processed so it is never
                // reconsidered under another category.
                match Url::parse(url_str) {
                    Ok(valid) => {
                        categorized.push(category, valid);
                        self.processed_urls.insert(url_str.to_string());
                        return Some(category);
                    }
                    Err(e) => {
                        log::warn!("URL validation failed for '{}': {}", url_str, e);
                        self.processed_urls.insert(url_str.to_string());
                        return None;
                    }
                }
            }
        }
        None
    }
}

fn keyword_matches(keyword: &str, anchor_text: &str, path: &str) -> bool {
    anchor_text.contains(keyword)
        || path.contains(&format!("/{}/", keyword))
        || path.ends_with(&format!("/{}", keyword))
        || path.contains(&format!("/{}.", keyword))
        || path.contains(&format!("-{}", keyword))
        || path == format!("/{}", keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SiteAnalyzer {
        SiteAnalyzer::new("https://example.com", 3).unwrap()
    }

    fn urls(links: &CategorizedLinks, category: PageCategory) -> Vec<String> {
        links
            .get(category)
            .iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn rejects_invalid_base_urls() {
        assert!(SiteAnalyzer::new("not a url", 3).is_err());
        assert!(SiteAnalyzer::new("ftp://example.com", 3).is_err());
    }

    #[test]
    fn classifies_basic_anchors_and_skips_non_links() {
        let html = r##"
            <html><body>
              <a href="/about-us">About</a>
              <a href="/careers">Careers</a>
              <a href="#top">Top</a>
              <a href="mailto:x@y.com">Mail</a>
              <a href="tel:+123456">Call</a>
              <a href="javascript:void(0)">Menu</a>
            </body></html>"##;

        let links = analyzer().find_relevant_pages(html);

        assert_eq!(
            urls(&links, PageCategory::About),
            vec!["https://example.com/about-us"]
        );
        assert_eq!(
            urls(&links, PageCategory::Careers),
            vec!["https://example.com/careers"]
        );
        for category in [
            PageCategory::Team,
            PageCategory::ProductServices,
            PageCategory::PressNews,
            PageCategory::Contact,
            PageCategory::Investors,
        ] {
            assert!(links.get(category).is_empty());
        }
    }

    #[test]
    fn keeps_only_internal_links() {
        let html = r#"
            <html><body>
              <a href="https://www.example.com/about">About</a>
              <a href="https://other.com/about">About elsewhere</a>
              <a href="https://blog.example.com/about">About on subdomain</a>
            </body></html>"#;

        let links = analyzer().find_relevant_pages(html);

        assert_eq!(
            urls(&links, PageCategory::About),
            vec!["https://www.example.com/about"]
        );
        assert_eq!(links.total(), 1);
    }

    #[test]
    fn strips_fragments_and_deduplicates_by_resolved_url() {
        let html = r#"
            <html><body>
              <a href="/about">About</a>
              <a href="/about#history">About history</a>
              <a href="/about">Our Team</a>
            </body></html>"#;

        let links = analyzer().find_relevant_pages(html);

        assert_eq!(
            urls(&links, PageCategory::About),
            vec!["https://example.com/about"]
        );
        assert!(links.get(PageCategory::Team).is_empty());
    }

    #[test]
    fn a_link_lands_in_at_most_one_category() {
        // Text says careers, path says about: configured category order
        // decides, not path specificity.
        let html = r#"<html><body><a href="/about/careers">Careers</a></body></html>"#;

        let links = analyzer().find_relevant_pages(html);

        assert_eq!(
            urls(&links, PageCategory::About),
            vec!["https://example.com/about/careers"]
        );
        assert!(links.get(PageCategory::Careers).is_empty());
    }

    #[test]
    fn matches_keywords_in_url_paths() {
        let html = r#"
            <html><body>
              <a href="/en/jobs/">1</a>
              <a href="/our-team">2</a>
              <a href="/pricing.html">3</a>
              <a href="/news">4</a>
            </body></html>"#;

        let links = analyzer().find_relevant_pages(html);

        assert_eq!(
            urls(&links, PageCategory::Careers),
            vec!["https://example.com/en/jobs/"]
        );
        assert_eq!(
            urls(&links, PageCategory::Team),
            vec!["https://example.com/our-team"]
        );
        assert_eq!(
            urls(&links, PageCategory::ProductServices),
            vec!["https://example.com/pricing.html"]
        );
        assert_eq!(
            urls(&links, PageCategory::PressNews),
            vec!["https://example.com/news"]
        );
    }

    #[test]
    fn respects_per_category_capacity() {
        let mut html = String::from("<html><body>");
        for i in 0..25 {
            html.push_str(&format!(
                r#"<a href="/company/section{}">About section {}</a>"#,
                i, i
            ));
        }
        html.push_str("</body></html>");

        let links = analyzer().find_relevant_pages(&html);

        assert_eq!(links.get(PageCategory::About).len(), 3);
        assert_eq!(links.total(), 3);
    }

    #[test]
    fn second_run_yields_nothing_new() {
        let html = r#"
            <html><body>
              <a href="/about">About</a>
              <a href="/careers">Careers</a>
            </body></html>"#;

        let mut analyzer = analyzer();
        let first = analyzer.find_relevant_pages(html);
        let second = analyzer.find_relevant_pages(html);

        assert_eq!(first.total(), 2);
        assert_eq!(second.total(), 0);
    }

    #[test]
    fn empty_html_returns_every_category_empty() {
        let links = analyzer().find_relevant_pages("");

        let mut categories = 0;
        for (_, urls) in links.iter() {
            assert!(urls.is_empty());
            categories += 1;
        }
        assert_eq!(categories, PageCategory::ALL.len());
    }
}
