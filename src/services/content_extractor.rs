use std::collections::HashSet;

use scraper::{ElementRef, Html, Node, Selector};

use crate::configuration::ScraperSettings;
use crate::domain::ExtractedContent;

// Subtrees that never contribute page content.
const EXCLUDED_TAGS: [&str; 8] = [
    "script", "style", "nav", "footer", "header", "aside", "form", "button",
];

// Checked in priority order before falling back to body.
const MAIN_REGION_SELECTORS: [&str; 5] = ["main", "article", r#"[role="main"]"#, "#content", ".content"];

const BOILERPLATE_PHRASES: [&str; 4] = [
    "copyright",
    "all rights reserved",
    "privacy policy",
    "terms of use",
];
const BOILERPLATE_MAX_CHARS: usize = 150;

pub(crate) fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_excluded_tag(name: &str) -> bool {
    EXCLUDED_TAGS.contains(&name)
}

pub(crate) fn in_excluded_subtree(element: ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_excluded_tag(ancestor.value().name()))
}

/// Descendant text with excluded subtrees left out, whitespace-normalized.
pub(crate) fn collect_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text_into(element, &mut out);
    clean_text(&out)
}

fn collect_text_into(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push(' ');
                out.push_str(text);
            }
            Node::Element(child_element) => {
                if is_excluded_tag(child_element.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text_into(child_ref, out);
                }
            }
            _ => {}
        }
    }
}

fn has_child_elements(element: ElementRef) -> bool {
    element.children().any(|child| child.value().is_element())
}

fn has_direct_text(element: ElementRef) -> bool {
    element.children().any(|child| match child.value() {
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}

/// Pulls title, description, headings and body paragraphs out of raw HTML.
/// Extraction is best-effort and never fails: whatever could not be found
/// stays unset or empty.
pub struct ContentExtractor {
    min_paragraph_chars: usize,
    min_paragraph_words: usize,
    max_paragraphs: usize,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        ContentExtractor {
            min_paragraph_chars: 50,
            min_paragraph_words: 5,
            max_paragraphs: 75,
        }
    }
}

impl ContentExtractor {
    pub fn new(settings: &ScraperSettings) -> Self {
        ContentExtractor {
            min_paragraph_chars: settings.min_paragraph_chars,
            min_paragraph_words: settings.min_paragraph_words,
            max_paragraphs: settings.max_paragraphs,
        }
    }

    pub fn extract(&self, html: &str, url: &str) -> ExtractedContent {
        if html.trim().is_empty() {
            log::warn!("No HTML content to extract from {}", url);
            return ExtractedContent::default();
        }

        let document = Html::parse_document(html);

        ExtractedContent {
            title: extract_title(&document),
            meta_description: extract_meta_description(&document),
            h1_headings: extract_h1_headings(&document),
            paragraphs: self.extract_paragraphs(&document, url),
        }
    }

    fn extract_paragraphs(&self, document: &Html, url: &str) -> Vec<String> {
        let region = match find_main_region(document) {
            Some(region) => region,
            None => {
                log::warn!(
                    "Could not find main content area for {}, text extraction might be limited",
                    url
                );
                return Vec::new();
            }
        };

        let candidate_selector = Selector::parse("p, li, div, span, td").unwrap();
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates: Vec<String> = Vec::new();

        for element in region.select(&candidate_selector) {
            if in_excluded_subtree(element) {
                continue;
            }

            let text = collect_text(element);
            if text.chars().count() < self.min_paragraph_chars
                || text.split_whitespace().count() < self.min_paragraph_words
            {
                continue;
            }

            // A pure wrapper around child elements duplicates whatever its
            // descendants already yield.
            if has_child_elements(element) && !has_direct_text(element) {
                continue;
            }

            let lowered = text.to_lowercase();
            if text.chars().count() < BOILERPLATE_MAX_CHARS
                && BOILERPLATE_PHRASES.iter().any(|p| lowered.contains(p))
            {
                continue;
            }

            if seen.insert(text.clone()) {
                candidates.push(text);
            }
        }

        // Longest blocks win; anything contained in an already-kept block
        // is a fragment of it.
        candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut paragraphs: Vec<String> = Vec::new();
        for candidate in candidates {
            if paragraphs.len() >= self.max_paragraphs {
                break;
            }
            if paragraphs.iter().any(|kept| kept.contains(&candidate)) {
                continue;
            }
            paragraphs.push(candidate);
        }

        paragraphs
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|title| !title.is_empty())
}

fn extract_meta_description(document: &Html) -> Option<String> {
    meta_content(document, r#"meta[name="description"]"#)
        .or_else(|| meta_content(document, r#"meta[property="og:description"]"#))
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(clean_text)
        .filter(|content| !content.is_empty())
}

fn extract_h1_headings(document: &Html) -> Vec<String> {
    let selector = Selector::parse("h1").unwrap();
    document
        .select(&selector)
        .filter(|el| !in_excluded_subtree(*el))
        .map(collect_text)
        .filter(|heading| !heading.is_empty())
        .collect()
}

fn find_main_region(document: &Html) -> Option<ElementRef> {
    for selector_str in MAIN_REGION_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        if let Some(region) = document
            .select(&selector)
            .find(|el| !in_excluded_subtree(*el))
        {
            return Some(region);
        }
    }

    let body = Selector::parse("body").unwrap();
    document.select(&body).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> ExtractedContent {
        ContentExtractor::default().extract(html, "https://example.com")
    }

    #[test]
    fn extracts_title_description_and_headings() {
        let html = r#"
            <html>
              <head>
                <title>  Acme   Robotics
                    - Home </title>
                <meta name="description" content="  Industrial   automation  ">
              </head>
              <body>
                <h1>Welcome to Acme</h1>
                <h1>   </h1>
                <h1>Built for factories</h1>
              </body>
            </html>"#;

        let content = extract(html);

        assert_eq!(content.title.as_deref(), Some("Acme Robotics - Home"));
        assert_eq!(
            content.meta_description.as_deref(),
            Some("Industrial automation")
        );
        assert_eq!(
            content.h1_headings,
            vec!["Welcome to Acme", "Built for factories"]
        );
    }

    #[test]
    fn falls_back_to_og_description() {
        let html = r#"
            <html><head>
              <meta name="description" content="   ">
              <meta property="og:description" content="Fallback description">
            </head><body></body></html>"#;

        let content = extract(html);

        assert_eq!(
            content.meta_description.as_deref(),
            Some("Fallback description")
        );
    }

    #[test]
    fn skips_headings_inside_boilerplate_regions() {
        let html = r#"
            <html><body>
              <header><h1>Site header banner</h1></header>
              <h1>Real heading</h1>
              <footer><h1>Footer heading</h1></footer>
            </body></html>"#;

        let content = extract(html);

        assert_eq!(content.h1_headings, vec!["Real heading"]);
    }

    #[test]
    fn ignores_navigation_and_script_text() {
        let html = r#"
            <html><body>
              <nav><p>Home About Careers Contact Products Pricing and more links</p></nav>
              <script>var analyticsPayload = "this is definitely not page content at all";</script>
              <p>Acme builds industrial robots that assemble electronics for manufacturers worldwide.</p>
            </body></html>"#;

        let content = extract(html);

        assert_eq!(
            content.paragraphs,
            vec!["Acme builds industrial robots that assemble electronics for manufacturers worldwide."]
        );
    }

    #[test]
    fn wrapper_without_direct_text_is_not_double_counted() {
        let html = r#"
            <html><body>
              <div>
                <span>Acme has shipped over nine thousand robotic arms to customers since 2010.</span>
              </div>
            </body></html>"#;

        let content = extract(html);

        assert_eq!(
            content.paragraphs,
            vec!["Acme has shipped over nine thousand robotic arms to customers since 2010."]
        );
    }

    #[test]
    fn enforces_minimum_length_and_word_count() {
        let html = r#"
            <html><body>
              <p>Too short to keep here.</p>
              <p>Aaaaaaaaaaaaaaaaaa Bbbbbbbbbbbbbbbbbb Cccccccccccccccccc Dddddddddddddddddd</p>
              <p>This paragraph is long enough and has plenty of words to clear both thresholds.</p>
            </body></html>"#;

        let content = extract(html);

        assert_eq!(
            content.paragraphs,
            vec!["This paragraph is long enough and has plenty of words to clear both thresholds."]
        );
    }

    #[test]
    fn drops_paragraphs_contained_in_longer_ones() {
        let long = "Acme Robotics designs and manufactures precision robotic arms for electronics assembly lines. The company operates three plants across Europe.";
        let fragment = "Acme Robotics designs and manufactures precision robotic arms for electronics assembly lines.";
        let html = format!(
            "<html><body><p>{}</p><div>{}</div></body></html>",
            long, fragment
        );

        let content = extract(&html);

        assert_eq!(content.paragraphs, vec![long]);
    }

    #[test]
    fn drops_short_boilerplate_phrases() {
        let html = r#"
            <html><body>
              <p>Copyright 2024 Acme Robotics. All rights reserved worldwide always.</p>
              <p>Acme builds industrial robots that assemble electronics for manufacturers worldwide.</p>
            </body></html>"#;

        let content = extract(html);

        assert_eq!(
            content.paragraphs,
            vec!["Acme builds industrial robots that assemble electronics for manufacturers worldwide."]
        );
    }

    #[test]
    fn prefers_main_region_over_rest_of_body() {
        let html = r#"
            <html><body>
              <div>Sidebar promotion text that is long enough to qualify as a paragraph easily.</div>
              <main>
                <p>Main region content describing what the company actually does every day.</p>
              </main>
            </body></html>"#;

        let content = extract(html);

        assert_eq!(
            content.paragraphs,
            vec!["Main region content describing what the company actually does every day."]
        );
    }

    #[test]
    fn empty_input_yields_empty_record() {
        let content = extract("");

        assert_eq!(content, ExtractedContent::default());
    }
}
