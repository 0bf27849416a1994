use scraper::{ElementRef, Html, Selector};

use crate::domain::LeadershipInfo;

use super::content_extractor::{collect_text, in_excluded_subtree};

const EXEC_TITLE_KEYWORDS: [&str; 18] = [
    "chief",
    "ceo",
    "cto",
    "cfo",
    "coo",
    "cmo",
    "cro",
    "cpo",
    "founder",
    "co-founder",
    "president",
    "vice president",
    "vp",
    "director",
    "head of",
    "chairman",
    "partner",
    "officer",
];

const MAX_NAME_CHARS: usize = 40;
const MAX_TITLE_CHARS: usize = 100;
const BIO_SNIPPET_CHARS: usize = 300;

/// Pulls (name, title) pairs off about/team pages: a short capitalized
/// heading followed closely by a line carrying an executive keyword. Purely
/// heuristic and best-effort; pages without recognizable markup yield an
/// empty list.
pub fn extract_leadership_info(html: &str, source_url: &str) -> Vec<LeadershipInfo> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let name_selector = Selector::parse("h2, h3, h4, strong, b").unwrap();

    let mut leaders: Vec<LeadershipInfo> = Vec::new();

    for element in document.select(&name_selector) {
        if in_excluded_subtree(element) {
            continue;
        }

        let name = collect_text(element);
        if !is_probable_person_name(&name) {
            continue;
        }

        let title = match find_title_near(element) {
            Some(title) => title,
            None => continue,
        };

        let bio_snippet = element
            .parent()
            .and_then(ElementRef::wrap)
            .map(collect_text)
            .filter(|text| text.chars().count() > name.chars().count() + title.chars().count())
            .map(|text| text.chars().take(BIO_SNIPPET_CHARS).collect());

        log::debug!("Leadership candidate on {}: {} - {}", source_url, name, title);

        leaders.push(LeadershipInfo {
            name,
            title: Some(title),
            bio_snippet,
            source_url: source_url.to_string(),
        });
    }

    log::info!(
        "Leadership extraction on {} found {} candidates",
        source_url,
        leaders.len()
    );
    leaders
}

fn is_probable_person_name(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) || text.chars().count() > MAX_NAME_CHARS {
        return false;
    }
    if contains_title_keyword(text) {
        return false;
    }
    words.iter().all(|word| {
        word.chars().next().map_or(false, |c| c.is_uppercase())
            && word
                .chars()
                .all(|c| c.is_alphabetic() || matches!(c, '.' | '\'' | '-'))
    })
}

fn find_title_near(element: ElementRef) -> Option<String> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take(3)
        .map(collect_text)
        .find(|text| {
            !text.is_empty()
                && text.chars().count() <= MAX_TITLE_CHARS
                && contains_title_keyword(text)
        })
}

fn contains_title_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    EXEC_TITLE_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_names_with_adjacent_titles() {
        let html = r#"
            <html><body><div class="team">
              <div class="member">
                <h3>Jane Doe</h3>
                <p>Chief Executive Officer</p>
                <p>Jane founded the company in 2012 after a decade in industrial automation.</p>
              </div>
              <div class="member">
                <h3>John A. Smith</h3>
                <p>VP of Engineering</p>
              </div>
            </div></body></html>"#;

        let leaders = extract_leadership_info(html, "https://example.com/team");

        assert_eq!(leaders.len(), 2);
        assert_eq!(leaders[0].name, "Jane Doe");
        assert_eq!(leaders[0].title.as_deref(), Some("Chief Executive Officer"));
        assert!(leaders[0].bio_snippet.is_some());
        assert_eq!(leaders[1].name, "John A. Smith");
        assert_eq!(leaders[1].title.as_deref(), Some("VP of Engineering"));
    }

    #[test]
    fn ignores_headings_without_a_nearby_title() {
        let html = r#"
            <html><body>
              <h3>Our Story</h3>
              <p>We started in a garage with a very big idea about robots.</p>
            </body></html>"#;

        let leaders = extract_leadership_info(html, "https://example.com/about");

        assert!(leaders.is_empty());
    }

    #[test]
    fn rejects_title_like_headings_as_names() {
        assert!(!is_probable_person_name("Head of Product"));
        assert!(!is_probable_person_name("Meet the team behind our robots today"));
        assert!(!is_probable_person_name("lowercase name"));
        assert!(is_probable_person_name("Jane Doe"));
        assert!(is_probable_person_name("John A. Smith"));
    }

    #[test]
    fn skips_navigation_and_footer_regions() {
        let html = r#"
            <html><body>
              <footer>
                <strong>Jane Doe</strong>
                <span>Chief Executive Officer</span>
              </footer>
            </body></html>"#;

        let leaders = extract_leadership_info(html, "https://example.com/team");

        assert!(leaders.is_empty());
    }
}
