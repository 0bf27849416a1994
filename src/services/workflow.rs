use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use url::Url;

use crate::configuration::Settings;
use crate::domain::{AnalysisReport, LlmOutcome, PageCategory, ReviewSnippet, SiteReport};

use super::{
    build_frontier, extract_leadership_info, guess_technologies, save_report, FetchMode,
    OpenaiClient, PageScraper, ReviewFinder, SiteAnalyzer,
};

const GENERIC_COMPANY_TERMS: [&str; 8] = [
    "inc",
    "llc",
    "ltd",
    "corp",
    "corporation",
    "group",
    "co",
    "company",
];
const COMPARISON_KEYWORDS: [&str; 5] = ["vs", "versus", "compare", "alternative", "competitor"];

pub struct AnalysisRequest {
    pub url: String,
    pub company_name: String,
    pub location: Option<String>,
    pub dynamic_main: bool,
}

pub struct AnalysisOutcome {
    pub success: bool,
    pub report: AnalysisReport,
}

/// Runs the whole analysis for one request. Per-step failures are recorded
/// in the report and the pipeline keeps going; the only hard errors are an
/// unusable start URL or analyzer setup failure.
pub async fn run_analysis_task(
    settings: &Settings,
    openai_client: &OpenaiClient,
    request: AnalysisRequest,
) -> anyhow::Result<AnalysisOutcome> {
    let base_url = Url::parse(request.url.trim())
        .with_context(|| format!("Invalid start URL '{}'", request.url))?;
    anyhow::ensure!(
        matches!(base_url.scheme(), "http" | "https"),
        "Invalid start URL '{}': must use http or https",
        request.url
    );

    let mut analyzer = SiteAnalyzer::new(base_url.as_str(), settings.scraper.max_pages_per_category)?;
    let page_scraper = PageScraper::new(&settings.scraper, &settings.webdriver);
    let mut report = SiteReport::new(&base_url, &request.company_name, request.location.as_deref());

    log::info!("--- Starting analysis task for '{}' ---", request.company_name);

    // Step 1: main page
    log::info!("--- Task step 1: scraping main page ---");
    let mode = if request.dynamic_main {
        FetchMode::Dynamic
    } else {
        FetchMode::Static
    };
    let (main_page, main_html) = page_scraper.fetch_and_parse(&base_url, mode).await;
    let main_ok = main_page.success;
    if !main_ok {
        let message = format!(
            "Main page scrape failed: {}",
            main_page
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string())
        );
        log::error!("{}", message);
        report.overall_errors.push(message);
    }
    let main_html = if main_ok && main_html.chars().count() < 100 {
        log::warn!("Main page scrape succeeded but full HTML content seems missing/short");
        String::new()
    } else {
        main_html
    };
    report.main_page = Some(main_page);

    // Step 2: relevant sub-pages
    log::info!("--- Task step 2: finding relevant sub-pages ---");
    if main_ok && !main_html.is_empty() {
        report.discovered_pages = analyzer.find_relevant_pages(&main_html);
        log::info!(
            "Sub-page link analysis complete. Found {} links.",
            report.discovered_pages.total()
        );
    } else {
        log::warn!("Skipping sub-page discovery: main page scrape failed or missing full HTML");
        report
            .overall_errors
            .push("Sub-page discovery skipped: main page failed/missing HTML".to_string());
    }

    // Step 3: scrape sub-pages, extract leadership from about/team pages
    log::info!("--- Task step 3: scraping sub-pages ---");
    let frontier = build_frontier(&report.discovered_pages, settings.scraper.max_total_subpages);
    log::info!(
        "Attempting to scrape {} unique sub-pages (limit: {})...",
        frontier.len(),
        settings.scraper.max_total_subpages
    );
    let delay = Duration::from_secs(settings.scraper.subpage_delay_seconds);
    let mut seen_leaders: HashSet<(String, String)> = HashSet::new();

    for entry in frontier {
        let successful_in_category = report
            .scraped_subpages
            .get(entry.category)
            .iter()
            .filter(|page| page.success)
            .count();
        if successful_in_category >= settings.scraper.max_pages_per_category {
            log::debug!(
                "Skipping {}: category '{}' limit reached",
                entry.url,
                entry.category.as_str()
            );
            continue;
        }

        log::info!("Scraping '{}' page: {}", entry.category.as_str(), entry.url);
        tokio::time::sleep(delay).await;
        let (page, html) = page_scraper.fetch_and_parse(&entry.url, FetchMode::Static).await;

        if page.success {
            if matches!(entry.category, PageCategory::About | PageCategory::Team)
                && !html.is_empty()
            {
                for leader in extract_leadership_info(&html, entry.url.as_str()) {
                    let key = (
                        leader.name.clone(),
                        leader.title.clone().unwrap_or_default(),
                    );
                    if seen_leaders.insert(key) {
                        report.leadership_team.push(leader);
                    }
                }
            }
        } else {
            let message = format!(
                "Sub-page scrape failed ({} - {}): {}",
                entry.category.as_str(),
                entry.url,
                page.error_message
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string())
            );
            log::warn!("{}", message);
            report.overall_errors.push(message);
        }
        report.scraped_subpages.push(entry.category, page);
    }
    log::info!(
        "Finished sub-page stage. Found {} unique leaders.",
        report.leadership_team.len()
    );

    // Step 4: technology guess from the already-fetched main page
    log::info!("--- Task step 4: guessing technology stack ---");
    let tech_info = guess_technologies(&main_html);
    if let Some(message) = &tech_info.error_message {
        report
            .overall_errors
            .push(format!("Technology guess failed: {}", message));
    }
    report.technology_info = Some(tech_info);

    // Step 5: review search + relevance filtering
    log::info!("--- Task step 5: searching and filtering reviews ---");
    let review_finder = ReviewFinder::new(&settings.scraper);
    let raw_snippets = review_finder
        .search_review_sites(&request.company_name, request.location.as_deref())
        .await;
    report.review_snippets = filter_review_snippets(raw_snippets, &request.company_name);
    log::info!(
        "Review search & filter complete. Kept {} relevant snippets.",
        report.review_snippets.len()
    );

    // Step 6: LLM analysis, then assemble and persist the document
    log::info!("--- Task step 6: performing LLM analysis ---");
    let insights = match openai_client.analyze_site(&report).await {
        Ok(insights) => {
            log::info!("LLM analysis completed.");
            LlmOutcome::Insights(insights)
        }
        Err(e) => {
            let message = format!("LLM analysis failed: {}", e);
            log::error!("{}", message);
            report.overall_errors.push(message);
            LlmOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    report.analysis_timestamp = Utc::now();
    let success = report
        .main_page
        .as_ref()
        .map(|page| page.success)
        .unwrap_or(false);
    let mut document = AnalysisReport {
        scrape_analysis: report,
        llm_generated_insights: insights,
    };

    if let Err(e) = save_report(
        &settings.output.dir,
        &request.company_name,
        request.location.as_deref(),
        &document,
    )
    .await
    {
        let message = format!("Could not save output JSON: {}", e);
        log::error!("{}", message);
        document.scrape_analysis.overall_errors.push(message);
    }

    log::info!("--- Analysis task finished (success: {}) ---", success);
    Ok(AnalysisOutcome {
        success,
        report: document,
    })
}

/// Drops snippets that never mention the company and snippets that are
/// comparison/alternative listicles rather than reviews of the company
/// itself.
pub fn filter_review_snippets(
    snippets: Vec<ReviewSnippet>,
    company_name: &str,
) -> Vec<ReviewSnippet> {
    if snippets.is_empty() || company_name.trim().is_empty() {
        return snippets;
    }

    let lowered_name = company_name.to_lowercase();
    let mut variations: Vec<String> = lowered_name
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '&'))
        .filter(|part| part.len() > 2)
        .filter(|part| !GENERIC_COMPANY_TERMS.contains(part))
        .map(|part| part.to_string())
        .collect();
    variations.push(lowered_name);
    log::debug!("Filtering reviews using name variations: {:?}", variations);

    let total = snippets.len();
    let filtered: Vec<ReviewSnippet> = snippets
        .into_iter()
        .filter(|snippet| {
            let title = snippet.title.to_lowercase();
            let haystack = format!("{} {}", title, snippet.link.as_str().to_lowercase());

            let name_match = variations.iter().any(|v| contains_word(&haystack, v));
            if !name_match {
                log::debug!("Filtered out snippet (no name match): '{}'", snippet.title);
                return false;
            }
            let is_comparison = COMPARISON_KEYWORDS.iter().any(|kw| contains_word(&title, kw));
            if is_comparison {
                log::debug!("Filtered out comparison snippet: '{}'", snippet.title);
                return false;
            }
            true
        })
        .collect();

    log::info!(
        "Review filtering: started with {}, kept {} snippets.",
        total,
        filtered.len()
    );
    filtered
}

// Whole-word containment: the match may not touch alphanumeric characters
// on either side. Needles can span several words.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(title: &str, link: &str) -> ReviewSnippet {
        ReviewSnippet {
            title: title.to_string(),
            link: Url::parse(link).unwrap(),
            source_site: "g2".to_string(),
            query_used: None,
        }
    }

    #[test]
    fn word_containment_respects_boundaries() {
        assert!(contains_word("acme robotics reviews", "acme"));
        assert!(contains_word("reviews of acme robotics 2024", "acme robotics"));
        assert!(!contains_word("acmecorp reviews", "acme"));
        assert!(!contains_word("devs reviews", "vs"));
        assert!(contains_word("acme vs rival", "vs"));
    }

    #[test]
    fn keeps_snippets_mentioning_the_company() {
        let snippets = vec![
            snippet(
                "Acme Robotics Reviews 2024",
                "https://www.g2.com/products/acme-robotics/reviews",
            ),
            snippet("Beta Industrial Reviews", "https://www.g2.com/products/beta/reviews"),
        ];

        let filtered = filter_review_snippets(snippets, "Acme Robotics Inc");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Acme Robotics Reviews 2024");
    }

    #[test]
    fn drops_comparison_snippets() {
        let snippets = vec![
            snippet(
                "Acme vs RoboRival: which is better?",
                "https://www.g2.com/compare/acme-vs-roborival",
            ),
            snippet(
                "Acme Robotics Reviews",
                "https://www.g2.com/products/acme/reviews",
            ),
        ];

        let filtered = filter_review_snippets(snippets, "Acme");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Acme Robotics Reviews");
    }

    #[test]
    fn generic_company_suffixes_do_not_match_alone() {
        let snippets = vec![snippet(
            "Some Unrelated Company Reviews",
            "https://www.g2.com/products/unrelated/reviews",
        )];

        let filtered = filter_review_snippets(snippets, "Acme Company Inc");

        assert!(filtered.is_empty());
    }

    #[test]
    fn empty_company_name_keeps_everything() {
        let snippets = vec![snippet("Anything", "https://www.g2.com/anything")];

        let filtered = filter_review_snippets(snippets, "  ");

        assert_eq!(filtered.len(), 1);
    }
}
