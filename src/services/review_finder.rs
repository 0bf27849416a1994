use std::time::Duration;

use fake_user_agent::get_rua;
use reqwest::header;
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::configuration::ScraperSettings;
use crate::domain::ReviewSnippet;

use super::content_extractor::clean_text;

const NUM_CAPTCHA_RETRIES: u8 = 3; // Should be > 0
const GOOGLE_URL: &str = "https://www.google.com/search";

pub struct ReviewSiteConfig {
    pub name: &'static str,
    pub domain: &'static str,
    pub query_suffix: &'static str,
    pub priority: u8,
    pub max_results: usize,
}

// Searched top to bottom; order encodes priority.
pub const REVIEW_SITES: [ReviewSiteConfig; 6] = [
    ReviewSiteConfig {
        name: "g2",
        domain: "g2.com",
        query_suffix: r#" "reviews" OR "ratings""#,
        priority: 1,
        max_results: 4,
    },
    ReviewSiteConfig {
        name: "capterra",
        domain: "capterra.com",
        query_suffix: r#" "reviews" OR "alternatives" OR "pricing""#,
        priority: 1,
        max_results: 4,
    },
    ReviewSiteConfig {
        name: "trustpilot",
        domain: "trustpilot.com",
        query_suffix: r#" "reviews" OR "customer experience""#,
        priority: 2,
        max_results: 3,
    },
    ReviewSiteConfig {
        name: "glassdoor",
        domain: "glassdoor.com",
        query_suffix: r#" "company reviews" OR "interview reviews" OR "salaries""#,
        priority: 2,
        max_results: 3,
    },
    ReviewSiteConfig {
        name: "indeed",
        domain: "indeed.com",
        query_suffix: r#" "company reviews" OR "employee reviews""#,
        priority: 3,
        max_results: 2,
    },
    ReviewSiteConfig {
        name: "gartner",
        domain: "gartner.com",
        query_suffix: r#" "reviews" OR "magic quadrant" OR "peer insights""#,
        priority: 3,
        max_results: 2,
    },
];

enum ReviewSearchResult {
    NotFound,
    Results(Vec<ReviewHit>),
    CaptchaBlocked,
}

struct ReviewHit {
    title: String,
    link: Url,
}

#[derive(Serialize)]
struct GoogleQuery {
    q: String,
}

/// Searches external review sites for mentions of a company by scraping
/// search-engine result pages, one site at a time with a delay in between.
pub struct ReviewFinder {
    client: reqwest::Client,
    search_delay: Duration,
    max_total_results: usize,
}

impl ReviewFinder {
    pub fn new(settings: &ScraperSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .build()
            .expect("Failed to build reqwest client");

        ReviewFinder {
            client,
            search_delay: Duration::from_secs(settings.review_search_delay_seconds),
            max_total_results: settings.max_total_review_results,
        }
    }

    pub async fn search_review_sites(
        &self,
        company_name: &str,
        location: Option<&str>,
    ) -> Vec<ReviewSnippet> {
        let mut snippets: Vec<ReviewSnippet> = Vec::new();

        for site in REVIEW_SITES.iter() {
            if snippets.len() >= self.max_total_results {
                log::info!(
                    "Review result cap reached ({}), skipping remaining sites",
                    self.max_total_results
                );
                break;
            }

            let query = build_review_query(site, company_name, location);
            match self.run_search(&query, site).await {
                ReviewSearchResult::Results(hits) => {
                    log::info!("Found {} results on {} for '{}'", hits.len(), site.name, company_name);
                    for hit in hits.into_iter().take(site.max_results) {
                        snippets.push(ReviewSnippet {
                            title: hit.title,
                            link: hit.link,
                            source_site: site.name.to_string(),
                            query_used: Some(query.clone()),
                        });
                    }
                }
                ReviewSearchResult::NotFound => {
                    log::info!("No review results on {} for '{}'", site.name, company_name);
                }
                ReviewSearchResult::CaptchaBlocked => {
                    log::error!("Blocked by captcha while searching {}", site.name);
                }
            }

            tokio::time::sleep(self.search_delay).await;
        }

        snippets
    }

    async fn run_search(&self, query: &str, site: &ReviewSiteConfig) -> ReviewSearchResult {
        let a_tag_selector = Selector::parse("a").unwrap();
        let h3_selector = Selector::parse("h3").unwrap();

        let mut retry_count = 0;

        while retry_count < NUM_CAPTCHA_RETRIES {
            let request = self
                .client
                .get(GOOGLE_URL)
                .query(&GoogleQuery {
                    q: query.to_string(),
                })
                .header(header::USER_AGENT, get_rua());

            match request.send().await {
                Ok(res) => {
                    let html_content = match res.text().await {
                        Ok(text) => text,
                        Err(e) => {
                            log::error!("Failed to read search response body. Error: {:?}", e);
                            retry_count += 1;
                            continue;
                        }
                    };
                    let html_document = Html::parse_document(&html_content);

                    let any_heading = html_document.select(&h3_selector).next().is_some();
                    if !any_heading {
                        if html_content.contains("did not match any documents") {
                            return ReviewSearchResult::NotFound;
                        }
                        log::error!("Blocked by captcha on query: {}", query);
                        retry_count += 1;
                        continue;
                    }

                    let mut hits: Vec<ReviewHit> = Vec::new();
                    for a_tag in html_document.select(&a_tag_selector) {
                        let href = match a_tag.value().attr("href") {
                            Some(href) => href,
                            None => continue,
                        };
                        let heading = match a_tag.select(&h3_selector).next() {
                            Some(heading) => heading,
                            None => continue,
                        };
                        let title = clean_text(&heading.text().collect::<String>());
                        if title.is_empty() {
                            continue;
                        }
                        if let Some(link) = normalize_result_link(href) {
                            let on_site = link
                                .host_str()
                                .map_or(false, |host| host.ends_with(site.domain));
                            if on_site {
                                hits.push(ReviewHit { title, link });
                            }
                        }
                    }
                    return ReviewSearchResult::Results(hits);
                }
                Err(e) => {
                    log::error!("No response from search request, error: {:?}", e);
                    retry_count += 1;
                }
            }
        }

        ReviewSearchResult::CaptchaBlocked
    }
}

fn build_review_query(
    site: &ReviewSiteConfig,
    company_name: &str,
    location: Option<&str>,
) -> String {
    let mut query = format!(
        r#"site:{} "{}"{}"#,
        site.domain, company_name, site.query_suffix
    );
    if let Some(location) = location {
        query.push_str(&format!(r#" "{}""#, location));
    }
    query
}

// Result links come wrapped as /url?q=<target>&... on the no-js result page.
fn normalize_result_link(href: &str) -> Option<Url> {
    let target = match href.strip_prefix("/url?q=") {
        Some(rest) => rest.split('&').next().unwrap_or(rest),
        None => href,
    };
    let url = Url::parse(target).ok()?;
    if matches!(url.scheme(), "http" | "https") {
        Some(url)
    } else {
        None
    }
}
