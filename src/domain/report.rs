use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::page::{CategorizedLinks, CategoryMap, ScrapedPage};

/// One executive found on an about/team page.
#[derive(Debug, Clone, Serialize)]
pub struct LeadershipInfo {
    pub name: String,
    pub title: Option<String>,
    pub bio_snippet: Option<String>,
    pub source_url: String,
}

/// A single result scraped from a review-site search.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSnippet {
    pub title: String,
    pub link: Url,
    pub source_site: String,
    pub query_used: Option<String>,
}

/// Best-effort technology fingerprint: category -> detected products.
#[derive(Debug, Clone, Serialize)]
pub struct TechnologyInfo {
    pub guessed_technologies: Option<BTreeMap<String, Vec<String>>>,
    pub error_message: Option<String>,
}

/// Everything scraped for one analysis request, assembled step by step by
/// the workflow. Per-step failures land in `overall_errors` instead of
/// aborting the run.
#[derive(Debug, Serialize)]
pub struct SiteReport {
    pub analysis_id: Uuid,
    pub input_url: String,
    pub input_company_name: String,
    pub input_location: Option<String>,
    pub analysis_timestamp: DateTime<Utc>,
    pub main_page: Option<ScrapedPage>,
    pub discovered_pages: CategorizedLinks,
    pub scraped_subpages: CategoryMap<ScrapedPage>,
    pub leadership_team: Vec<LeadershipInfo>,
    pub technology_info: Option<TechnologyInfo>,
    pub review_snippets: Vec<ReviewSnippet>,
    pub overall_errors: Vec<String>,
}

impl SiteReport {
    pub fn new(input_url: &Url, company_name: &str, location: Option<&str>) -> Self {
        SiteReport {
            analysis_id: Uuid::new_v4(),
            input_url: input_url.to_string(),
            input_company_name: company_name.to_string(),
            input_location: location.map(|l| l.to_string()),
            analysis_timestamp: Utc::now(),
            main_page: None,
            discovered_pages: CategorizedLinks::new(),
            scraped_subpages: CategoryMap::new(),
            leadership_team: Vec::new(),
            technology_info: None,
            review_snippets: Vec::new(),
            overall_errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SwotAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecutiveEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
}

/// The structure the LLM is asked to return. Every field is defaulted so a
/// partially-filled response still deserializes instead of failing the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmInsights {
    pub swot_analysis: Option<SwotAnalysis>,
    pub potential_transformation_angles: Vec<String>,
    pub key_executives_found: Vec<ExecutiveEntry>,
    pub career_page_themes: Vec<String>,
    pub potential_contact_points: Vec<String>,
    pub explicit_mna_funding_mentions: Vec<String>,
    pub technology_flags: Vec<String>,
    pub review_site_presence: String,
    pub data_completeness_notes: Vec<String>,
    pub speculation_caveat: String,
}

impl Default for LlmInsights {
    fn default() -> Self {
        LlmInsights {
            swot_analysis: None,
            potential_transformation_angles: Vec::new(),
            key_executives_found: Vec::new(),
            career_page_themes: Vec::new(),
            potential_contact_points: Vec::new(),
            explicit_mna_funding_mentions: Vec::new(),
            technology_flags: Vec::new(),
            review_site_presence: String::new(),
            data_completeness_notes: Vec::new(),
            speculation_caveat: "Analysis is preliminary, based on limited public data, and \
                includes speculation. Financials and internal operations are unknown."
                .to_string(),
        }
    }
}

/// LLM step result embedded in the final document: either the validated
/// insights or the error that replaced them.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LlmOutcome {
    Insights(LlmInsights),
    Failed { error: String },
}

/// The one JSON document a request produces.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub scrape_analysis: SiteReport,
    pub llm_generated_insights: LlmOutcome,
}
