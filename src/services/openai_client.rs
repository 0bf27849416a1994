use std::collections::BTreeSet;

use anyhow::Context;
use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};

use crate::domain::{LeadershipInfo, LlmInsights, ReviewSnippet, SiteReport, TechnologyInfo};

const MODEL: &str = "gpt-4o-mini";
const MAX_INPUT_TEXT_CHARS: usize = 20_000;
const MAX_LEADERSHIP_SUMMARY: usize = 15;
const MAX_REVIEW_SNIPPETS_SUMMARY: usize = 10;

pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
}

impl Default for OpenaiClient {
    fn default() -> Self {
        OpenaiClient {
            client: Client::new(),
        }
    }
}

impl OpenaiClient {
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        OpenaiClient {
            client: Client::with_config(config),
        }
    }

    /// Sends the assembled evidence to the model and parses the response
    /// into the expected analysis structure.
    pub async fn analyze_site(&self, report: &SiteReport) -> anyhow::Result<LlmInsights> {
        let prompt = build_analysis_prompt(report);
        log::info!(
            "Sending analysis prompt for '{}' ({} chars)",
            report.input_company_name,
            prompt.chars().count()
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(MODEL)
            .temperature(0.4)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .max_tokens(4096_u32)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let first_choice = response
            .choices
            .first()
            .context("No choices in Openai response")?
            .message
            .content
            .clone()
            .context("No content in Openai response")?;

        parse_insights(&first_choice)
    }
}

/// Parses the model output, tolerating code fences and an optional
/// `llm_analysis` wrapper object.
pub fn parse_insights(response_text: &str) -> anyhow::Result<LlmInsights> {
    let cleaned = strip_code_fences(response_text);
    let value: serde_json::Value =
        serde_json::from_str(cleaned).context("failed to decode LLM JSON response")?;
    let analysis = match value.get("llm_analysis") {
        Some(inner) => inner.clone(),
        None => value,
    };
    serde_json::from_value(analysis).context("LLM JSON response structure incorrect")
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else {
        trimmed
    }
}

pub fn build_analysis_prompt(report: &SiteReport) -> String {
    let mut combined_text = String::new();

    match &report.main_page {
        Some(page) if page.success => {
            combined_text.push_str(&prepare_text_snippet(
                "Main Page Title",
                option_as_slice(&page.title),
                500,
            ));
            combined_text.push_str(&prepare_text_snippet(
                "Main Page Description",
                option_as_slice(&page.meta_description),
                500,
            ));
            let key_paragraphs: Vec<String> = page.paragraphs.iter().take(5).cloned().collect();
            combined_text.push_str(&prepare_text_snippet(
                "Main Page Key Paragraphs",
                &key_paragraphs,
                1500,
            ));
        }
        _ => combined_text.push_str("Main Page Info: Scrape failed or no data.\n"),
    }

    for (category, pages) in report.scraped_subpages.iter() {
        let category_paragraphs: Vec<String> = pages
            .iter()
            .filter(|page| page.success)
            .flat_map(|page| page.paragraphs.iter().cloned())
            .collect();
        if !category_paragraphs.is_empty() {
            let label = format!("{} Page Content", title_case(category.as_str()));
            combined_text.push_str(&prepare_text_snippet(&label, &category_paragraphs, 2500));
        }
    }

    if combined_text.chars().count() > MAX_INPUT_TEXT_CHARS {
        log::warn!(
            "Combined text input exceeds limit ({} chars), truncating",
            MAX_INPUT_TEXT_CHARS
        );
        combined_text = combined_text
            .chars()
            .take(MAX_INPUT_TEXT_CHARS)
            .collect::<String>()
            + "... (truncated)";
    }

    let leadership_summary = prepare_leadership_summary(&report.leadership_team);
    let technology_summary = prepare_technology_summary(report.technology_info.as_ref());
    let review_summary = prepare_review_summary(&report.review_snippets);
    let errors_line = if report.overall_errors.is_empty() {
        "Scraping Errors Logged: None".to_string()
    } else {
        format!(
            "Scraping Errors Logged: {}",
            report.overall_errors.join(", ")
        )
    };

    format!(
        r#"**Role:** You are a senior investment analyst specializing in M&A screening and identifying business transformation opportunities. Analyze the following scraped website data for '{company}' ({location}). Base your analysis *strictly* on the provided text snippets, mentioning limitations where data is missing or potentially unreliable.

**Provided Scraped Data:**

{combined_text}

{leadership_summary}

{technology_summary}
*Caveat: Technology guesses are based on basic markup analysis and may be incomplete or inaccurate.*

{review_summary}

{errors_line}

**Analysis Tasks & Output Structure:**

Return a JSON object with *only* the following structure. Populate each field based *solely* on the provided text, unless inference is explicitly requested for a specific field:

```json
{{
  "llm_analysis": {{
    "swot_analysis": {{
      "strengths": ["2-3 key strengths mentioned or clearly implied in the text."],
      "weaknesses": ["1-2 potential weaknesses directly implied by the text; be conservative. If none, state 'None apparent from text'."],
      "opportunities": ["1-2 potential opportunities suggested by the text."],
      "threats": ["1-2 potential threats directly implied or mentioned; be conservative. If none, state 'None apparent from text'."]
    }},
    "potential_transformation_angles": ["1-3 high-level post-acquisition transformation strategies suggested by the company's products and focus areas. This requires strategic inference."],
    "key_executives_found": [{{"name": "Extract Name", "title": "Extract Title"}}],
    "career_page_themes": ["2-4 themes observed in the careers content. If no careers content, state 'No specific career themes identified from text'."],
    "potential_contact_points": ["2-3 *types* of roles or departments that would be logical initial contact points. This requires inference."],
    "explicit_mna_funding_mentions": ["Direct mentions of acquisitions, funding rounds, or major strategic investments found in the press/news content. If none, provide an empty list."],
    "technology_flags": ["Potential flags based *only* on the technology guess list; state low confidence. If the guess failed or is empty, state 'Technology guess unavailable or inconclusive'."],
    "review_site_presence": "One-line summary of which review sites carry relevant results.",
    "data_completeness_notes": ["Significant limitations based on the logged scraping errors or missing key sections."],
    "speculation_caveat": "Analysis is preliminary, based on limited public website data scraped at a specific time. Strategic inferences are speculative."
  }}
}}
```"#,
        company = report.input_company_name,
        location = report.input_location.as_deref().unwrap_or("Location N/A"),
        combined_text = combined_text,
        leadership_summary = leadership_summary,
        technology_summary = technology_summary,
        review_summary = review_summary,
        errors_line = errors_line,
    )
}

// Joins and truncates a list of text strings for the prompt.
fn prepare_text_snippet(label: &str, texts: &[String], max_chars: usize) -> String {
    let joined = texts
        .iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(". ");
    if joined.is_empty() {
        return format!("{}: N/A\n", label);
    }
    let mut truncated: String = joined.chars().take(max_chars).collect();
    if joined.chars().count() > max_chars {
        truncated.push_str("...");
    }
    format!("{}:\n{}\n", label, truncated)
}

fn prepare_leadership_summary(leaders: &[LeadershipInfo]) -> String {
    if leaders.is_empty() {
        return "Leadership Found: None".to_string();
    }
    let mut summary = String::from("Leadership Found (Name - Title):\n");
    let mut count = 0;
    for leader in leaders.iter().take(MAX_LEADERSHIP_SUMMARY) {
        match &leader.title {
            Some(title) => summary.push_str(&format!("- {} - {}\n", leader.name, title)),
            None => summary.push_str(&format!("- {} - (Title not specified)\n", leader.name)),
        }
        count += 1;
    }
    if leaders.len() > count {
        summary.push_str(&format!("... (and {} others found)\n", leaders.len() - count));
    }
    summary
}

fn prepare_review_summary(reviews: &[ReviewSnippet]) -> String {
    if reviews.is_empty() {
        return "Review Site Presence: No relevant snippets found.".to_string();
    }
    let sites_found: BTreeSet<&str> = reviews.iter().map(|r| r.source_site.as_str()).collect();
    let mut summary = String::from("Review Site Presence Summary:\n");
    summary.push_str(&format!(
        "- Found relevant links on: {}\n",
        sites_found.into_iter().collect::<Vec<_>>().join(", ")
    ));
    summary.push_str(&format!(
        "- Relevant snippets (top {}):\n",
        MAX_REVIEW_SNIPPETS_SUMMARY
    ));
    for review in reviews.iter().take(MAX_REVIEW_SNIPPETS_SUMMARY) {
        summary.push_str(&format!("  - [{}] {}\n", review.source_site, review.title));
    }
    if reviews.len() > MAX_REVIEW_SNIPPETS_SUMMARY {
        summary.push_str(&format!(
            "  ... (and {} more)\n",
            reviews.len() - MAX_REVIEW_SNIPPETS_SUMMARY
        ));
    }
    summary
}

fn prepare_technology_summary(tech_info: Option<&TechnologyInfo>) -> String {
    match tech_info {
        None => "Technology Guess: Failed or not available.".to_string(),
        Some(info) if info.error_message.is_some() => {
            "Technology Guess: Failed or not available.".to_string()
        }
        Some(info) => match &info.guessed_technologies {
            None => "Technology Guess: No specific technologies identified.".to_string(),
            Some(guessed) => format!(
                "Technology Guess (Categories Found):\n{}",
                guessed.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        },
    }
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn option_as_slice(value: &Option<String>) -> &[String] {
    match value {
        Some(value) => std::slice::from_ref(value),
        None => &[],
    }
}
