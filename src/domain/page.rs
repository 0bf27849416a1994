use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use url::Url;

/// Semantic page types used to bucket discovered links. The declaration
/// order of `ALL` is a contract: categories are always matched and reported
/// in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCategory {
    About,
    Team,
    Careers,
    ProductServices,
    PressNews,
    Contact,
    Investors,
}

impl PageCategory {
    pub const ALL: [PageCategory; 7] = [
        PageCategory::About,
        PageCategory::Team,
        PageCategory::Careers,
        PageCategory::ProductServices,
        PageCategory::PressNews,
        PageCategory::Contact,
        PageCategory::Investors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageCategory::About => "about",
            PageCategory::Team => "team",
            PageCategory::Careers => "careers",
            PageCategory::ProductServices => "product_services",
            PageCategory::PressNews => "press_news",
            PageCategory::Contact => "contact",
            PageCategory::Investors => "investors",
        }
    }

    /// Lowercase keywords matched against anchor text and URL paths,
    /// checked in the order given here.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            PageCategory::About => &["about", "about us", "company", "who we are", "overview"],
            PageCategory::Team => &["team", "management", "leadership", "founders", "board"],
            PageCategory::Careers => &[
                "careers",
                "jobs",
                "hiring",
                "work with us",
                "opportunities",
            ],
            PageCategory::ProductServices => &[
                "product",
                "service",
                "solution",
                "platform",
                "technology",
                "features",
                "pricing",
            ],
            PageCategory::PressNews => &[
                "press",
                "news",
                "media",
                "announcements",
                "blog",
                "updates",
                "releases",
            ],
            PageCategory::Contact => &[
                "contact",
                "contact us",
                "support",
                "get in touch",
                "locations",
            ],
            PageCategory::Investors => &[
                "investor relations",
                "investors",
                "ir",
                "financials",
                "sec filings",
            ],
        }
    }
}

/// Per-category lists kept in configured category order. Serializes to a
/// JSON object whose keys appear in that same order, so category iteration
/// order stays externally visible instead of depending on a hash map.
#[derive(Debug, Clone)]
pub struct CategoryMap<T> {
    entries: Vec<(PageCategory, Vec<T>)>,
}

impl<T> CategoryMap<T> {
    pub fn new() -> Self {
        CategoryMap {
            entries: PageCategory::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    pub fn push(&mut self, category: PageCategory, value: T) {
        if let Some((_, values)) = self.entries.iter_mut().find(|(c, _)| *c == category) {
            values.push(value);
        }
    }

    pub fn get(&self, category: PageCategory) -> &[T] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (PageCategory, &[T])> {
        self.entries.iter().map(|(c, values)| (*c, values.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }
}

impl<T> Default for CategoryMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serialize for CategoryMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, values) in &self.entries {
            map.serialize_entry(category.as_str(), values)?;
        }
        map.end()
    }
}

/// Output of the link classifier: validated internal URLs per category.
pub type CategorizedLinks = CategoryMap<Url>;

/// Boilerplate-filtered content pulled out of one HTML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_headings: Vec<String>,
    pub paragraphs: Vec<String>,
}

/// One fetch attempt and whatever content extraction produced for it.
/// `success: false` records keep their place in the report so downstream
/// consumers can see which pages were lost and why.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapedPage {
    pub url: String,
    pub scrape_timestamp: DateTime<Utc>,
    pub success: bool,
    pub is_dynamic_scrape: bool,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_headings: Vec<String>,
    pub paragraphs: Vec<String>,
}

impl ScrapedPage {
    pub fn success(
        url: &Url,
        is_dynamic_scrape: bool,
        status_code: Option<u16>,
        content: ExtractedContent,
    ) -> Self {
        ScrapedPage {
            url: url.to_string(),
            scrape_timestamp: Utc::now(),
            success: true,
            is_dynamic_scrape,
            status_code,
            error_message: None,
            title: content.title,
            meta_description: content.meta_description,
            h1_headings: content.h1_headings,
            paragraphs: content.paragraphs,
        }
    }

    pub fn failure(
        url: &Url,
        is_dynamic_scrape: bool,
        status_code: Option<u16>,
        error_message: String,
    ) -> Self {
        ScrapedPage {
            url: url.to_string(),
            scrape_timestamp: Utc::now(),
            success: false,
            is_dynamic_scrape,
            status_code,
            error_message: Some(error_message),
            title: None,
            meta_description: None,
            h1_headings: Vec::new(),
            paragraphs: Vec::new(),
        }
    }
}
