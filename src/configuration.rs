use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub scraper: ScraperSettings,
    pub webdriver: WebdriverSettings,
    pub api_keys: ApiKeySettings,
    pub output: OutputSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct ScraperSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_pages_per_category: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_total_subpages: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub subpage_delay_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_retries: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub retry_delay_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub dynamic_wait_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub review_search_delay_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_total_review_results: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_paragraph_chars: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_paragraph_words: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_paragraphs: usize,
}

#[derive(serde::Deserialize, Clone)]
pub struct WebdriverSettings {
    pub url: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApiKeySettings {
    pub openai: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct OutputSettings {
    pub dir: String,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    let settings = config::Config::builder()
        .add_source(config::File::from(base_path.join("configuration.yaml")))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
