pub mod content_extractor;
pub mod data_persistance;
pub mod droid;
pub mod frontier;
pub mod leadership_scraper;
pub mod openai_client;
pub mod page_scraper;
pub mod review_finder;
pub mod site_analyzer;
pub mod tech_analyzer;
pub mod workflow;

pub use content_extractor::*;
pub use data_persistance::*;
pub use droid::*;
pub use frontier::*;
pub use leadership_scraper::*;
pub use openai_client::*;
pub use page_scraper::*;
pub use review_finder::*;
pub use site_analyzer::*;
pub use tech_analyzer::*;
pub use workflow::*;
