use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    configuration::Settings,
    services::{run_analysis_task, AnalysisRequest, OpenaiClient},
};

#[derive(Deserialize)]
pub struct AnalyzeBody {
    url: String,
    company_name: String,
    location: Option<String>,
    #[serde(default)]
    dynamic_main: bool,
}

#[post("/analyze")]
async fn analyze(
    settings: web::Data<Settings>,
    openai_client: web::Data<OpenaiClient>,
    body: web::Json<AnalyzeBody>,
) -> HttpResponse {
    if body.url.trim().is_empty() || body.company_name.trim().is_empty() {
        log::warn!("Request aborted: missing required fields.");
        return HttpResponse::BadRequest()
            .json(json!({"error": "Missing required fields: 'url' and 'company_name'"}));
    }

    log::info!(
        "Analysis request valid. Triggering task for '{}'...",
        body.company_name
    );

    // Each request gets its own analyzer and scraper instances; nothing is
    // shared between concurrent analyses.
    let request = AnalysisRequest {
        url: body.url.clone(),
        company_name: body.company_name.clone(),
        location: body.location.clone(),
        dynamic_main: body.dynamic_main,
    };

    match run_analysis_task(&settings, &openai_client, request).await {
        Ok(outcome) if outcome.success => {
            log::info!(
                "Analysis task completed successfully for '{}'.",
                body.company_name
            );
            HttpResponse::Ok().json(&outcome.report)
        }
        Ok(outcome) => {
            log::error!("Analysis task failed for '{}'.", body.company_name);
            HttpResponse::InternalServerError().json(&outcome.report)
        }
        Err(e) => {
            log::error!(
                "Analysis task aborted for '{}': {:?}",
                body.company_name,
                e
            );
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        }
    }
}
