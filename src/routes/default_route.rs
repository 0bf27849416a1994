use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Company site analyzer is running.",
        "available_routes": {
            "GET": ["/health", "/"],
            "POST": ["/analyze (Requires JSON body)"]
        },
        "note": "POST /analyze is a long-running, blocking task."
    }))
}
