use actix_web::HttpResponse;

/// `GET /`. API welcome message and basic info.
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "name": "Snippet Manager API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "snippets": "/api/snippets",
            "languages": "/api/languages",
            "tags": "/api/tags",
        }
    }))
}
