use actix_web::web;
use actix_web::HttpResponse;
use anyhow::Context;
use sqlx::SqlitePool;

use crate::routes::SnippetError;

/// `GET /api/languages`. List of all languages used in snippets, sorted.
/// Languages are normalised to lowercase on write, so no case-folding is
/// needed here.
#[tracing::instrument(name = "Listing languages", skip(pool))]
pub async fn list_languages(pool: web::Data<SqlitePool>) -> Result<HttpResponse, SnippetError> {
    let languages: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT language FROM snippets ORDER BY language")
            .fetch_all(pool.get_ref())
            .await
            .context("Failed to query languages")?;
    Ok(HttpResponse::Ok().json(languages))
}
