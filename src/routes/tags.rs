use actix_web::web;
use actix_web::HttpResponse;
use anyhow::Context;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::routes::SnippetError;

#[derive(Serialize, sqlx::FromRow)]
pub struct TagWithCount {
    pub id: i64,
    pub name: String,
    pub snippet_count: i64,
}

/// `GET /api/tags`. All tags with their snippet counts. Tags are never
/// garbage-collected when their last snippet goes away, so a count of zero is
/// possible.
#[tracing::instrument(name = "Listing tags", skip(pool))]
pub async fn list_tags(pool: web::Data<SqlitePool>) -> Result<HttpResponse, SnippetError> {
    let tags: Vec<TagWithCount> = sqlx::query_as(
        "
        SELECT t.id, t.name, COUNT(st.snippet_id) AS snippet_count
        FROM tags t
        LEFT JOIN snippet_tags st ON st.tag_id = t.id
        GROUP BY t.id, t.name
        ORDER BY t.name
    ",
    )
    .fetch_all(pool.get_ref())
    .await
    .context("Failed to query tags")?;
    Ok(HttpResponse::Ok().json(tags))
}
