use actix_web::web;
use actix_web::HttpResponse;
use anyhow::Context;
use sqlx::SqlitePool;

use super::fetch_snippet;
use super::SnippetError;

/// `DELETE /api/snippets/{id}`. The snippet and its tag links go; the tags
/// themselves stay (see `replace_tags` for the same choice on update).
#[tracing::instrument(name = "Deleting snippet", skip(pool))]
pub async fn delete_snippet(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, SnippetError> {
    let id = path.into_inner();
    fetch_snippet(id, &pool).await?.ok_or(SnippetError::NotFound)?;

    sqlx::query("DELETE FROM snippet_tags WHERE snippet_id = ?1")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .context("Failed to unlink snippet tags")?;
    sqlx::query("DELETE FROM snippets WHERE id = ?1")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .context("Failed to delete snippet")?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Snippet deleted successfully"
    })))
}
