use actix_web::web;
use actix_web::HttpResponse;
use anyhow::Context;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::fetch_snippet;
use super::to_response;
use super::SnippetError;
use super::SnippetResponse;
use super::SnippetRow;

#[derive(Deserialize)]
pub struct ListSnippetsQuery {
    pub language: Option<String>,
    pub tag: Option<String>,
}

/// `GET /api/snippets`. List all snippets, most recent first, with optional
/// case-insensitive `language` and `tag` filters.
///
/// Filters are combined with AND when both are present. An unknown language
/// or tag is not an error, just an empty list.
#[tracing::instrument(name = "Listing snippets", skip(query, pool), fields(
    language = ?query.language,
    tag = ?query.tag,
))]
pub async fn list_snippets(
    query: web::Query<ListSnippetsQuery>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, SnippetError> {
    let rows = list_snippet_rows(&query, &pool).await?;

    let mut snippets: Vec<SnippetResponse> = Vec::with_capacity(rows.len());
    for row in rows {
        snippets.push(to_response(row, &pool).await?);
    }
    Ok(HttpResponse::Ok().json(snippets))
}

/// The four filter combinations are spelled out rather than assembled with a
/// query builder; with two optional filters the match is still smaller than
/// the machinery it would replace.
async fn list_snippet_rows(
    query: &ListSnippetsQuery,
    pool: &SqlitePool,
) -> Result<Vec<SnippetRow>, anyhow::Error> {
    const COLUMNS: &str = "s.id, s.title, s.code, s.language, s.description, \
                           s.created_at, s.updated_at";

    let rows: Result<Vec<SnippetRow>, sqlx::Error> = match (&query.language, &query.tag) {
        (None, None) => {
            sqlx::query_as(
                "
                SELECT id, title, code, language, description, created_at, updated_at
                FROM snippets
                ORDER BY created_at DESC, id DESC
            ",
            )
            .fetch_all(pool)
            .await
        }
        (Some(language), None) => {
            sqlx::query_as(&format!(
                "
                SELECT {COLUMNS}
                FROM snippets s
                WHERE lower(s.language) = lower(?1)
                ORDER BY s.created_at DESC, s.id DESC
            "
            ))
            .bind(language)
            .fetch_all(pool)
            .await
        }
        (None, Some(tag)) => {
            sqlx::query_as(&format!(
                "
                SELECT {COLUMNS}
                FROM snippets s
                JOIN snippet_tags st ON st.snippet_id = s.id
                JOIN tags t ON t.id = st.tag_id
                WHERE lower(t.name) = lower(?1)
                ORDER BY s.created_at DESC, s.id DESC
            "
            ))
            .bind(tag)
            .fetch_all(pool)
            .await
        }
        (Some(language), Some(tag)) => {
            sqlx::query_as(&format!(
                "
                SELECT {COLUMNS}
                FROM snippets s
                JOIN snippet_tags st ON st.snippet_id = s.id
                JOIN tags t ON t.id = st.tag_id
                WHERE lower(s.language) = lower(?1) AND lower(t.name) = lower(?2)
                ORDER BY s.created_at DESC, s.id DESC
            "
            ))
            .bind(language)
            .bind(tag)
            .fetch_all(pool)
            .await
        }
    };
    rows.context("Failed to query snippets table")
}

/// `GET /api/snippets/{id}`. A single snippet by id, or 404.
#[tracing::instrument(name = "Getting snippet", skip(pool))]
pub async fn get_snippet(
    path: web::Path<i64>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, SnippetError> {
    let id = path.into_inner();
    let row = fetch_snippet(id, &pool).await?.ok_or(SnippetError::NotFound)?;
    let snippet = to_response(row, &pool).await?;
    Ok(HttpResponse::Ok().json(snippet))
}
