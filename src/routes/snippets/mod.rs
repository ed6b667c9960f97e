mod delete;
mod get;
mod post;
mod put;

pub use delete::*;
pub use get::*;
pub use post::*;
pub use put::*;

use std::fmt::Debug;

use actix_web::HttpResponse;
use actix_web::ResponseError;
use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::domain::NewSnippet;
use crate::domain::TagName;
use crate::routes::error_chain_fmt;
use crate::utils::ErrorBody;

/// Shared error type for the snippet endpoints. Everything bubbles up to one
/// of three client-visible outcomes: 400 with the offending constraint, 404,
/// or a generic 500 (the cause goes to the log, not the client).
#[derive(thiserror::Error)]
pub enum SnippetError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Snippet not found")]
    NotFound,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for SnippetError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)?;
        Ok(())
    }
}

impl ResponseError for SnippetError {
    // `error_response` supersedes `status_code`
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            Self::ValidationError(msg) => {
                HttpResponse::BadRequest().json(ErrorBody::new(msg.clone()))
            }
            Self::NotFound => HttpResponse::NotFound().json(ErrorBody::new("Snippet not found")),
            Self::UnexpectedError(_) => {
                HttpResponse::InternalServerError().json(ErrorBody::new("Internal server error"))
            }
        }
    }
}

/// A `snippets` table row, before tags are joined in.
#[derive(Debug, sqlx::FromRow)]
pub struct SnippetRow {
    pub id: i64,
    pub title: String,
    pub code: String,
    pub language: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The JSON representation served to clients.
#[derive(Debug, Serialize)]
pub struct SnippetResponse {
    pub id: i64,
    pub title: String,
    pub code: String,
    pub language: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) async fn fetch_snippet(
    id: i64,
    pool: &SqlitePool,
) -> Result<Option<SnippetRow>, anyhow::Error> {
    sqlx::query_as(
        "
        SELECT id, title, code, language, description, created_at, updated_at
        FROM snippets
        WHERE id = ?1
    ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to query snippets table")
}

async fn fetch_snippet_tags(
    snippet_id: i64,
    pool: &SqlitePool,
) -> Result<Vec<String>, anyhow::Error> {
    sqlx::query_scalar(
        "
        SELECT t.name
        FROM tags t
        JOIN snippet_tags st ON st.tag_id = t.id
        WHERE st.snippet_id = ?1
        ORDER BY t.name
    ",
    )
    .bind(snippet_id)
    .fetch_all(pool)
    .await
    .context("Failed to query snippet tags")
}

/// Join a row with its tag names into the wire shape.
pub(crate) async fn to_response(
    row: SnippetRow,
    pool: &SqlitePool,
) -> Result<SnippetResponse, anyhow::Error> {
    let tags = fetch_snippet_tags(row.id, pool).await?;
    Ok(SnippetResponse {
        id: row.id,
        title: row.title,
        code: row.code,
        language: row.language,
        description: row.description,
        tags,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Get existing tag or create new one, returning its id. Tag names arrive
/// already normalised (`TagName::parse`), so the equality lookup is exact.
async fn get_or_create_tag(
    name: &TagName,
    pool: &SqlitePool,
) -> Result<i64, anyhow::Error> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE name = ?1")
        .bind(name.as_ref())
        .fetch_optional(pool)
        .await
        .context("Failed to query tags table")?;
    if let Some(id) = existing {
        return Ok(id);
    }
    let result = sqlx::query("INSERT INTO tags (name) VALUES (?1)")
        .bind(name.as_ref())
        .execute(pool)
        .await
        .context("Failed to insert tag")?;
    Ok(result.last_insert_rowid())
}

async fn link_tags(
    snippet_id: i64,
    tags: &[TagName],
    pool: &SqlitePool,
) -> Result<(), anyhow::Error> {
    for tag in tags {
        let tag_id = get_or_create_tag(tag, pool).await?;
        // OR IGNORE: linking the same pair twice is a no-op, not an error
        sqlx::query("INSERT OR IGNORE INTO snippet_tags (snippet_id, tag_id) VALUES (?1, ?2)")
            .bind(snippet_id)
            .bind(tag_id)
            .execute(pool)
            .await
            .context("Failed to link tag to snippet")?;
    }
    Ok(())
}

/// Drop all of a snippet's tag links and relink the given set. Orphaned tags
/// are left in place (their ids stay stable for clients holding them).
pub(crate) async fn replace_tags(
    snippet_id: i64,
    tags: &[TagName],
    pool: &SqlitePool,
) -> Result<(), anyhow::Error> {
    sqlx::query("DELETE FROM snippet_tags WHERE snippet_id = ?1")
        .bind(snippet_id)
        .execute(pool)
        .await
        .context("Failed to clear snippet tags")?;
    link_tags(snippet_id, tags, pool).await
}

/// Only db logic is performed here; this is independent of web framework
/// (the `seed` binary inserts through the same path as `POST`).
#[tracing::instrument(name = "Inserting new snippet", skip(new_snippet, pool))]
pub async fn insert_snippet(
    new_snippet: &NewSnippet,
    pool: &SqlitePool,
) -> Result<i64, anyhow::Error> {
    let now = Utc::now();
    let result = sqlx::query(
        "
        INSERT INTO snippets (title, code, language, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ",
    )
    .bind(new_snippet.title.as_ref())
    .bind(new_snippet.code.as_ref())
    .bind(new_snippet.language.as_ref())
    .bind(&new_snippet.description)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to insert snippet")?;

    let snippet_id = result.last_insert_rowid();
    link_tags(snippet_id, &new_snippet.tags, pool).await?;
    Ok(snippet_id)
}
