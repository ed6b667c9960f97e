use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::fetch_snippet;
use super::insert_snippet;
use super::to_response;
use super::SnippetError;
use crate::domain::NewSnippet;

/// The raw `POST` payload. `title` and `code` are required but still
/// `Option`, so that an absent field produces our "Title is required" message
/// instead of a deserialization error.
#[derive(Deserialize)]
pub struct CreateSnippetPayload {
    pub title: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TryFrom<CreateSnippetPayload> for NewSnippet {
    type Error = String;
    fn try_from(payload: CreateSnippetPayload) -> Result<Self, Self::Error> {
        NewSnippet::parse(
            payload.title.unwrap_or_default(),
            payload.code.unwrap_or_default(),
            payload.language,
            payload.description,
            payload.tags.unwrap_or_default(),
        )
    }
}

/// `POST /api/snippets`. Create a new snippet; 201 with the stored
/// representation on success.
///
/// This handler knows nothing about authentication -- by the time it runs,
/// the credential middleware has already let the request through.
#[tracing::instrument(name = "Creating snippet", skip_all)]
pub async fn create_snippet(
    payload: web::Json<CreateSnippetPayload>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, SnippetError> {
    let new_snippet: NewSnippet = payload
        .into_inner()
        .try_into()
        .map_err(SnippetError::ValidationError)?;

    let snippet_id = insert_snippet(&new_snippet, &pool).await?;

    // read back through the same path that serves GET, so the 201 body is
    // exactly what a subsequent fetch would return
    let row = fetch_snippet(snippet_id, &pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("snippet vanished immediately after insert"))?;
    let snippet = to_response(row, &pool).await?;

    Ok(HttpResponse::Created().json(snippet))
}
