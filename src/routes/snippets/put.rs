use actix_web::web;
use actix_web::HttpResponse;
use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::fetch_snippet;
use super::replace_tags;
use super::to_response;
use super::SnippetError;
use super::SnippetRow;
use crate::domain::SnippetCode;
use crate::domain::SnippetLanguage;
use crate::domain::SnippetTitle;
use crate::domain::TagName;

/// All fields are optional - only provided fields will be updated. A provided
/// `tags` list replaces the snippet's tag set wholesale.
#[derive(Deserialize)]
pub struct UpdateSnippetPayload {
    pub title: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// `PUT /api/snippets/{id}`. Partial update of an existing snippet.
#[tracing::instrument(name = "Updating snippet", skip(payload, pool))]
pub async fn update_snippet(
    path: web::Path<i64>,
    payload: web::Json<UpdateSnippetPayload>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, SnippetError> {
    let id = path.into_inner();
    let mut row = fetch_snippet(id, &pool).await?.ok_or(SnippetError::NotFound)?;
    let payload = payload.into_inner();

    // parse every provided field before writing anything, so a bad `code`
    // cannot leave behind a half-applied update
    if let Some(title) = payload.title {
        let title = SnippetTitle::parse(title).map_err(SnippetError::ValidationError)?;
        row.title = title.as_ref().to_owned();
    }
    if let Some(code) = payload.code {
        let code = SnippetCode::parse(code).map_err(SnippetError::ValidationError)?;
        row.code = code.as_ref().to_owned();
    }
    if let Some(language) = payload.language {
        let language =
            SnippetLanguage::parse(Some(language)).map_err(SnippetError::ValidationError)?;
        row.language = language.as_ref().to_owned();
    }
    if let Some(description) = payload.description {
        let description = description.trim().to_owned();
        row.description = (!description.is_empty()).then_some(description);
    }

    let tags: Option<Vec<TagName>> = payload.tags.map(TagName::parse_list);

    row.updated_at = Utc::now();
    store_update(&row, &pool).await?;
    if let Some(tags) = tags {
        replace_tags(id, &tags, &pool).await?;
    }

    let row = fetch_snippet(id, &pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("snippet vanished mid-update"))?;
    let snippet = to_response(row, &pool).await?;
    Ok(HttpResponse::Ok().json(snippet))
}

async fn store_update(
    row: &SnippetRow,
    pool: &SqlitePool,
) -> Result<(), anyhow::Error> {
    sqlx::query(
        "
        UPDATE snippets
        SET title = ?1, code = ?2, language = ?3, description = ?4, updated_at = ?5
        WHERE id = ?6
    ",
    )
    .bind(&row.title)
    .bind(&row.code)
    .bind(&row.language)
    .bind(&row.description)
    .bind(row.updated_at)
    .bind(row.id)
    .execute(pool)
    .await
    .context("Failed to update snippet")?;
    Ok(())
}
