use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use sqlx::SqlitePool;
use uuid::Uuid;

/// A provisioned API key. Possession of the token implies permission to
/// write; there is no identity claim beyond the optional label.
///
/// The token is stored as plaintext and validated by direct equality lookup,
/// with no timing-attack mitigation -- see docs/auth-comparison.md for the
/// trade-off discussion before changing either.
#[derive(Debug, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,
    pub token: String,
    pub label: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Produce a fresh token: 32 bytes (256 bits) from the OS entropy source,
/// hex-encoded to 64 chars. `OsRng` is a CSPRNG; `thread_rng` would also do,
/// but reaching for the OS source directly makes the intent unmissable.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Create and persist a new key. Keys are only ever issued out of band (by
/// the seed binary or an operator), never via the HTTP surface.
#[tracing::instrument(name = "Issuing API key", skip(pool))]
pub async fn issue_api_key(
    label: Option<&str>,
    pool: &SqlitePool,
) -> Result<ApiKey, anyhow::Error> {
    let key = ApiKey {
        id: Uuid::new_v4(),
        token: generate_token(),
        label: label.map(ToOwned::to_owned),
        is_active: true,
        created_at: Utc::now(),
        last_used_at: None,
    };
    sqlx::query(
        "
        INSERT INTO api_keys (id, token, label, is_active, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
    ",
    )
    .bind(key.id)
    .bind(&key.token)
    .bind(&key.label)
    .bind(key.is_active)
    .bind(key.created_at)
    .execute(pool)
    .await
    .context("Failed to insert API key")?;
    Ok(key)
}

/// Look up an -active- record matching the presented token. On a match, the
/// key's `last_used_at` is advanced as an observable side effect; failed
/// lookups never touch the store. Concurrent requests with the same key may
/// race on the timestamp, which is accepted (best-effort telemetry, not a
/// correctness-critical field).
#[tracing::instrument(name = "Validating API key", skip(token, pool))]
pub async fn validate_api_key(
    token: &str,
    pool: &SqlitePool,
) -> Result<Option<ApiKey>, anyhow::Error> {
    let key: Option<ApiKey> = sqlx::query_as(
        "
        SELECT id, token, label, is_active, created_at, last_used_at
        FROM api_keys
        WHERE token = ?1 AND is_active = 1
    ",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .context("Failed to query api_keys table")?;

    let Some(mut key) = key else {
        return Ok(None);
    };

    let now = Utc::now();
    sqlx::query("UPDATE api_keys SET last_used_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(key.id)
        .execute(pool)
        .await
        .context("Failed to record API key usage")?;
    key.last_used_at = Some(now);

    Ok(Some(key))
}

/// Revocation: flip the active flag, keep the row. Rotation is "issue a new
/// key, deactivate the old one"; tokens are never rewritten in place.
#[tracing::instrument(name = "Deactivating API key", skip(pool))]
pub async fn deactivate_api_key(
    id: Uuid,
    pool: &SqlitePool,
) -> Result<(), anyhow::Error> {
    sqlx::query("UPDATE api_keys SET is_active = 0 WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to deactivate API key")?;
    Ok(())
}
