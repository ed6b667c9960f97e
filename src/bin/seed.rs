//! Database initialization and seed data.
//!
//! Run this binary to create the database and populate it with sample
//! snippets, a test user, and an API key:
//!
//! ```sh
//!     cargo run --bin seed            # no-op if snippets already exist
//!     cargo run --bin seed -- --reset # wipe rows first, then seed
//! ```

use anyhow::Context;
use secrecy::ExposeSecret;
use secrecy::Secret;
use snippet_manager::authentication::compute_password_hash;
use snippet_manager::authentication::issue_api_key;
use snippet_manager::configuration::get_configuration;
use snippet_manager::domain::NewSnippet;
use snippet_manager::routes::insert_snippet;
use snippet_manager::startup::get_connection_pool;
use sqlx::SqlitePool;
use uuid::Uuid;

// dev-only credentials, printed on every seed run; rotate anything that
// matters before exposing the server beyond localhost
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "snippets123";

struct SampleSnippet {
    title: &'static str,
    language: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    code: &'static str,
}

const SAMPLE_SNIPPETS: &[SampleSnippet] = &[
    SampleSnippet {
        title: "Actix Basic Route",
        language: "rust",
        description: "A minimal actix-web handler that returns JSON data.",
        tags: &["rust", "web", "beginner"],
        code: r#"use actix_web::{web, App, HttpResponse, HttpServer};

async fn hello() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Hello, World!",
        "status": "success",
    }))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    HttpServer::new(|| App::new().route("/api/hello", web::get().to(hello)))
        .bind("127.0.0.1:8080")?
        .run()
        .await
}"#,
    },
    SampleSnippet {
        title: "Python List Comprehension Examples",
        language: "python",
        description: "Common list comprehension patterns in Python.",
        tags: &["python", "beginner", "utility"],
        code: r#"squares = [x**2 for x in range(10)]
evens = [x for x in range(20) if x % 2 == 0]

# flatten a 2D list
matrix = [[1, 2, 3], [4, 5, 6]]
flat = [num for row in matrix for num in row]

# dict and set comprehensions
word_lengths = {word: len(word) for word in ['hello', 'world']}
unique_lengths = {len(word) for word in ['hello', 'world', 'hi']}"#,
    },
    SampleSnippet {
        title: "SQL Recursive CTE",
        language: "sql",
        description: "Walking an employee hierarchy with a recursive common table expression.",
        tags: &["sql", "database", "intermediate"],
        code: r#"WITH RECURSIVE employee_hierarchy AS (
    SELECT id, name, manager_id, 1 AS level
    FROM employees
    WHERE manager_id IS NULL

    UNION ALL

    SELECT e.id, e.name, e.manager_id, eh.level + 1
    FROM employees e
    INNER JOIN employee_hierarchy eh ON e.manager_id = eh.id
)
SELECT id, name, level FROM employee_hierarchy ORDER BY level;"#,
    },
    SampleSnippet {
        title: "Bash Strict Mode Template",
        language: "bash",
        description: "A script template with error handling and argument parsing.",
        tags: &["bash", "devops", "utility"],
        code: r#"#!/bin/bash
set -euo pipefail

usage() { echo "Usage: $(basename "$0") [-v] <input>"; }

VERBOSE=false
while [[ $# -gt 0 ]]; do
    case $1 in
        -v) VERBOSE=true; shift ;;
        -h) usage; exit 0 ;;
        *) INPUT="$1"; shift ;;
    esac
done

[[ -z "${INPUT:-}" ]] && { usage; exit 1; }
echo "Processing $INPUT...""#,
    },
    SampleSnippet {
        title: "CSS Flexbox Centering",
        language: "css",
        description: "Centering elements both ways using flexbox.",
        tags: &["css", "layout", "beginner"],
        code: r#".container-center {
  display: flex;
  justify-content: center;
  align-items: center;
  min-height: 100vh;
}

.container-column {
  display: flex;
  flex-direction: column;
  gap: 16px;
}"#,
    },
    SampleSnippet {
        title: "Rust Retry Helper",
        language: "rust",
        description: "Retrying a fallible operation a fixed number of times.",
        tags: &["rust", "patterns", "utility"],
        code: r#"fn retry<T, E>(attempts: usize, mut op: impl FnMut() -> Result<T, E>) -> Result<T, E> {
    let mut last = op();
    for _ in 1..attempts {
        if last.is_ok() {
            break;
        }
        last = op();
    }
    last
}"#,
    },
];

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cfg = get_configuration()?;
    let pool = get_connection_pool(&cfg.database);

    println!("Creating database tables...");
    sqlx::migrate!().run(&pool).await?;

    if std::env::args().any(|arg| arg == "--reset") {
        reset_database(&pool).await?;
    }
    seed_database(&pool).await
}

/// Create tables and insert sample data. A database that already holds
/// snippets is left untouched.
async fn seed_database(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    let snippet_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM snippets")
        .fetch_one(pool)
        .await?;
    if snippet_count > 0 {
        println!("Database already has data. Skipping seed.");
        return Ok(());
    }

    println!("Inserting sample snippets...");
    for sample in SAMPLE_SNIPPETS {
        let snippet = NewSnippet::parse(
            sample.title.to_string(),
            sample.code.to_string(),
            Some(sample.language.to_string()),
            Some(sample.description.to_string()),
            sample.tags.iter().map(ToString::to_string).collect(),
        )
        .map_err(|e| anyhow::anyhow!(e))
        .context("sample snippet failed validation")?;
        insert_snippet(&snippet, pool).await?;
    }

    println!("Creating test user...");
    let password_hash = compute_password_hash(Secret::new(ADMIN_PASSWORD.to_string()))?;
    sqlx::query("INSERT INTO users (user_id, username, password_hash) VALUES (?1, ?2, ?3)")
        .bind(Uuid::new_v4())
        .bind(ADMIN_USERNAME)
        .bind(password_hash.expose_secret())
        .execute(pool)
        .await
        .context("Failed to insert test user")?;

    println!("Issuing API key...");
    let key = issue_api_key(Some("seed"), pool).await?;

    let snippet_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM snippets")
        .fetch_one(pool)
        .await?;
    let tag_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(pool)
        .await?;

    println!();
    println!("{}", "=".repeat(60));
    println!("TEST CREDENTIALS:");
    println!("  Username: {ADMIN_USERNAME}");
    println!("  Password: {ADMIN_PASSWORD}");
    println!("  API key:  {}", key.token);
    println!("{}", "=".repeat(60));
    println!();
    println!("Done! Created {snippet_count} snippets, {tag_count} tags, and 1 user.");
    Ok(())
}

/// Delete all rows (the schema itself stays; migrations own that).
async fn reset_database(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    println!("Clearing existing data...");
    for table in ["snippet_tags", "snippets", "tags", "api_keys", "users"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(pool)
            .await
            .with_context(|| format!("could not clear table {table}"))?;
    }
    Ok(())
}
