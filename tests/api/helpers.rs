use argon2::password_hash::SaltString;
use argon2::Argon2;
use argon2::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;
use once_cell::sync::Lazy;
use snippet_manager::authentication::issue_api_key;
use snippet_manager::authentication::ApiKey;
use snippet_manager::configuration::get_configuration;
use snippet_manager::configuration::AuthScheme;
use snippet_manager::startup::get_connection_pool;
use snippet_manager::startup::Application;
use snippet_manager::telemetry::get_subscriber;
use snippet_manager::telemetry::init_subscriber;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Init a static subscriber once for the whole test binary.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber);
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber);
        }
    };
});

pub struct TestApp {
    pub addr: String,
    pub pool: SqlitePool,
    /// An active key, pre-inserted so api-key tests can authenticate
    pub api_key: ApiKey,
    /// A provisioned user, pre-inserted so basic-auth tests can authenticate
    pub test_user: TestUser,
    client: reqwest::Client,
}

/// Spawn a `TestApp` with the api-key scheme active (the default branch).
pub async fn spawn_app() -> TestApp { spawn_app_with_scheme(AuthScheme::ApiKey).await }

/// Spawn a server bound to a random port, backed by a throwaway SQLite file.
/// The scheme decides which credential check guards the write endpoints.
pub async fn spawn_app_with_scheme(scheme: AuthScheme) -> TestApp {
    // init the tracing subscriber once only
    Lazy::force(&TRACING);

    let cfg = {
        let mut rand_cfg = get_configuration().unwrap();

        // a fresh db file per test keeps tests independent; migrations run in
        // `Application::build`
        rand_cfg.database.filename =
            std::env::temp_dir().join(format!("snippet-manager-test-{}.db", Uuid::new_v4()));
        rand_cfg.database.create_if_missing = true;

        // port 0: the server will be spawned on a random available port,
        // retrieved below via `get_port`
        rand_cfg.application.port = 0;

        rand_cfg.auth.scheme = scheme;

        rand_cfg
    };

    let app = Application::build(cfg.clone()).await.unwrap();
    let addr = format!("http://127.0.0.1:{}", app.get_port());
    let pool = get_connection_pool(&cfg.database);
    tokio::spawn(app.run_until_stopped());

    let api_key = issue_api_key(Some("integration tests"), &pool)
        .await
        .unwrap();
    let test_user = TestUser::generate();
    test_user.store(&pool).await;

    TestApp {
        addr,
        pool,
        api_key,
        test_user,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn get(
        &self,
        path: &str,
    ) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.addr, path))
            .send()
            .await
            .expect("execute request")
    }

    /// `POST /api/snippets`, optionally with an `X-API-Key` header
    pub async fn post_snippet(
        &self,
        body: &serde_json::Value,
        api_key: Option<&str>,
    ) -> reqwest::Response {
        let mut req = self.client.post(format!("{}/api/snippets", self.addr)).json(body);
        if let Some(key) = api_key {
            req = req.header("X-API-Key", key);
        }
        req.send().await.expect("execute request")
    }

    pub async fn put_snippet(
        &self,
        id: i64,
        body: &serde_json::Value,
        api_key: Option<&str>,
    ) -> reqwest::Response {
        let mut req = self
            .client
            .put(format!("{}/api/snippets/{}", self.addr, id))
            .json(body);
        if let Some(key) = api_key {
            req = req.header("X-API-Key", key);
        }
        req.send().await.expect("execute request")
    }

    pub async fn delete_snippet(
        &self,
        id: i64,
        api_key: Option<&str>,
    ) -> reqwest::Response {
        let mut req = self.client.delete(format!("{}/api/snippets/{}", self.addr, id));
        if let Some(key) = api_key {
            req = req.header("X-API-Key", key);
        }
        req.send().await.expect("execute request")
    }

    /// `POST /api/snippets` with HTTP Basic credentials
    pub async fn post_snippet_basic(
        &self,
        body: &serde_json::Value,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/api/snippets", self.addr))
            .basic_auth(username, Some(password))
            .json(body)
            .send()
            .await
            .expect("execute request")
    }

    pub async fn delete_snippet_basic(
        &self,
        id: i64,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        self.client
            .delete(format!("{}/api/snippets/{}", self.addr, id))
            .basic_auth(username, Some(password))
            .send()
            .await
            .expect("execute request")
    }

    /// Raw Authorization header escape hatch for the malformed-header matrix
    pub async fn post_snippet_with_authorization(
        &self,
        body: &serde_json::Value,
        authorization: &str,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/api/snippets", self.addr))
            .header("Authorization", authorization)
            .json(body)
            .send()
            .await
            .expect("execute request")
    }

    /// Count rows directly; "the handler never ran" is verified by the store,
    /// not by the response
    pub async fn snippet_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM snippets")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn api_key_last_used(&self) -> Option<DateTime<Utc>> {
        sqlx::query_scalar("SELECT last_used_at FROM api_keys WHERE id = ?1")
            .bind(self.api_key.id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// A minimal valid creation payload
pub fn sample_snippet() -> serde_json::Value {
    serde_json::json!({
        "title": "Hello World",
        "code": "println!(\"hello\");",
        "language": "rust",
        "tags": ["rust", "beginner"],
    })
}

pub struct TestUser {
    pub user_id: Uuid,
    pub username: String,
    pub password: String,
}

impl TestUser {
    pub fn generate() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            username: Uuid::new_v4().to_string(),
            password: Uuid::new_v4().to_string(),
        }
    }

    async fn store(
        &self,
        pool: &SqlitePool,
    ) {
        let salt = SaltString::generate(&mut rand::thread_rng());
        // these argon2 params correspond with those of the fallback hash in
        // `validate_credentials`
        let password_hash = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(19456, 2, 1, None).unwrap(),
        )
        .hash_password(self.password.as_bytes(), &salt)
        .unwrap()
        .to_string();

        sqlx::query("INSERT INTO users (user_id, username, password_hash) VALUES (?1, ?2, ?3)")
            .bind(self.user_id)
            .bind(&self.username)
            .bind(&password_hash)
            .execute(pool)
            .await
            .expect("store test user");
    }

    /// Flip the active flag directly in the store
    pub async fn deactivate(
        &self,
        pool: &SqlitePool,
    ) {
        sqlx::query("UPDATE users SET is_active = 0 WHERE user_id = ?1")
            .bind(self.user_id)
            .execute(pool)
            .await
            .expect("deactivate test user");
    }
}
