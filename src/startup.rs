use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::error::InternalError;
use actix_web::guard;
use actix_web::web;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web_lab::middleware::from_fn;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing_actix_web::TracingLogger;

use crate::authentication::middleware::require_write_credentials;
use crate::configuration::AuthSettings;
use crate::configuration::DatabaseSettings;
use crate::configuration::Settings;
use crate::routes::create_snippet;
use crate::routes::delete_snippet;
use crate::routes::get_snippet;
use crate::routes::health_check;
use crate::routes::index;
use crate::routes::list_languages;
use crate::routes::list_snippets;
use crate::routes::list_tags;
use crate::routes::update_snippet;
use crate::utils::ErrorBody;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    /// Contains the TCP listener (randomised port in tests) and db pool
    server: Server,
}

impl Application {
    /// Wrapper over `startup::run` that builds a `Server`. Migrations run
    /// here, before the server accepts anything, so a fresh SQLite file is
    /// usable immediately.
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // get the randomised port assigned by OS; this will be saved in the
        // `port` field
        let port = listener.local_addr()?.port();

        let pool = get_connection_pool(&cfg.database);
        sqlx::migrate!().run(&pool).await?;

        let server = run(listener, pool, cfg.auth)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call
    /// (or passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

pub fn get_connection_pool(db_cfg: &DatabaseSettings) -> SqlitePool {
    // connect_lazy only connects when the pool is used for the first time;
    // db-free requests (e.g. health_check) never touch it
    SqlitePoolOptions::new().connect_lazy_with(db_cfg.connection())
}

/// Declares all API endpoints.
///
/// The credential middleware is wrapped around exactly the write resources
/// (POST/PUT/DELETE on snippets); the method guards keep it off the read
/// routes that share those paths. The invariant this layout buys: no write
/// handler is reachable without passing the check, and no read handler ever
/// performs one.
pub fn run(
    listener: TcpListener,
    pool: SqlitePool,
    auth: AuthSettings,
) -> Result<Server, anyhow::Error> {
    // `Data` is externally an `Arc` (for sharing/cloning), internally a
    // `HashMap` (for wrapping arbitrary types)
    let pool = web::Data::new(pool);
    let auth = web::Data::new(auth);

    // note the closure; actix spins up a worker per core, each running its
    // own copy of the `App` built here, which is why everything it captures
    // has to be cloneable
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default()) // wrap the whole app in tracing middleware
            .route("/", web::get().to(index))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/snippets")
                            // the guard must match before the middleware is
                            // consulted, so GETs never see the auth check
                            .guard(guard::Post())
                            .wrap(from_fn(require_write_credentials))
                            .route(web::post().to(create_snippet)),
                    )
                    .service(web::resource("/snippets").route(web::get().to(list_snippets)))
                    .service(
                        web::resource("/snippets/{id}")
                            .guard(guard::Any(guard::Put()).or(guard::Delete()))
                            .wrap(from_fn(require_write_credentials))
                            .route(web::put().to(update_snippet))
                            .route(web::delete().to(delete_snippet)),
                    )
                    .service(web::resource("/snippets/{id}").route(web::get().to(get_snippet)))
                    .route("/languages", web::get().to(list_languages))
                    .route("/tags", web::get().to(list_tags)),
            )
            // with `.app_data`, global state is made available to all
            // endpoints, if specified as args
            .app_data(pool.clone())
            .app_data(auth.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                // an unreadable body is the client's problem, phrased in the
                // same `{error}` shape as every other failure
                InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(ErrorBody::new("Bad request")),
                )
                .into()
            }))
            .default_service(web::route().to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

async fn not_found() -> HttpResponse { HttpResponse::NotFound().json(ErrorBody::new("Not found")) }
