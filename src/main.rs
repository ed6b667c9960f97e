use snippet_manager::configuration::get_configuration;
use snippet_manager::startup::Application;
use snippet_manager::telemetry::get_subscriber;
use snippet_manager::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main] // requires tokio features: macros, rt-multi-thread
async fn main() -> Result<(), anyhow::Error> {
    // only logs at the specified level and higher are emitted; override with
    // RUST_LOG
    let subscriber = get_subscriber("snippet-manager", "info", std::io::stdout);
    init_subscriber(subscriber);

    let cfg = get_configuration()?;
    let app = Application::build(cfg).await?;
    tracing::info!("listening on port {}", app.get_port());
    app.run_until_stopped().await?;

    Ok(())
}
