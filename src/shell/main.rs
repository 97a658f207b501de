use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use query_pipeline::modules::people::adapters::outbound::people_in_memory::InMemoryPeople;
use query_pipeline::shared::infrastructure::configuration::{env::EnvConfiguration, parsed_or};
use query_pipeline::shared::infrastructure::query_log::tracing_sink::TracingQueryLogSink;
use query_pipeline::shared::infrastructure::transport::http::HttpTransport;
use query_pipeline::shell::{self, composition, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let configuration = EnvConfiguration::from_env();
    let timeout_ms: u64 = parsed_or(&configuration, "Remote", "timeoutMs", 10_000)?;
    let transport = Arc::new(HttpTransport::new(Duration::from_millis(timeout_ms))?);

    // In-memory people for now
    let people = Arc::new(InMemoryPeople::seeded());

    let processor = composition::configure_query_processor(
        &configuration,
        transport,
        people,
        Arc::new(TracingQueryLogSink),
    )?;
    let app = shell::app(AppState::new(processor));

    let addr: SocketAddr = parsed_or(
        &configuration,
        "Server",
        "address",
        SocketAddr::from(([0, 0, 0, 0], 8080)),
    )?;
    tracing::info!("HTTP API: http://{}/api", addr);
    tracing::info!("GraphQL endpoint: http://{}/gql", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
