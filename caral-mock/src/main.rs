use caral_mock::{MockState, app};
use std::sync::Arc;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caral_mock=info,tower_http=info".into()),
        )
        .init();

    let addr = std::env::var("CARAL_MOCK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "caral-mock listening on http://{}{} (staff: {} / customer: {})",
        listener.local_addr()?,
        caral_mock::API_PREFIX,
        caral_mock::state::STAFF_EMAIL,
        caral_mock::state::CUSTOMER_EMAIL,
    );

    axum::serve(listener, app(Arc::new(MockState::seeded()))).await?;
    Ok(())
}
