use std::sync::Arc;

use anyhow::Result;
use sofia_http::{AppState, create_router};

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let state = Arc::new(AppState::from_env()?);
    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting proxy server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
