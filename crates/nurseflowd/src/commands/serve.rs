use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use nurseflow_api::{ApiState, build_router};
use nurseflow_engine::BalanceEngine;
use tokio::sync::watch;
use tracing::info;

pub async fn run(config: Option<&Path>, port: u16, auto_tick: bool) -> anyhow::Result<()> {
    info!("nurseflow daemon starting");

    let config = super::load_config(config)?;
    let engine = BalanceEngine::from_config(&config)?;
    let state = ApiState::new(engine.clone()).with_suggest_limit(config.engine.suggest_limit);

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Auto-tick loop ─────────────────────────────────────────

    let tick_handle = if auto_tick {
        let interval = Duration::from_millis(config.engine.tick_interval_ms.max(1));
        let runner = engine.clone();
        Some(tokio::spawn(async move {
            runner.run(interval, shutdown_rx).await;
        }))
    } else {
        None
    };

    // ── Start API server ───────────────────────────────────────

    let router = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, auto_tick, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    if let Some(handle) = tick_handle {
        let _ = handle.await;
    }

    let snapshot = engine.snapshot().await;
    info!(tick = snapshot.tick, "nurseflow daemon stopped");
    Ok(())
}
