use tracing::{error, info};

mod api;
mod app_state;
mod config;
mod download;
mod openapi;
mod responses;
mod router;
mod telemetry;

pub(crate) use app_state::AppState;

#[tokio::main]
async fn main() {
    telemetry::init();

    let cfg = match config::ServerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    let scratch = gt_core::workspace::scratch_dir(cfg.scratch_dir.as_deref());
    info!(scratch = %scratch.display(), "scratch directory ready");

    let state = AppState::new(gt_events::Registry::new(), cfg.tool_bin.clone(), scratch);
    let app = router::build_router()
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(cfg.addr)
        .await
        .expect("bind server socket");
    info!(addr = %cfg.addr, "listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(err) = server.await {
        error!("http server exited with error: {err}");
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}
