use axum::ServiceExt;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing_subscriber::EnvFilter;

mod auth;
mod blog;
mod config;
mod error;
mod page;
mod routes;
mod state;
mod store;
mod thumbnail;

#[tokio::main]
async fn main() {
    let config = match config::Config::from_env() {
        Ok(it) => it,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let state = std::sync::Arc::new(state::State::new(&config));
    let app = NormalizePathLayer::trim_trailing_slash().layer(routes::app(state));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("bind address should be available");
    tracing::info!(
        addr = %config.bind_addr,
        store = ?config.store_path,
        "serving post pages"
    );

    axum::serve(
        listener,
        ServiceExt::<axum::extract::Request>::into_make_service(app),
    )
    .await
    .expect("Error serving app")
}
