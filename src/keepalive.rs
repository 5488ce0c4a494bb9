use axum::{routing::get, Router};

const DEFAULT_PORT: u16 = 3000;

/// Answer `GET /` with a trivial "still alive" page. Free-tier hosting
/// idles apps that never receive HTTP traffic, so something has to be
/// listening on `PORT`.
pub async fn serve() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let app = Router::new().route("/", get(|| async { "Bot is running..." }));

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind the keep-alive listener on port {port}: {e}");
            return;
        }
    };

    log::info!("Keep-alive listener up on port {port}");

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Keep-alive listener died: {e}");
    }
}
