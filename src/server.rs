use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span, warn};

use crate::config::Config;
use crate::migration::Migrator;
use crate::routes;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// The API wrapped in request-id, tracing and CORS middleware.
///
/// A request id is assigned (or kept, when the client sent `x-request-id`)
/// before the trace span opens, and echoed on the response.
pub fn router(db: DatabaseConnection, config: &Config) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        info_span!(
            "http_request",
            method = ?request.method(),
            uri = %request.uri(),
            request_id = %request_id
        )
    });

    routes::app(db)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace_layer)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(&config.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(origins)
        .allow_headers([CONTENT_TYPE])
}

/// Connect to the database, migrating first when configured to.
///
/// # Errors
///
/// Connection or migration failure.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.connect_options()).await?;
    if config.run_migrations {
        info!("running migrations");
        Migrator::up(&db, None).await?;
    }
    Ok(db)
}

/// Bind and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Database, bind or server failure.
pub async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect(&config).await?;
    let app = router(db, &config);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!(address = %address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use clap::Parser;
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let config = Config::try_parse_from(["storecrate", "--database-url", "sqlite::memory:"]).unwrap();
        let db = Database::connect("sqlite::memory:").await.unwrap();
        router(db, &config)
    }

    #[tokio::test]
    async fn test_request_id_is_assigned() {
        let app = test_router().await;
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        let request_id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(!request_id.to_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let app = test_router().await;
        let request = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-42");
    }
}
