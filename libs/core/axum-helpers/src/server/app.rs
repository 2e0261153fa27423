use super::shutdown::shutdown_signal;
use crate::errors::not_found;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use core_config::Environment;
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the CORS layer for the configured origins.
///
/// Without an explicit origin list, development falls back to a permissive
/// layer so a local form can talk to the API; production refuses to start.
fn cors_layer(config: &ServerConfig, environment: &Environment) -> io::Result<CorsLayer> {
    let Some(origins) = &config.cors_allowed_origins else {
        if environment.is_production() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "CORS_ALLOWED_ORIGIN is required in production. Example: CORS_ALLOWED_ORIGIN=https://finops.example.com",
            ));
        }
        warn!("CORS_ALLOWED_ORIGIN not set, using permissive CORS for development");
        return Ok(CorsLayer::permissive());
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<_, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    info!(origins = ?origins, "CORS configured");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600)))
}

/// Creates the application router with common middleware and documentation.
///
/// - Swagger UI at `/swagger-ui`, spec at `/api-docs/openapi.json`
/// - API routes nested under `/api`
/// - Request tracing, compression and CORS
/// - JSON 404 fallback
///
/// Health endpoints are merged by the caller with [`super::health_router`].
pub fn create_router<T>(
    apis: Router,
    config: &ServerConfig,
    environment: &Environment,
) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors = cors_layer(config, environment)?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Starts the server and waits for SIGINT/SIGTERM.
///
/// Once the signal arrives, in-flight requests drain before this returns.
pub async fn serve(router: Router, config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(paths())]
    struct EmptyDoc;

    #[test]
    fn test_production_requires_cors_origins() {
        let config = ServerConfig::default();
        let result = create_router::<EmptyDoc>(Router::new(), &config, &Environment::Production);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        let config = ServerConfig::default().with_cors_origins(vec!["bad\norigin".to_string()]);
        let result = create_router::<EmptyDoc>(Router::new(), &config, &Environment::Production);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_routes_are_nested_under_api() {
        let apis = Router::new().route("/ping", get(|| async { "pong" }));
        let router =
            create_router::<EmptyDoc>(apis, &ServerConfig::default(), &Environment::Development)
                .unwrap();

        let response = router
            .clone()
            .oneshot(Request::get("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
