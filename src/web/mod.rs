//! Web layer - server-rendered pages and form handlers.
//!
//! This module provides the HTTP interface for `SkinCheck`: the router, the
//! shared application state, and the server loop with graceful shutdown.

/// Page handlers (home, product check, allergies, allergens, users)
pub mod pages;
/// HTML rendering helpers
pub mod render;

use crate::{config::settings::ServerSettings, errors::Result};
use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

/// Shared data available to all handlers.
/// Holds the database connection; everything else is per-request.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all database operations
    pub database: Arc<DatabaseConnection>,
}

impl AppState {
    /// Creates a new `AppState` around a shared database connection.
    #[must_use]
    pub const fn new(database: Arc<DatabaseConnection>) -> Self {
        Self { database }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home::index))
        .route("/health", get(pages::home::health))
        .route("/product", get(pages::product::form).post(pages::product::check))
        .route(
            "/allergies",
            get(pages::allergies::list).post(pages::allergies::create),
        )
        .route(
            "/allergies/:id",
            get(pages::allergies::edit).post(pages::allergies::update),
        )
        .route("/allergies/:id/notes", post(pages::allergies::notes))
        .route("/allergies/:id/deactivate", post(pages::allergies::deactivate))
        .route("/allergies/:id/reactivate", post(pages::allergies::reactivate))
        .route("/allergens", get(pages::allergens::list))
        .route("/allergens/:id/toggle", post(pages::allergens::toggle))
        .route("/users", get(pages::users::list).post(pages::users::create))
        .route("/users/:id", get(pages::users::detail))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until Ctrl+C or SIGTERM.
pub async fn serve(settings: &ServerSettings, database: DatabaseConnection) -> Result<()> {
    let app = router(AppState::new(Arc::new(database)));

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::{
        body::Body,
        http::{Request, Response, header},
    };
    use tower::ServiceExt;

    /// Wraps a test database so it can back several routers in one test.
    pub fn shared(db: DatabaseConnection) -> Arc<DatabaseConnection> {
        Arc::new(db)
    }

    pub fn app(db: &Arc<DatabaseConnection>) -> Router {
        router(AppState::new(Arc::clone(db)))
    }

    pub async fn get(app: Router, uri: &str) -> Response<Body> {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(req).await.unwrap()
    }

    pub async fn post_form(app: Router, uri: &str, body: &str) -> Response<Body> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.oneshot(req).await.unwrap()
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub fn location(response: &Response<Body>) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::test_support::*;
    use crate::{errors::Result, test_utils::setup_test_db};
    use axum::http::{StatusCode, header};

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let db = setup_test_db().await?;
        let db = shared(db);

        let response = get(app(&db), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        assert_eq!(body_text(response).await, "OK");

        Ok(())
    }

    #[tokio::test]
    async fn test_routers_share_one_connection() -> Result<()> {
        let db = setup_test_db().await?;
        let db = shared(db);

        let writer = app(&db);
        let reader = app(&db);

        let response = post_form(writer, "/users", "username=dana").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(body_text(get(reader, "/users").await).await.contains(">dana</a>"));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() -> Result<()> {
        let db = setup_test_db().await?;
        let db = shared(db);

        let response = get(app(&db), "/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }
}
