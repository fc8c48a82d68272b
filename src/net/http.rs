use crate::Registry;
use crate::error::ApiError;
use crate::services::validation::AuthBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, extract::State, routing::post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
struct HttpAppCtx {
    registry: Arc<Registry>,
}

/// Run the HTTP server with the auth endpoints
pub async fn serve(addr: std::net::SocketAddr, registry: Arc<Registry>) -> anyhow::Result<()> {
    let app = router(registry);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .with_state(HttpAppCtx { registry })
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

async fn register(State(ctx): State<HttpAppCtx>, Json(body): Json<AuthBody>) -> Response {
    match ctx.registry.controllers.auth.register(&body).await {
        Ok(out) => (StatusCode::CREATED, Json(out)).into_response(),
        Err(e) => ApiError::from_auth(e, "Unable to register user due to a server issue").into_response(),
    }
}

async fn login(State(ctx): State<HttpAppCtx>, Json(body): Json<AuthBody>) -> Response {
    match ctx.registry.controllers.auth.login(&body).await {
        Ok(out) => (StatusCode::OK, Json(out)).into_response(),
        Err(e) => ApiError::from_auth(e, "Unable to login user due to a server issue").into_response(),
    }
}
