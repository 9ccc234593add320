use std::time::Duration;

use async_graphql::http::{GraphiQLSource, ALL_WEBSOCKET_PROTOCOLS};
use async_graphql::Data;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use infra::db;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::warn;

use crate::error::AppError;
use crate::gql::AppSchema;
use crate::middleware::{session_middleware, RequestSession};
use crate::routes;
use crate::state::AppState;

pub fn build_router(state: AppState, schema: AppSchema) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/graphql", post(graphql_handler).get(graphql_ws_handler))
        .route("/graphiql", get(graphiql))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(Extension(schema))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
}

/// Runs a query with the caller's session in the GraphQL context.
async fn graphql_handler(
    Extension(schema): Extension<AppSchema>,
    Extension(RequestSession(session)): Extension<RequestSession>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(session) = session {
        request = request.data(session);
    }
    schema.execute(request).await.into()
}

/// Subscriptions over a websocket, authorised by the token sent with the
/// upgrade request.
async fn graphql_ws_handler(
    Extension(schema): Extension<AppSchema>,
    Extension(RequestSession(session)): Extension<RequestSession>,
    protocol: GraphQLProtocol,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade
        .protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |socket| {
            let mut data = Data::default();
            if let Some(session) = session {
                data.insert(session);
            }
            GraphQLWebSocket::new(socket, schema, protocol)
                .with_data(data)
                .serve()
        })
}

async fn graphiql() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql")
            .finish(),
    )
}

/// Liveness plus a probe of each storage backend. A broken database only
/// degrades the report, since events fall back to local storage.
async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.store.probe().await?;

    let database = match state.events.remote() {
        None => "disabled",
        Some(repo) => match db::ping(repo.pool()).await {
            Ok(()) => "ok",
            Err(err) => {
                warn!(error = %err, "database health check failed");
                "unavailable"
            }
        },
    };

    Ok(Json(json!({
        "status": "ok",
        "store": "ok",
        "database": database,
    })))
}
