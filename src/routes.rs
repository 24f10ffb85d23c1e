//! HTTP routing.

use axum::{
  Router,
  extract::DefaultBodyLimit,
  http::HeaderValue,
  routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::MAX_UPLOAD_BYTES;
use crate::handlers;
use crate::state::AppState;

fn cors_layer(origin: &str) -> CorsLayer {
  let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
  match HeaderValue::from_str(origin) {
    Ok(origin) => layer.allow_origin(origin),
    Err(e) => {
      tracing::warn!("Invalid CORS origin {:?}, cross-origin requests disabled: {}", origin, e);
      layer
    }
  }
}

pub fn router(state: AppState, cors_origin: &str) -> Router {
  Router::new()
    .route("/", get(handlers::index))
    .route(
      "/subjects",
      get(handlers::list_subjects).post(handlers::create_subject),
    )
    .route("/subjects/{id}", get(handlers::get_subject))
    .route(
      "/subjects/{id}/topics",
      get(handlers::list_topics).post(handlers::create_topic),
    )
    .route(
      "/subjects/{id}/topics/{topic_id}/upload",
      post(handlers::upload_material).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
    .route("/session/generate", post(handlers::generate_session))
    .route("/session/complete", post(handlers::complete_session))
    .route("/history/{subject_id}", get(handlers::study_history))
    .route("/recommendations/{subject_id}", get(handlers::recommendations))
    .layer(cors_layer(cors_origin))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
