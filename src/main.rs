use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_sprint::agent::StudyAgent;
use study_sprint::llm::{ContentService, OpenAiClient};
use study_sprint::state::AppState;
use study_sprint::{config, db, routes};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "study_sprint=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let settings = config::load_settings();

  let pool = db::init_db(&settings.database_path).expect("Failed to initialize database");

  let client = OpenAiClient::new(
    settings.llm.base_url.clone(),
    settings.llm.api_key.clone(),
    settings.llm.timeout,
  )
  .expect("Failed to create LLM client (is OPENAI_API_KEY set?)");
  let content = ContentService::new(
    std::sync::Arc::new(client),
    settings.llm.model.clone(),
    settings.llm.retry,
  );
  let agent = StudyAgent::new(pool.clone(), content, settings.priority);

  let app = routes::router(AppState::new(pool, agent), &settings.cors_origin);

  let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", settings.bind_addr));

  tracing::info!("Server running on http://{}", settings.bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
