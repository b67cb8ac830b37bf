//! SSE demo server.
//!
//! Each `GET /chat?prompt=...` opens one streaming session against an
//! OpenAI-compatible backend and relays its units as server-sent events.
//!
//! Run with:
//!   OPENAI_API_KEY=... cargo run --example sse_server
//!
//! Then, in another terminal:
//!   curl -N 'http://127.0.0.1:3000/chat?prompt=Tell+me+a+story&strategy=semantic'

use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    response::Html,
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use segstream::{
    config::{SegstreamConfig, Strategy},
    emitter::unit_channel,
    session::Session,
    source::OpenAiSource,
};

const INDEX_HTML: &str = r#"<!doctype html>
<html>
  <body>
    <h1>segstream</h1>
    <form onsubmit="go(); return false;">
      <input id="prompt" size="60" placeholder="prompt" />
      <select id="strategy">
        <option>sentence</option>
        <option>paragraph</option>
        <option>semantic</option>
      </select>
      <button>stream</button>
    </form>
    <div id="out"></div>
    <script>
      function go() {
        const prompt = encodeURIComponent(document.getElementById('prompt').value);
        const strategy = document.getElementById('strategy').value;
        const out = document.getElementById('out');
        out.textContent = '';
        const es = new EventSource(`/chat?prompt=${prompt}&strategy=${strategy}`);
        const append = (text, shift) => {
          const p = document.createElement('p');
          p.textContent = (shift ? '↳ ' : '') + text;
          out.appendChild(p);
        };
        es.addEventListener('message', (e) => append(e.data, false));
        es.addEventListener('topic-shift', (e) => append(e.data, true));
        es.addEventListener('stream-end', () => es.close());
        es.addEventListener('stream-error', (e) => { append('error: ' + e.data, false); });
      }
    </script>
  </body>
</html>
"#;

#[derive(Clone)]
struct ServerState {
    config: SegstreamConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatParams {
    prompt: String,
    strategy: Option<String>,
}

async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn chat(
    State(state): State<ServerState>,
    Query(params): Query<ChatParams>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, (StatusCode, String)> {
    let strategy = params
        .strategy
        .as_deref()
        .and_then(Strategy::from_name)
        .unwrap_or(state.config.strategy);
    let config = state.config.clone().with_strategy(strategy);

    let source = OpenAiSource::connect(
        &state.client,
        &config.api_base,
        &config.api_key,
        &config.model,
        &params.prompt,
    )
    .await
    .map_err(|err| (StatusCode::BAD_GATEWAY, err.to_string()))?;

    let segmenter = config.build_segmenter(&state.client);
    let (emitter, stream) = unit_channel();

    let handle = Session::new(Box::new(source), segmenter, config.pacing, emitter).spawn();
    tracing::info!(session = %handle.id(), ?strategy, "session started");

    let sse_stream = stream.into_async_stream().map(|event| {
        Ok(SseEvent::default()
            .event(event.event_name())
            .data(event.data()))
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let state = ServerState {
        config: SegstreamConfig::from_env(),
        client: reqwest::Client::new(),
    };

    let router = Router::new()
        .route("/", get(serve_index))
        .route("/chat", get(chat))
        .with_state(state);

    let addr: SocketAddr = "127.0.0.1:3000".parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("serving on http://{addr}");
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
