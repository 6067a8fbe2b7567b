use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    serve, Router,
};
use minijinja::{context, Environment, Value};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::client::ChatClient;
use crate::transport::HttpTransport;
use crate::view::HtmlView;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const PAGE_TITLE: &str = "智能问答";
const WELCOME_TEXT: &str = "你好！请输入你的问题，或让我翻译、分析情感、分类文本。";

pub type WidgetClient = ChatClient<HttpTransport, HtmlView>;

#[derive(Clone)]
struct AppState {
    client: Arc<WidgetClient>,
    templates: Arc<Environment<'static>>,
}

#[derive(Debug, Deserialize)]
struct MessageForm {
    #[serde(default)]
    msg: String,
}

fn create_minijinja_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)
        .context("Failed to load index template")?;
    Ok(env)
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, Html<String>> {
    let page = state.client.with_view(|view| {
        context! {
            title => PAGE_TITLE,
            welcome => WELCOME_TEXT,
            welcome_visible => view.is_welcome_visible(),
            // Bubble markup is escaped when rendered; only inserted tags remain.
            transcript => Value::from_safe_string(view.transcript_html()),
            loading => view.is_loading(),
            submit_enabled => view.is_submit_enabled(),
            input_focused => view.is_input_focused(),
            input => view.input_value(),
        }
    });

    state
        .templates
        .get_template("index.html")
        .and_then(|tmpl| tmpl.render(page))
        .map(Html)
        .map_err(|e| {
            error!("Failed to render template: {}", e);
            Html(format!("Internal Server Error: {}", e))
        })
}

// The reply is rendered by a background task; the redirected page shows the
// loading placeholder and refreshes until it settles.
async fn message_handler(
    State(state): State<AppState>,
    Form(form): Form<MessageForm>,
) -> impl IntoResponse {
    match state.client.spawn_submit(&form.msg) {
        Ok(_) => debug!("Submission accepted"),
        Err(reason) => debug!(?reason, "Submission ignored"),
    }
    Redirect::to("/")
}

pub fn router(client: Arc<WidgetClient>) -> Result<Router> {
    let templates = create_minijinja_env().context("Failed to initialize template engine")?;
    let state = AppState {
        client,
        templates: Arc::new(templates),
    };

    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/message", post(message_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http()))
}

pub async fn start_web_server(port: u16, client: Arc<WidgetClient>) -> Result<()> {
    let app = router(client)?;

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Chat widget available on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
