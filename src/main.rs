use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use qa_chat::constants::{DEFAULT_BASE_URL, DEFAULT_MESSAGE_PATH, DEFAULT_TIMEOUT, DEFAULT_WIDGET_PORT};
use qa_chat::{chat, web_server, ChatClient, ChatConfig, HtmlView, HttpTransport, Submission};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the answering backend.
    #[arg(long, global = true, env = "QA_CHAT_ENDPOINT", default_value = DEFAULT_BASE_URL)]
    endpoint: String,

    /// Path of the message endpoint on the backend.
    #[arg(long, global = true, env = "QA_CHAT_PATH", default_value = DEFAULT_MESSAGE_PATH)]
    path: String,

    /// How long to wait for a reply, in milliseconds.
    #[arg(long, global = true, env = "QA_CHAT_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Chat with the backend from the terminal.
    Chat,
    /// Host the chat widget page for a browser.
    Serve {
        #[arg(long, default_value_t = DEFAULT_WIDGET_PORT, help = "Port for the widget page.")]
        port: u16,
    },
    /// Send a single message and print the rendered conversation.
    Send {
        /// Text to send.
        text: String,
    },
}

impl Cli {
    fn config(&self) -> ChatConfig {
        ChatConfig::new(self.endpoint.clone())
            .with_message_path(self.path.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for QA_CHAT_* settings)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g. RUST_LOG=qa_chat=debug).
    // Logs go to stderr so the conversation on stdout stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    info!("qa-chat starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Chat => {
            chat::run_chat(&config).await.context("Chat session failed")?;
        }
        Commands::Serve { port } => {
            let transport = HttpTransport::new(&config).context("Failed to build HTTP client")?;
            let client = Arc::new(ChatClient::new(transport, HtmlView::new()));

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, client).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, shutting down...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Send { text } => {
            let transport = HttpTransport::new(&config).context("Failed to build HTTP client")?;
            let client = ChatClient::new(transport, HtmlView::new());
            match client.submit(&text).await {
                Submission::Ignored(reason) => info!(?reason, "Nothing sent"),
                outcome => info!(?outcome, "Message settled"),
            }
            println!("{}", client.with_view(|view| view.transcript_html()));
        }
    }

    Ok(())
}
