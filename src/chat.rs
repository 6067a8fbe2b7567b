// Interactive terminal session against the message endpoint.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::client::{ChatClient, Submission};
use crate::config::ChatConfig;
use crate::terminal_view::TerminalView;
use crate::transport::HttpTransport;
use crate::view::ChatView;

pub async fn run_chat(config: &ChatConfig) -> Result<()> {
    let transport = HttpTransport::new(config).context("Failed to build HTTP client")?;
    info!("Chatting with {}", transport.endpoint());

    let mut view = TerminalView::new(std::io::stdout());
    view.focus_input();
    let client = ChatClient::new(transport, view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if let Submission::Ignored(reason) = client.submit(&line).await {
            debug!(?reason, "Nothing sent");
            client.focus_input();
        }
    }

    info!("Input closed, ending chat session");
    Ok(())
}
