use std::io::Write;

use tracing::warn;

use crate::message::{Message, Role};
use crate::view::ChatView;

/// Prints the conversation as plain lines, for the interactive `chat` command.
pub struct TerminalView<W: Write + Send> {
    out: W,
    accepting_input: bool,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            accepting_input: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write + Send> ChatView for TerminalView<W> {
    fn hide_welcome(&mut self) {}

    fn append(&mut self, message: &Message) {
        let label = match message.role() {
            Role::User => "you",
            Role::Bot if message.is_error() => "error",
            Role::Bot => "bot",
        };
        // Continuation lines line up under the first line's text.
        let prefix = format!("[{}] {}: ", message.timestamp(), label);
        let indent = " ".repeat(prefix.chars().count());
        let body = message.text().replace('\n', &format!("\n{}", indent));
        self.write_line(&format!("{}{}", prefix, body));
    }

    fn show_loading(&mut self) {
        self.write_line("...");
    }

    fn remove_loading(&mut self) {}

    fn clear_input(&mut self) {}

    fn set_input(&mut self, _value: &str) {}

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.accepting_input = enabled;
    }

    fn focus_input(&mut self) {
        if self.accepting_input {
            if let Err(e) = write!(self.out, "> ").and_then(|_| self.out.flush()) {
                warn!("Failed to write prompt: {}", e);
            }
        }
    }

    fn scroll_to_bottom(&mut self) {}
}
