//! The surface the chat client draws on.
//!
//! [`ChatView`] is everything the client is allowed to touch: the message
//! list, the loading placeholder and the input controls. [`HtmlView`] keeps
//! the widget's bubble markup for the browser page.

use crate::format::{escape_html, format_message_text};
use crate::message::{Message, Role};

pub trait ChatView: Send {
    fn hide_welcome(&mut self);
    fn append(&mut self, message: &Message);
    fn show_loading(&mut self);
    fn remove_loading(&mut self);
    fn clear_input(&mut self);
    /// Leaves `value` in the input, e.g. a draft that was not sent.
    fn set_input(&mut self, value: &str);
    fn set_submit_enabled(&mut self, enabled: bool);
    fn focus_input(&mut self);
    fn scroll_to_bottom(&mut self);
}

const LOADING_BUBBLE: &str = r#"<div class="message message-bot loading-message"><div class="message-avatar"><div class="avatar-icon-small">🤖</div></div><div class="message-content"><div class="typing-indicator"><span></span><span></span><span></span></div></div></div>"#;

pub fn render_bubble(message: &Message) -> String {
    match message.role() {
        Role::User => format!(
            r#"<div class="message message-user"><div class="message-content">{}<div class="timestamp">{}</div></div></div>"#,
            escape_html(message.text()),
            message.timestamp()
        ),
        Role::Bot => {
            let classes = if message.is_error() {
                "message message-bot message-error"
            } else {
                "message message-bot"
            };
            format!(
                r#"<div class="{}"><div class="message-avatar"><div class="avatar-icon-small">🤖</div></div><div class="message-content">{}<div class="timestamp">{}</div></div></div>"#,
                classes,
                format_message_text(message.text(), message.kind()),
                message.timestamp()
            )
        }
    }
}

/// Widget state held server-side and rendered into the page on every load.
#[derive(Debug, Clone)]
pub struct HtmlView {
    bubbles: Vec<String>,
    loading: bool,
    welcome_visible: bool,
    input_value: String,
    submit_enabled: bool,
    input_focused: bool,
    scrolled_to: usize,
}

impl Default for HtmlView {
    fn default() -> Self {
        Self {
            bubbles: Vec::new(),
            loading: false,
            welcome_visible: true,
            input_value: String::new(),
            submit_enabled: true,
            input_focused: false,
            scrolled_to: 0,
        }
    }
}

impl HtmlView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bubbles(&self) -> &[String] {
        &self.bubbles
    }

    /// All bubbles in append order, followed by the placeholder while loading.
    pub fn transcript_html(&self) -> String {
        let mut html = self.bubbles.concat();
        if self.loading {
            html.push_str(LOADING_BUBBLE);
        }
        html
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_welcome_visible(&self) -> bool {
        self.welcome_visible
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn input_value(&self) -> &str {
        &self.input_value
    }

    /// Index one past the last bubble the view was scrolled to.
    pub fn scroll_position(&self) -> usize {
        self.scrolled_to
    }
}

impl ChatView for HtmlView {
    fn hide_welcome(&mut self) {
        self.welcome_visible = false;
    }

    fn append(&mut self, message: &Message) {
        self.bubbles.push(render_bubble(message));
    }

    fn show_loading(&mut self) {
        self.loading = true;
    }

    fn remove_loading(&mut self) {
        self.loading = false;
    }

    fn clear_input(&mut self) {
        self.input_value.clear();
    }

    fn set_input(&mut self, value: &str) {
        self.input_value = value.to_string();
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
        if !enabled {
            self.input_focused = false;
        }
    }

    fn focus_input(&mut self) {
        self.input_focused = true;
    }

    fn scroll_to_bottom(&mut self) {
        self.scrolled_to = self.bubbles.len() + usize::from(self.loading);
    }
}
