// Fixed texts and defaults shared by the client, the views and the CLI.

use std::time::Duration;

/// Shown when a successful reply carries no text.
pub const FALLBACK_REPLY: &str = "抱歉，无法处理您的请求。";
/// Shown when the request exceeded its time budget.
pub const TIMEOUT_REPLY: &str = "请求超时，请稍后重试。";
/// Shown for any failure that carries no server message.
pub const GENERIC_FAILURE_REPLY: &str = "抱歉，处理请求时出现错误。";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8808";
pub const DEFAULT_MESSAGE_PATH: &str = "/message";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_WIDGET_PORT: u16 = 8809;

/// Form field carrying the user's text.
pub const MESSAGE_FIELD: &str = "msg";
