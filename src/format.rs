//! Text post-processing for bot bubbles.
//!
//! Raw reply text is untrusted. It is always escaped before any markup is
//! added, so the only tags in the output are the ones inserted here.

use minijinja::HtmlEscape;
use regex::Regex;

use crate::message::Kind;

lazy_static::lazy_static! {
    static ref SENTIMENT_HEADER: Regex = Regex::new(r"(😊|😞|😐) 情感分析结果:").unwrap();
    static ref CONFIDENCE: Regex = Regex::new(r"(置信度:?|[Cc]onfidence:?)\s*(\d+\.?\d*%)").unwrap();
}

const TRANSLATE_HEADER: &str = "🌐 翻译结果:";
const CLASSIFY_HEADER: &str = "📊 文本分类结果:";

pub fn escape_html(text: &str) -> String {
    HtmlEscape(text).to_string()
}

/// Escapes `text`, turns newlines into `<br>` and applies the emphasis for `kind`.
pub fn format_message_text(text: &str, kind: Kind) -> String {
    let mut formatted = escape_html(text).replace('\n', "<br>");

    match kind {
        Kind::Translate => {
            formatted = formatted.replace(
                TRANSLATE_HEADER,
                &format!(r#"<strong style="color: #4facfe;">{}</strong>"#, TRANSLATE_HEADER),
            );
        }
        Kind::Sentiment => {
            formatted = SENTIMENT_HEADER
                .replace_all(
                    &formatted,
                    r#"<strong style="color: #f5576c;">${1} 情感分析结果:</strong>"#,
                )
                .into_owned();
        }
        Kind::Classify => {
            formatted = formatted.replace(
                CLASSIFY_HEADER,
                &format!(r#"<strong style="color: #667eea;">{}</strong>"#, CLASSIFY_HEADER),
            );
        }
        Kind::Qa | Kind::Error => {}
    }

    CONFIDENCE
        .replace_all(&formatted, r#"<span style="color: #22c55e;">${1} ${2}</span>"#)
        .into_owned()
}
