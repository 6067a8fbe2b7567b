use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// Category tag on a message; picks the highlight rule applied when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kind {
    #[default]
    Qa,
    Translate,
    Sentiment,
    Classify,
    Error,
}

impl Kind {
    /// Maps the backend's `type` string to a kind. Only the exact lowercase
    /// tags match; anything else yields `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "qa" => Some(Kind::Qa),
            "translate" => Some(Kind::Translate),
            "sentiment" => Some(Kind::Sentiment),
            "classify" => Some(Kind::Classify),
            "error" => Some(Kind::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Qa => "qa",
            Kind::Translate => "translate",
            Kind::Sentiment => "sentiment",
            Kind::Classify => "classify",
            Kind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: Role,
    text: String,
    kind: Kind,
    rendered_at: DateTime<Local>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), Kind::Qa)
    }

    pub fn bot(text: impl Into<String>, kind: Kind) -> Self {
        Self::new(Role::Bot, text.into(), kind)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text.into(), Kind::Error)
    }

    fn new(role: Role, text: String, kind: Kind) -> Self {
        Self {
            role,
            text,
            kind,
            rendered_at: Local::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn rendered_at(&self) -> DateTime<Local> {
        self.rendered_at
    }

    /// Wall-clock stamp shown under the bubble.
    pub fn timestamp(&self) -> String {
        self.rendered_at.format("%H:%M").to_string()
    }

    pub fn is_error(&self) -> bool {
        self.kind == Kind::Error
    }
}
