use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    #[serde(default)]
    pub subject: String,
    #[serde(default, alias = "body")]
    pub body_text: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl InboundMessage {
    pub fn new(subject: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body_text: body_text.into(),
            headers: HashMap::new(),
        }
    }

    /// Sets `From`, replacing any spelling of it already present.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case("from"));
        self.headers.insert("From".to_string(), from.into());
        self
    }

    /// Header lookup, case-insensitive on the name. When several spellings
    /// are present the lexicographically smallest key wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, v)| v.as_str())
    }

    pub fn from(&self) -> Option<&str> {
        self.header("from")
    }
}
