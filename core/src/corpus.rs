use serde::{Deserialize, Serialize};

/// A chat message as it appears in corpus files and add payloads.
///
/// Every field is optional on the wire; absent text fields compose as empty
/// strings. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default, rename = "_id")]
    pub internal_id: Option<String>,
}

impl Message {
    /// One searchable string per message: text, author, and channel joined by
    /// single spaces, plus a marker when the message is a reply in a thread.
    /// Only the token sequence derived from this string is ever kept.
    pub fn searchable_text(&self) -> String {
        let text = self.text.as_deref().unwrap_or("");
        let username = self.username.as_deref().unwrap_or("");
        let channel = self.channel.as_deref().unwrap_or("");
        let mut combined = format!("{text} {username} {channel}");
        if self.is_threaded_reply() {
            combined.push_str(" [threaded reply]");
        }
        combined
    }

    /// A threaded reply carries a thread parent timestamp different from its
    /// own timestamp.
    pub fn is_threaded_reply(&self) -> bool {
        match self.thread_ts.as_deref() {
            Some(thread_ts) if !thread_ts.is_empty() => self.ts.as_deref() != Some(thread_ts),
            _ => false,
        }
    }

    /// Identifier recorded when appending to an existing index: `id`, falling
    /// back to `ts`, falling back to `_id`, else empty.
    pub fn external_id(&self) -> String {
        [&self.id, &self.ts, &self.internal_id]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}
