use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL: Regex = Regex::new(r"http\S+").expect("valid regex");
    static ref MENTION: Regex = Regex::new(r"<@\w+>").expect("valid regex");
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
}

/// Normalize raw message text into lowercase search terms.
///
/// URL runs and `<@user>` mentions are stripped first, remaining punctuation
/// collapses to spaces, and the result is lowercased and split on whitespace.
/// Empty input yields an empty sequence.
pub fn normalize(text: &str) -> Vec<String> {
    let text = URL.replace_all(text, "");
    let text = MENTION.replace_all(&text, "");
    let text = NON_WORD.replace_all(&text, " ");
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
