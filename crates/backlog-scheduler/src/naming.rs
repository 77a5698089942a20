//! Sprint names and goals
//!
//! Epic titles coming out of the analyzer often keep their document
//! decoration: heading markers, emphasis, a leading "Épica 3:" or "EP-03 -"
//! prefix. [`clean_title`] strips that before the title is embedded in a
//! sprint name or a generated sentence.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s#>*\-•]+").expect("valid regex"));

static EPIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:épica|epica|epic|ep)[\s\-_]*\d+\s*[:.\-–]\s*").expect("valid regex")
});

static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_`]+").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const ELLIPSIS: &str = "...";

/// Strip document decoration from an epic title
#[must_use]
pub fn clean_title(raw: &str) -> String {
    let title = LEADING_MARKERS.replace(raw, "");
    let title = EPIC_PREFIX.replace(&title, "");
    let title = EMPHASIS.replace_all(&title, "");
    let title = WHITESPACE.replace_all(title.trim(), " ");
    let title = title.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
    if title.is_empty() {
        raw.trim().to_string()
    } else {
        title.to_string()
    }
}

/// Cut `text` to at most `max_chars` characters, ending with "..." when cut
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(keep).collect();
    format!("{}{ELLIPSIS}", head.trim_end())
}

/// "Sprint {n}: {title}" with the cleaned title bounded to `max_title_len`
#[must_use]
pub fn sprint_name(sequence: u32, epic_title: &str, max_title_len: usize) -> String {
    format!(
        "Sprint {sequence}: {}",
        truncate_chars(&clean_title(epic_title), max_title_len)
    )
}

/// The epic objective bounded to `max_len`, or a generated fallback
///
/// Returns the goal and whether it was generated.
#[must_use]
pub fn sprint_goal(objective: Option<&str>, epic_title: &str, max_len: usize) -> (String, bool) {
    match objective.map(str::trim).filter(|o| !o.is_empty()) {
        Some(objective) => (truncate_chars(objective, max_len), false),
        None => (
            truncate_chars(
                &format!("Completar desarrollo de: {}", clean_title(epic_title)),
                max_len,
            ),
            true,
        ),
    }
}
