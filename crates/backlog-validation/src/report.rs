//! Validation report and the batch runner shared by all validators

use std::collections::BTreeSet;

/// Outcome of validating a batch of candidates
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport<T> {
    /// True when no error was found
    pub is_valid: bool,
    /// One message per rejected record, plus batch-level errors
    pub errors: Vec<String>,
    /// Records that passed, in input order
    pub valid: Vec<T>,
    /// Error that rejected the whole batch, also listed in `errors`
    pub batch_error: Option<String>,
}

impl<T> ValidationReport<T> {
    /// Number of records rejected individually or by a batch-level error
    #[inline]
    #[must_use]
    pub fn rejected_count(&self, total: usize) -> usize {
        total - self.valid.len()
    }

    /// True when the batch as a whole was rejected
    #[inline]
    #[must_use]
    pub fn is_batch_rejected(&self) -> bool {
        self.batch_error.is_some()
    }
}

/// Per-entity rules plugged into [`run_batch`]
pub(crate) trait RecordRules<T> {
    /// Plural name used in batch-level messages, e.g. "épicas"
    const ENTITY_PLURAL: &'static str;

    /// Key of the record
    fn key(item: &T) -> &str;

    /// Reasons the record is invalid; empty when it passes
    fn check(&self, item: &T) -> Vec<String>;
}

/// Validate a batch: per-record checks plus duplicate-key detection
///
/// Duplicate keys invalidate the whole batch, so `valid` is empty then.
pub(crate) fn run_batch<T: Clone, R: RecordRules<T>>(rules: &R, items: &[T]) -> ValidationReport<T> {
    let mut errors = Vec::new();
    let mut valid = Vec::with_capacity(items.len());

    let duplicates = duplicate_keys(items.iter().map(R::key));
    let batch_error = if duplicates.is_empty() {
        None
    } else {
        let list: Vec<&str> = duplicates.iter().map(String::as_str).collect();
        let message = format!("IDs de {} duplicados: {}", R::ENTITY_PLURAL, list.join(", "));
        errors.push(message.clone());
        Some(message)
    };

    for (index, item) in items.iter().enumerate() {
        let reasons = rules.check(item);
        if reasons.is_empty() {
            valid.push(item.clone());
        } else {
            errors.push(format!("{}: {}", label(R::key(item), index), reasons.join("; ")));
        }
    }

    if batch_error.is_some() {
        valid.clear();
    }

    if !errors.is_empty() {
        tracing::debug!(
            entity = R::ENTITY_PLURAL,
            rejected = items.len() - valid.len(),
            "validation found {} error(s)",
            errors.len()
        );
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        valid,
        batch_error,
    }
}

/// Keys that appear more than once, ignoring blanks
fn duplicate_keys<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for key in keys.map(str::trim).filter(|k| !k.is_empty()) {
        if !seen.insert(key) {
            duplicates.insert(key.to_string());
        }
    }
    duplicates
}

/// Record label for messages; position-based when the key is blank
fn label(key: &str, index: usize) -> String {
    let key = key.trim();
    if key.is_empty() {
        format!("#{}", index + 1)
    } else {
        key.to_string()
    }
}

/// Push "falta {field}" or a length error for a text field
pub(crate) fn check_text(
    reasons: &mut Vec<String>,
    field: &str,
    value: &str,
    max_len: usize,
) {
    let len = value.trim().chars().count();
    if len == 0 {
        reasons.push(format!("falta {field}"));
    } else if len > max_len {
        reasons.push(format!("{field} supera {max_len} caracteres ({len})"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_ignore_blank_and_padding() {
        let keys = ["EP-1", " EP-1", "", "", "EP-2"];
        let dups = duplicate_keys(keys.into_iter());
        assert_eq!(dups.into_iter().collect::<Vec<_>>(), vec!["EP-1".to_string()]);
    }

    #[test]
    fn blank_key_gets_positional_label() {
        assert_eq!(label("  ", 2), "#3");
        assert_eq!(label("US-7", 0), "US-7");
    }

    #[test]
    fn check_text_bounds() {
        let mut reasons = Vec::new();
        check_text(&mut reasons, "el título", "   ", 10);
        check_text(&mut reasons, "el título", "demasiado largo", 5);
        check_text(&mut reasons, "el título", "ok", 5);
        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[0], "falta el título");
        assert!(reasons[1].contains("supera 5"));
    }
}
