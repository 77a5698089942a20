//! Epic validation

use crate::limits::ValidationLimits;
use crate::report::{check_text, run_batch, RecordRules, ValidationReport};
use backlog_model::{EpicBasicInfo, EpicPriority};

/// Message used when an import has no epics at all
pub const NO_EPICS_MESSAGE: &str = "Se requiere al menos una épica para generar el backlog";

/// Validates epic candidates before sprint planning and persistence
///
/// An empty batch is invalid: a backlog needs at least one epic to plan
/// sprints from.
#[derive(Debug, Clone, Default)]
pub struct EpicValidator {
    limits: ValidationLimits,
}

impl EpicValidator {
    /// Create validator with default limits
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create validator with custom limits
    #[inline]
    #[must_use]
    pub fn with_limits(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    /// Validate a batch of epics
    #[must_use]
    pub fn validate(&self, epics: &[EpicBasicInfo]) -> ValidationReport<EpicBasicInfo> {
        if epics.is_empty() {
            return ValidationReport {
                is_valid: false,
                errors: vec![NO_EPICS_MESSAGE.to_string()],
                valid: Vec::new(),
                batch_error: Some(NO_EPICS_MESSAGE.to_string()),
            };
        }
        run_batch(self, epics)
    }
}

impl RecordRules<EpicBasicInfo> for EpicValidator {
    const ENTITY_PLURAL: &'static str = "épicas";

    fn key(item: &EpicBasicInfo) -> &str {
        &item.id
    }

    fn check(&self, epic: &EpicBasicInfo) -> Vec<String> {
        let mut reasons = Vec::new();
        check_text(&mut reasons, "el id", &epic.id, self.limits.max_id_len);
        check_text(&mut reasons, "el título", &epic.title, self.limits.max_title_len);

        if !self.limits.epic_weeks().contains(&epic.estimated_weeks) {
            reasons.push(format!(
                "las semanas estimadas deben estar entre {} y {} (valor: {})",
                self.limits.min_epic_weeks, self.limits.max_epic_weeks, epic.estimated_weeks
            ));
        }

        if epic.priority_level().is_none() {
            let allowed: Vec<&str> = EpicPriority::ALL.iter().map(|p| p.as_str()).collect();
            reasons.push(format!(
                "prioridad inválida '{}' (valores permitidos: {})",
                epic.priority,
                allowed.join(", ")
            ));
        }

        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epic(id: &str, weeks: i64) -> EpicBasicInfo {
        EpicBasicInfo::new(id, format!("Épica {id}"), weeks, EpicPriority::Media)
    }

    #[test]
    fn valid_batch_passes() {
        let report = EpicValidator::new().validate(&[epic("EP-01", 2), epic("EP-02", 12)]);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert_eq!(report.valid.len(), 2);
    }

    #[test]
    fn empty_batch_is_invalid() {
        let report = EpicValidator::new().validate(&[]);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec![NO_EPICS_MESSAGE.to_string()]);
        assert!(report.is_batch_rejected());
    }

    #[test]
    fn duplicate_ids_invalidate_whole_batch() {
        let report =
            EpicValidator::new().validate(&[epic("EP-01", 2), epic("EP-01", 3), epic("EP-02", 2)]);
        assert!(!report.is_valid);
        assert!(report.valid.is_empty());
        assert!(report.errors[0].contains("duplicados"));
        assert!(report.errors[0].contains("EP-01"));
        assert_eq!(report.batch_error.as_deref(), Some(report.errors[0].as_str()));
    }

    #[test]
    fn bad_records_are_excluded_individually() {
        let bad_weeks = epic("EP-02", 13);
        let bad_priority = epic("EP-03", 2).with_raw_priority("URGENTE");
        let report =
            EpicValidator::new().validate(&[epic("EP-01", 2), bad_weeks, bad_priority]);

        assert!(!report.is_valid);
        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.valid[0].id, "EP-01");
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].starts_with("EP-02: "));
        assert!(report.errors[0].contains("valor: 13"));
        assert!(report.errors[1].starts_with("EP-03: "));
        assert!(report.errors[1].contains("URGENTE"));
        assert!(!report.is_batch_rejected());
    }

    #[test]
    fn multiple_reasons_are_joined() {
        let mut bad = epic("EP-09", 0);
        bad.title = String::new();
        let report = EpicValidator::new().validate(&[bad]);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("falta el título; "));
    }

    #[test]
    fn title_length_is_bounded() {
        let limits = ValidationLimits {
            max_title_len: 5,
            ..ValidationLimits::default()
        };
        let report = EpicValidator::with_limits(limits).validate(&[epic("EP-01", 2)]);
        assert!(!report.is_valid);
    }
}
