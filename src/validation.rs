//! Catalogue validation.
//!
//! Checks structural integrity of a catalogue before any model is built.
//! Detects:
//! - Duplicate partner, mechanic or candidate IDs
//! - Candidates referencing unknown partners or mechanics
//! - Negative availabilities, productivities or minimum duration
//!
//! Anything beyond structural consistency (e.g. whether a catalogue is
//! worth solving) is left to the engine.

use crate::curve;
use crate::models::{Catalogue, CandidateKey};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A candidate references a partner that doesn't exist.
    UnknownPartner,
    /// A candidate references a mechanic that doesn't exist.
    UnknownMechanic,
    /// An availability is below zero.
    NegativeAvailability,
    /// A candidate's productivity is below zero.
    NegativeProductivity,
    /// The minimum duration is below zero.
    NegativeMinDuration,
    /// A candidate's productivity is too large for the scaled objective.
    ProductivityOutOfRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a catalogue.
///
/// Checks:
/// 1. No duplicate partner IDs
/// 2. No duplicate mechanic IDs
/// 3. No duplicate (partner, mechanic) candidates
/// 4. All candidate references point to existing partners and mechanics
/// 5. Availabilities, productivities and `min_duration` are non-negative
/// 6. Productivities stay within [`curve::MAX_PRODUCTIVITY_REF`]
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalogue(catalogue: &Catalogue) -> ValidationResult {
    let mut errors = Vec::new();

    let mut partner_ids = HashSet::new();
    for p in &catalogue.partners {
        if !partner_ids.insert(&p.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate partner ID: {}", p.id),
            ));
        }
        if p.availability < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeAvailability,
                format!("Partner '{}' has negative availability {}", p.id, p.availability),
            ));
        }
    }

    let mut mechanic_ids = HashSet::new();
    for m in &catalogue.mechanics {
        if !mechanic_ids.insert(&m.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate mechanic ID: {}", m.id),
            ));
        }
        if m.availability < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeAvailability,
                format!("Mechanic '{}' has negative availability {}", m.id, m.availability),
            ));
        }
    }

    let mut candidate_keys: HashSet<CandidateKey> = HashSet::new();
    for c in &catalogue.candidates {
        let key = c.key();
        if !partner_ids.contains(&c.partner_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownPartner,
                format!("Candidate {key} references unknown partner '{}'", c.partner_id),
            ));
        }
        if !mechanic_ids.contains(&c.mechanic_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownMechanic,
                format!("Candidate {key} references unknown mechanic '{}'", c.mechanic_id),
            ));
        }
        if c.productivity_ref < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeProductivity,
                format!("Candidate {key} has negative productivity {}", c.productivity_ref),
            ));
        }
        if c.productivity_ref > curve::MAX_PRODUCTIVITY_REF {
            errors.push(ValidationError::new(
                ValidationErrorKind::ProductivityOutOfRange,
                format!(
                    "Candidate {key} productivity {} exceeds the maximum {}",
                    c.productivity_ref,
                    curve::MAX_PRODUCTIVITY_REF
                ),
            ));
        }
        if !candidate_keys.insert(key.clone()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate candidate: {key}"),
            ));
        }
    }

    if catalogue.settings.min_duration < 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NegativeMinDuration,
            format!(
                "Minimum duration must be non-negative, got {}",
                catalogue.settings.min_duration
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, Mechanic, Partner, SystemSettings};

    fn sample_catalogue() -> Catalogue {
        Catalogue::cartesian(
            vec![Partner::new("amz", 10), Partner::new("nike", 8)],
            vec![Mechanic::new("dz1", 10), Mechanic::new("dz4", 4)],
            |_, _| 1000,
        )
    }

    #[test]
    fn test_valid_catalogue() {
        assert!(validate_catalogue(&sample_catalogue()).is_ok());
    }

    #[test]
    fn test_empty_catalogue_is_valid() {
        assert!(validate_catalogue(&Catalogue::new()).is_ok());
    }

    #[test]
    fn test_duplicate_partner_id() {
        let cat = sample_catalogue().with_partner(Partner::new("amz", 3));

        let errors = validate_catalogue(&cat).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("partner")));
    }

    #[test]
    fn test_duplicate_candidate() {
        let cat = sample_catalogue().with_candidate(Candidate::new("amz", "dz1", 5));

        let errors = validate_catalogue(&cat).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("candidate")));
    }

    #[test]
    fn test_unknown_references() {
        let cat = sample_catalogue()
            .with_candidate(Candidate::new("ghost", "dz1", 5))
            .with_candidate(Candidate::new("amz", "ghost", 5));

        let errors = validate_catalogue(&cat).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownPartner));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownMechanic));
    }

    #[test]
    fn test_negative_values() {
        let cat = Catalogue::new()
            .with_partner(Partner::new("P1", -1))
            .with_mechanic(Mechanic::new("M1", -2))
            .with_candidate(Candidate::new("P1", "M1", -3))
            .with_settings(SystemSettings::new(-4));

        let errors = validate_catalogue(&cat).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::NegativeAvailability)
                .count(),
            2
        );
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NegativeProductivity));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NegativeMinDuration));
    }

    #[test]
    fn test_zero_availability_is_valid() {
        let cat = Catalogue::new()
            .with_partner(Partner::new("P1", 0))
            .with_mechanic(Mechanic::new("M1", 0))
            .with_candidate(Candidate::new("P1", "M1", 100));
        assert!(validate_catalogue(&cat).is_ok());
    }

    #[test]
    fn test_productivity_out_of_range() {
        let cat = Catalogue::new()
            .with_partner(Partner::new("P1", 10))
            .with_mechanic(Mechanic::new("M1", 10))
            .with_candidate(Candidate::new("P1", "M1", i64::MAX / 1000));

        let errors = validate_catalogue(&cat).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::ProductivityOutOfRange);
        assert!(errors[0].message.contains("(P1, M1)"));
    }

    #[test]
    fn test_productivity_at_limit_is_valid() {
        let cat = Catalogue::new()
            .with_partner(Partner::new("P1", 10))
            .with_mechanic(Mechanic::new("M1", 10))
            .with_candidate(Candidate::new("P1", "M1", curve::MAX_PRODUCTIVITY_REF));
        assert!(validate_catalogue(&cat).is_ok());
    }
}
