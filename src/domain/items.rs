//! Item content rules.

use super::error::{DomainError, FieldViolation};

const MUST_NOT_BE_EMPTY: &str = "must not be empty";

/// Validated name and description of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
}

impl ItemDraft {
    /// Both fields are required and must contain something other than whitespace.
    /// Every offending field is reported, not just the first.
    pub fn parse(name: Option<String>, description: Option<String>) -> Result<Self, DomainError> {
        let mut violations = Vec::new();

        let name = required_text("name", name, &mut violations);
        let description = required_text("description", description, &mut violations);

        match (name, description) {
            (Some(name), Some(description)) if violations.is_empty() => {
                Ok(Self { name, description })
            }
            _ => Err(DomainError::validation(violations)),
        }
    }
}

fn required_text(
    field: &'static str,
    value: Option<String>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        other => {
            violations.push(FieldViolation::new(field, other, MUST_NOT_BE_EMPTY));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_trims_values() {
        let draft = ItemDraft::parse(Some(" Lamp ".into()), Some("Bright".into())).unwrap();
        assert_eq!(draft.name, "Lamp");
        assert_eq!(draft.description, "Bright");
    }

    #[test]
    fn reports_every_missing_field() {
        let err = ItemDraft::parse(None, Some("   ".into())).unwrap_err();
        let DomainError::Validation { violations } = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "description"]);
        assert_eq!(violations[0].rejected_value, None);
        assert_eq!(violations[1].rejected_value.as_deref(), Some("   "));
    }
}
