//! Manifest validator
//!
//! Structural checks that do not need the resolved type index. Errors on a
//! model make that model unresolvable; warnings are only logged.

use crate::metadata::types::*;
use heck::ToUpperCamelCase;
use std::collections::HashSet;

/// Validation result
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

/// Validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
    pub field: Option<String>,
    pub error_type: ValidationErrorType,
}

/// Validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorType {
    EmptyName,
    DuplicateField,
    MissingIdentifier,
    AmbiguousIdentifier,
    InvalidRelation,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: String, field: Option<String>, error_type: ValidationErrorType) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            message,
            field,
            error_type,
        });
    }

    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// All error messages joined into one line.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate one model declaration
pub fn validate_model(model: &ModelBag) -> ValidationResult {
    let mut result = ValidationResult::new();

    if model.name.trim().is_empty() {
        result.add_error(
            "Model name cannot be empty".to_string(),
            Some("model.name".to_string()),
            ValidationErrorType::EmptyName,
        );
    } else if model.name.to_upper_camel_case() != model.name {
        result.add_warning(format!(
            "Model name '{}' should be UpperCamelCase",
            model.name
        ));
    }

    validate_identifier(model, &mut result);
    validate_fields(model, &mut result);

    if !model.entity && !model.eager_fetch.is_empty() {
        result.add_warning(format!(
            "Model '{}' declares eager_fetch but is not an entity",
            model.name
        ));
    }

    result
}

fn validate_identifier(model: &ModelBag, result: &mut ValidationResult) {
    let Some(identifier) = &model.identifier else {
        result.add_error(
            format!("Model '{}' declares no identifier", model.name),
            Some("model.identifier".to_string()),
            ValidationErrorType::MissingIdentifier,
        );
        return;
    };

    match (&identifier.r#type, &identifier.composite) {
        (Some(_), Some(_)) => result.add_error(
            format!(
                "Model '{}' declares both a scalar and a composite identifier",
                model.name
            ),
            Some("model.identifier".to_string()),
            ValidationErrorType::AmbiguousIdentifier,
        ),
        (None, None) => result.add_error(
            format!("Model '{}' identifier has neither type nor composite", model.name),
            Some("model.identifier".to_string()),
            ValidationErrorType::MissingIdentifier,
        ),
        _ => {}
    }
}

fn validate_fields(model: &ModelBag, result: &mut ValidationResult) {
    let mut names = HashSet::new();
    for field in &model.fields {
        if field.name.trim().is_empty() {
            result.add_error(
                format!("Model '{}' has a field with an empty name", model.name),
                Some("model.field.name".to_string()),
                ValidationErrorType::EmptyName,
            );
            continue;
        }
        if !names.insert(field.name.as_str()) {
            result.add_error(
                format!("Duplicate field name: {}", field.name),
                Some(format!("model.field.{}", field.name)),
                ValidationErrorType::DuplicateField,
            );
        }

        let to_one = matches!(
            field.cardinality,
            Some(Cardinality::OneToOne | Cardinality::ManyToOne)
        );
        if field.reverse.is_some() && !field.bidirectional {
            result.add_warning(format!(
                "Field '{}.{}' names a reverse field but is not bidirectional",
                model.name, field.name
            ));
        }
        if field.bidirectional && field.reverse.is_none() && to_one {
            result.add_error(
                format!(
                    "Bidirectional field '{}.{}' must name its reverse field",
                    model.name, field.name
                ),
                Some(format!("model.field.{}.reverse", field.name)),
                ValidationErrorType::InvalidRelation,
            );
        }
    }
}

/// Manifest-wide checks; all findings are warnings
pub fn validate_manifest(manifest: &Manifest) -> ValidationResult {
    let mut result = ValidationResult::new();

    let mut qualified = HashSet::new();
    for model in &manifest.models {
        if !qualified.insert(model.qualified_name()) {
            result.add_warning(format!(
                "Model '{}' is declared more than once",
                model.qualified_name()
            ));
        }
    }

    for dto in &manifest.dtos {
        let known = manifest
            .models
            .iter()
            .any(|model| model.qualified_name() == dto.model || model.name == dto.model);
        if !known {
            result.add_warning(format!(
                "DTO '{}' refers to undeclared model '{}'",
                dto.name, dto.model
            ));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(fields: Vec<FieldBag>) -> ModelBag {
        ModelBag {
            name: "Order".to_string(),
            namespace: "shop::model".to_string(),
            entity: true,
            scrud_bean: true,
            disableable: false,
            audited: false,
            dtos: vec![],
            eager_fetch: vec![],
            identifier: Some(IdentifierBag {
                field: "id".to_string(),
                r#type: Some("u64".to_string()),
                composite: None,
            }),
            generate: GenerationBag::default(),
            fields,
        }
    }

    fn field(name: &str) -> FieldBag {
        FieldBag {
            name: name.to_string(),
            r#type: "String".to_string(),
            cardinality: None,
            target: None,
            bidirectional: false,
            reverse: None,
            optional: false,
        }
    }

    #[test]
    fn test_validate_valid_model() {
        let result = validate_model(&model(vec![field("code"), field("note")]));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validate_duplicate_fields() {
        let result = validate_model(&model(vec![field("code"), field("code")]));
        assert!(!result.is_valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.error_type == ValidationErrorType::DuplicateField));
    }

    #[test]
    fn test_validate_identifier_shapes() {
        let mut missing = model(vec![]);
        missing.identifier = None;
        let result = validate_model(&missing);
        assert_eq!(result.errors[0].error_type, ValidationErrorType::MissingIdentifier);

        let mut both = model(vec![]);
        both.identifier = Some(IdentifierBag {
            field: "id".to_string(),
            r#type: Some("u64".to_string()),
            composite: Some(vec![]),
        });
        let result = validate_model(&both);
        assert_eq!(result.errors[0].error_type, ValidationErrorType::AmbiguousIdentifier);
    }

    #[test]
    fn test_bidirectional_to_one_needs_reverse() {
        let mut customer = field("customer");
        customer.cardinality = Some(Cardinality::ManyToOne);
        customer.bidirectional = true;
        let result = validate_model(&model(vec![customer]));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].error_type, ValidationErrorType::InvalidRelation);
    }

    #[test]
    fn test_manifest_warnings() {
        let manifest = Manifest {
            models: vec![model(vec![]), model(vec![])],
            dtos: vec![DtoBag {
                name: "GhostDto".to_string(),
                model: "Ghost".to_string(),
                namespace: None,
                fields: None,
            }],
            ..Default::default()
        };
        let result = validate_manifest(&manifest);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
    }
}
