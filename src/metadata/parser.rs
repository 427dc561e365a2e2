//! Manifest parser

use crate::errors::{ScrudError, ScrudResult};
use crate::metadata::types::Manifest;
use std::fs;
use std::path::Path;

/// Parse a manifest from a TOML file
pub fn parse_manifest<P: AsRef<Path>>(path: P) -> ScrudResult<Manifest> {
    let content = fs::read_to_string(&path).map_err(|e| {
        ScrudError::Configuration(format!(
            "Failed to read manifest '{}': {}",
            path.as_ref().display(),
            e
        ))
    })?;

    parse_manifest_from_str(&content)
}

/// Parse a manifest from a TOML string
pub fn parse_manifest_from_str(content: &str) -> ScrudResult<Manifest> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::Cardinality;
    use assert_matches::assert_matches;

    const MANIFEST: &str = r#"
[generator]
known_types = ["chrono::DateTime"]

[generator.settings]
"naming.dto_suffix" = "Dto"

[[model]]
name = "Order"
namespace = "shop::model"
disableable = true
eager_fetch = ["customer"]
identifier = { type = "u64" }

[model.generate]
path_fragment = "purchase-orders"

[model.generate.superclass]
service_impl = "crate::support::BaseService"

[[model.field]]
name = "customer"
type = "Customer"
cardinality = "many-to-one"

[[model.field]]
name = "total"
type = "u64"

[[model]]
name = "OrderLine"
namespace = "shop::model"
scrud_bean = false

[[model.identifier.composite]]
entity = "Order"
id_type = "u64"

[[model.identifier.composite]]
entity = "Product"

[[dto]]
name = "OrderSummary"
model = "shop::model::Order"
fields = ["total"]
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest_from_str(MANIFEST).unwrap();
        assert_eq!(manifest.models.len(), 2);
        assert_eq!(manifest.generator.known_types, vec!["chrono::DateTime"]);
        assert_eq!(
            manifest.generator.settings.get("naming.dto_suffix").map(String::as_str),
            Some("Dto")
        );

        let order = &manifest.models[0];
        assert_eq!(order.qualified_name(), "shop::model::Order");
        assert!(order.entity && order.scrud_bean && order.disableable);
        assert!(order.generate.controller);
        assert_eq!(order.generate.path_fragment.as_deref(), Some("purchase-orders"));
        assert_eq!(
            order.generate.superclass.service_impl.as_deref(),
            Some("crate::support::BaseService")
        );
        assert_eq!(order.fields[0].cardinality, Some(Cardinality::ManyToOne));
        assert_eq!(order.fields[1].cardinality, None);

        let identifier = order.identifier.as_ref().unwrap();
        assert_eq!(identifier.field, "id");
        assert_eq!(identifier.r#type.as_deref(), Some("u64"));

        let line = &manifest.models[1];
        assert!(!line.scrud_bean);
        let slots = line.identifier.as_ref().unwrap().composite.as_ref().unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].id_type, "String");

        assert_eq!(manifest.dtos[0].fields.as_deref(), Some(&["total".to_string()][..]));
    }

    #[test]
    fn test_parse_invalid_manifest() {
        assert_matches!(
            parse_manifest_from_str("[[model]]\nname = 3"),
            Err(ScrudError::TomlDe(_))
        );
        assert_matches!(
            parse_manifest("/nonexistent/manifest.toml"),
            Err(ScrudError::Configuration(_))
        );
    }

    #[test]
    fn test_unknown_cardinality_is_rejected() {
        let content = r#"
[[model]]
name = "A"
namespace = "x"
[[model.field]]
name = "b"
type = "B"
cardinality = "sideways"
"#;
        assert!(parse_manifest_from_str(content).is_err());
    }
}
