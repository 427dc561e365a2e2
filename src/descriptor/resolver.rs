//! Resolution of raw manifest entries into model descriptors.

use log::{debug, warn};
use scrudgen_codec::Arity;

use crate::builders::naming::Naming;
use crate::descriptor::{
    CompositeSlot, DtoVariant, FieldDescriptor, GenerationFlags, IdentifierKind,
    IdentifierShape, ModelDescriptor, ModelTraits, RelationKind, ReverseField, Superclasses,
    TypeIndex, element_type_name,
};
use crate::errors::{ScrudError, ScrudResult};
use crate::metadata::{Cardinality, DtoBag, FieldBag, IdentifierBag, ModelBag, validate_model};
use crate::names::{Namespace, QualifiedName};

const AUDIT_TIMESTAMPS: [&str; 2] = ["created_date", "last_modified_date"];
const AUDIT_PRINCIPALS: [&str; 2] = ["created_by", "last_modified_by"];
const DISABLED_FIELD: &str = "disabled";

/// Turns [`ModelBag`]s into [`ModelDescriptor`]s against a shared type index.
///
/// Resolution is a pure function of its inputs: the same bag and index always
/// produce the same descriptor.
pub struct Resolver<'a> {
    index: &'a TypeIndex,
    naming: &'a Naming,
    dtos: &'a [DtoBag],
    runtime_crate: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(
        index: &'a TypeIndex,
        naming: &'a Naming,
        dtos: &'a [DtoBag],
        runtime_crate: &'a str,
    ) -> Self {
        Self {
            index,
            naming,
            dtos,
            runtime_crate,
        }
    }

    pub fn resolve(&self, bag: &ModelBag) -> ScrudResult<ModelDescriptor> {
        let model = bag.qualified_name();
        let validation = validate_model(bag);
        for warning in &validation.warnings {
            warn!("{warning}");
        }
        if !validation.is_valid {
            return Err(ScrudError::unresolvable(model, validation.summary()));
        }

        let namespace = Namespace::new(bag.namespace.as_str());
        let name = namespace.qualify(&bag.name);
        let identifier = match &bag.identifier {
            Some(identifier) => self.resolve_identifier(&model, &namespace, identifier)?,
            None => return Err(ScrudError::unresolvable(model, "declares no identifier")),
        };

        let mut fields = bag
            .fields
            .iter()
            .filter(|field| field.name != identifier.field)
            .map(|field| self.resolve_field(&model, &namespace, field))
            .collect::<ScrudResult<Vec<_>>>()?;
        self.append_synthetic_fields(bag, &mut fields);

        let dto_variants = self.resolve_dto_variants(bag, &name, &identifier, &fields)?;

        debug!(
            "Resolved {} with {} fields and {} DTO variants",
            name,
            fields.len(),
            dto_variants.len()
        );

        Ok(ModelDescriptor {
            parent_namespace: namespace.parent(),
            name,
            identifier,
            fields,
            dto_variants,
            flags: GenerationFlags {
                controller: bag.generate.controller,
                service: bag.generate.service,
                path_fragment: bag.generate.path_fragment.clone(),
                superclass: Superclasses {
                    repository: bag.generate.superclass.repository.clone(),
                    service_impl: bag.generate.superclass.service_impl.clone(),
                    controller: bag.generate.superclass.controller.clone(),
                },
            },
            traits: ModelTraits {
                entity: bag.entity,
                scrud_bean: bag.scrud_bean,
                disableable: bag.disableable,
                audited: bag.audited,
            },
            eager_fetch: bag.eager_fetch.clone(),
        })
    }

    fn resolve_identifier(
        &self,
        model: &str,
        namespace: &Namespace,
        identifier: &IdentifierBag,
    ) -> ScrudResult<IdentifierShape> {
        let kind = match (&identifier.r#type, &identifier.composite) {
            (Some(id_type), None) => IdentifierKind::Scalar {
                id_type: id_type.clone(),
            },
            (None, Some(slots)) => {
                let arity = Arity::try_from(slots.len()).map_err(|e| {
                    ScrudError::unresolvable(model, format!("invalid composite identifier: {e}"))
                })?;
                let slots = slots
                    .iter()
                    .map(|slot| {
                        let entity = self.index.resolve(&slot.entity, namespace).ok_or_else(|| {
                            ScrudError::unresolvable(
                                model,
                                format!("composite identifier entity '{}' does not resolve", slot.entity),
                            )
                        })?;
                        Ok(CompositeSlot {
                            entity,
                            id_type: slot.id_type.clone(),
                        })
                    })
                    .collect::<ScrudResult<Vec<_>>>()?;
                IdentifierKind::Composite { arity, slots }
            }
            _ => {
                return Err(ScrudError::unresolvable(
                    model,
                    "identifier must declare exactly one of type or composite",
                ));
            }
        };

        Ok(IdentifierShape {
            field: identifier.field.clone(),
            kind,
        })
    }

    fn resolve_field(
        &self,
        model: &str,
        namespace: &Namespace,
        field: &FieldBag,
    ) -> ScrudResult<FieldDescriptor> {
        let relation = RelationKind::from_cardinality(field.cardinality);

        let target = if relation == RelationKind::Scalar {
            None
        } else {
            let reference = field
                .target
                .clone()
                .or_else(|| element_type_name(&field.r#type));
            let resolved = reference
                .as_deref()
                .and_then(|reference| self.index.resolve(reference, namespace));
            match (relation, resolved) {
                (RelationKind::ToOne, None) => {
                    return Err(ScrudError::unresolvable(
                        model,
                        format!(
                            "to-one relation '{}' has no resolvable target type '{}'",
                            field.name, field.r#type
                        ),
                    ));
                }
                (_, None) => {
                    warn!(
                        "{model}.{}: target of {} field '{}' does not resolve",
                        field.name, relation, field.r#type
                    );
                    None
                }
                (_, resolved) => resolved,
            }
        };

        let reverse = match (relation, field.bidirectional, &field.reverse) {
            (RelationKind::ToOne, true, Some(reverse)) => Some(ReverseField {
                name: reverse.clone(),
                one_to_one: field.cardinality == Some(Cardinality::OneToOne),
            }),
            _ => None,
        };

        Ok(FieldDescriptor {
            name: field.name.clone(),
            declared_type: field.r#type.clone(),
            relation,
            target,
            reverse,
            optional: field.optional,
            synthetic: false,
        })
    }

    fn append_synthetic_fields(&self, bag: &ModelBag, fields: &mut Vec<FieldDescriptor>) {
        let timestamp = format!("{}::Timestamp", self.runtime_crate);
        let mut synthetic = Vec::new();
        if bag.audited {
            synthetic.extend(AUDIT_TIMESTAMPS.iter().map(|name| (*name, timestamp.clone())));
            synthetic.extend(AUDIT_PRINCIPALS.iter().map(|name| (*name, "String".to_string())));
        }
        if bag.disableable {
            synthetic.push((DISABLED_FIELD, timestamp.clone()));
        }

        for (name, declared_type) in synthetic {
            if fields.iter().any(|field| field.name == name) {
                continue;
            }
            fields.push(FieldDescriptor {
                optional: true,
                synthetic: true,
                ..FieldDescriptor::scalar(name, declared_type)
            });
        }
    }

    fn resolve_dto_variants(
        &self,
        bag: &ModelBag,
        name: &QualifiedName,
        identifier: &IdentifierShape,
        fields: &[FieldDescriptor],
    ) -> ScrudResult<Vec<DtoVariant>> {
        let model = name.to_string();
        let default_name = self.naming.default_dto_name(&bag.name);
        let declared: Vec<&DtoBag> = self
            .dtos
            .iter()
            .filter(|dto| dto.model == model || dto.model == bag.name)
            .collect();

        let mut variants: Vec<DtoVariant> = Vec::new();
        for reference in &bag.dtos {
            match declared.iter().find(|dto| &dto.name == reference) {
                Some(dto) => push_unique(&mut variants, variant_from(dto)),
                None if *reference == default_name => {
                    push_unique(&mut variants, DtoVariant::covering_all(reference.clone()))
                }
                None => {
                    return Err(ScrudError::unresolvable(
                        &model,
                        format!("DTO variant '{reference}' is not declared"),
                    ));
                }
            }
        }
        for dto in &declared {
            push_unique(&mut variants, variant_from(dto));
        }
        if variants.is_empty() && bag.scrud_bean {
            push_unique(&mut variants, DtoVariant::covering_all(default_name));
        }

        // Names the model does not have are dropped from the subset.
        for variant in &mut variants {
            let variant_name = variant.name.clone();
            if let Some(subset) = variant.fields.as_mut() {
                subset.retain(|field| {
                    let known =
                        *field == identifier.field || fields.iter().any(|f| &f.name == field);
                    if !known {
                        warn!("{model}: DTO variant '{variant_name}' skips unknown field '{field}'");
                    }
                    known
                });
            }
        }

        Ok(variants)
    }
}

fn push_unique(variants: &mut Vec<DtoVariant>, variant: DtoVariant) {
    if !variants.iter().any(|existing| existing.name == variant.name) {
        variants.push(variant);
    }
}

fn variant_from(dto: &DtoBag) -> DtoVariant {
    DtoVariant {
        name: dto.name.clone(),
        namespace: dto.namespace.as_deref().map(Namespace::new),
        fields: dto.fields.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Manifest, parse_manifest_from_str};
    use assert_matches::assert_matches;

    const MANIFEST: &str = r#"
[[model]]
name = "Customer"
namespace = "shop::model"
identifier = { type = "u64" }

[[model.field]]
name = "profile"
type = "Profile"
cardinality = "one-to-one"
bidirectional = true
reverse = "customer"

[[model]]
name = "Profile"
namespace = "shop::model"
identifier = { type = "u64" }

[[model]]
name = "Order"
namespace = "shop::model"
audited = true
disableable = true
dtos = ["OrderSummary"]
identifier = { type = "u64" }

[[model.field]]
name = "id"
type = "u64"

[[model.field]]
name = "customer"
type = "Option<Customer>"
cardinality = "many-to-one"
bidirectional = true
reverse = "orders"

[[model.field]]
name = "tags"
type = "Vec<String>"

[[model.field]]
name = "lines"
type = "Vec<OrderLine>"
cardinality = "one-to-many"

[[model]]
name = "OrderLine"
namespace = "shop::model"

[model.identifier]
composite = [{ entity = "Order", id_type = "u64" }, { entity = "Product" }]

[[model]]
name = "Product"
namespace = "catalog::model"
identifier = { type = "String" }

[[dto]]
name = "OrderSummary"
model = "Order"
fields = ["id", "customer"]
"#;

    fn fixture() -> (Manifest, TypeIndex) {
        let manifest = parse_manifest_from_str(MANIFEST).unwrap();
        let index = TypeIndex::build(&manifest, &[]);
        (manifest, index)
    }

    fn resolve(manifest: &Manifest, index: &TypeIndex, name: &str) -> ScrudResult<ModelDescriptor> {
        let naming = Naming::default();
        let resolver = Resolver::new(index, &naming, &manifest.dtos, "scrud_runtime");
        let bag = manifest.models.iter().find(|m| m.name == name).unwrap();
        resolver.resolve(bag)
    }

    #[test]
    fn test_resolve_relations_and_reverse_fields() {
        let (manifest, index) = fixture();
        let order = resolve(&manifest, &index, "Order").unwrap();

        assert!(order.field("id").is_none(), "identifier field is not a regular field");
        let customer = order.field("customer").unwrap();
        assert_eq!(customer.relation, RelationKind::ToOne);
        assert_eq!(customer.target.as_ref().unwrap().to_string(), "shop::model::Customer");
        let reverse = customer.reverse.as_ref().unwrap();
        assert_eq!(reverse.name, "orders");
        assert!(!reverse.one_to_one);

        // Container types do not make a field a relation.
        assert_eq!(order.field("tags").unwrap().relation, RelationKind::Scalar);
        assert_eq!(order.field("lines").unwrap().relation, RelationKind::ToMany);
        assert!(order.field("lines").unwrap().reverse.is_none());

        let customer = resolve(&manifest, &index, "Customer").unwrap();
        assert!(customer.field("profile").unwrap().reverse.as_ref().unwrap().one_to_one);
    }

    #[test]
    fn test_audit_and_soft_delete_fields() {
        let (manifest, index) = fixture();
        let order = resolve(&manifest, &index, "Order").unwrap();
        let synthetic: Vec<_> = order
            .fields
            .iter()
            .filter(|f| f.synthetic)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(
            synthetic,
            vec!["created_date", "last_modified_date", "created_by", "last_modified_by", "disabled"]
        );
        assert_eq!(
            order.field("disabled").unwrap().declared_type,
            "scrud_runtime::Timestamp"
        );
    }

    #[test]
    fn test_dto_variants() {
        let (manifest, index) = fixture();
        let order = resolve(&manifest, &index, "Order").unwrap();
        assert_eq!(order.dto_variants.len(), 1);
        assert_eq!(order.dto_variants[0].name, "OrderSummary");

        let customer = resolve(&manifest, &index, "Customer").unwrap();
        assert_eq!(customer.dto_variants, vec![DtoVariant::covering_all("CustomerDto")]);
    }

    #[test]
    fn test_dto_variant_skips_unknown_fields() {
        let (mut manifest, index) = fixture();
        if let Some(fields) = manifest.dtos[0].fields.as_mut() {
            fields.push("legacy_code".to_string());
        }
        let order = resolve(&manifest, &index, "Order").unwrap();
        let summary = &order.dto_variants[0];
        assert_eq!(
            summary.fields.as_deref(),
            Some(&["id".to_string(), "customer".to_string()][..])
        );
        assert!(!summary.includes("legacy_code"));
    }

    #[test]
    fn test_composite_identifier() {
        let (manifest, index) = fixture();
        let line = resolve(&manifest, &index, "OrderLine").unwrap();
        match &line.identifier.kind {
            IdentifierKind::Composite { arity, slots } => {
                assert_eq!(*arity, Arity::Two);
                assert_eq!(slots[0].entity.to_string(), "shop::model::Order");
                assert_eq!(slots[1].entity.to_string(), "catalog::model::Product");
                assert_eq!(slots[1].id_type, "String");
            }
            other => panic!("expected composite identifier, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolvable_models() {
        let (mut manifest, _) = fixture();
        manifest.models[2].fields[1].r#type = "Missing".to_string();
        let index = TypeIndex::build(&manifest, &[]);
        assert_matches!(
            resolve(&manifest, &index, "Order"),
            Err(ScrudError::UnresolvableModel { reason, .. }) if reason.contains("customer")
        );

        let (mut manifest, index) = fixture();
        manifest.models[2].dtos.push("OrderDetail".to_string());
        assert_matches!(
            resolve(&manifest, &index, "Order"),
            Err(ScrudError::UnresolvableModel { reason, .. }) if reason.contains("OrderDetail")
        );

        let (mut manifest, index) = fixture();
        manifest.models[3].identifier = None;
        assert_matches!(
            resolve(&manifest, &index, "OrderLine"),
            Err(ScrudError::UnresolvableModel { .. })
        );
    }

    #[test]
    fn test_composite_arity_out_of_range() {
        let (mut manifest, index) = fixture();
        if let Some(identifier) = manifest.models[3].identifier.as_mut() {
            identifier.composite.as_mut().unwrap().truncate(1);
        }
        assert_matches!(
            resolve(&manifest, &index, "OrderLine"),
            Err(ScrudError::UnresolvableModel { reason, .. }) if reason.contains("2 to 4")
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let (manifest, index) = fixture();
        let first = resolve(&manifest, &index, "Order").unwrap();
        let second = resolve(&manifest, &index, "Order").unwrap();
        assert_eq!(first, second);
    }
}
