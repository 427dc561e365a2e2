//! Naming conventions for generated artifacts.
//!
//! A generated artifact's qualified name is a function of the model's
//! namespace, its simple name, the artifact kind and (for per-variant kinds)
//! the DTO variant. Suffixes can be overridden with `naming.<kind>_suffix`
//! settings.

use heck::{ToKebabCase, ToSnakeCase};

use crate::config::Settings;
use crate::descriptor::{DtoVariant, ModelDescriptor};
use crate::names::{Namespace, QualifiedName};
use crate::spec::ArtifactKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub dto_suffix: String,
    pub mapper_suffix: String,
    pub id_adapter_suffix: String,
    pub id_alias_suffix: String,
    pub repository_suffix: String,
    pub service_suffix: String,
    pub service_impl_suffix: String,
    pub controller_suffix: String,
    pub predicates_suffix: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            dto_suffix: "Dto".to_string(),
            mapper_suffix: "Mapper".to_string(),
            id_adapter_suffix: "IdAdapter".to_string(),
            id_alias_suffix: "Id".to_string(),
            repository_suffix: "Repository".to_string(),
            service_suffix: "Service".to_string(),
            service_impl_suffix: "ServiceImpl".to_string(),
            controller_suffix: "Controller".to_string(),
            predicates_suffix: "Predicates".to_string(),
        }
    }
}

impl Naming {
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Naming::default();
        let suffix = |key: &str, default: &str| -> String {
            settings
                .get(&format!("naming.{key}_suffix"))
                .unwrap_or(default)
                .to_string()
        };
        Self {
            dto_suffix: suffix("dto", &defaults.dto_suffix),
            mapper_suffix: suffix("mapper", &defaults.mapper_suffix),
            id_adapter_suffix: suffix("id_adapter", &defaults.id_adapter_suffix),
            id_alias_suffix: suffix("id_alias", &defaults.id_alias_suffix),
            repository_suffix: suffix("repository", &defaults.repository_suffix),
            service_suffix: suffix("service", &defaults.service_suffix),
            service_impl_suffix: suffix("service_impl", &defaults.service_impl_suffix),
            controller_suffix: suffix("controller", &defaults.controller_suffix),
            predicates_suffix: suffix("predicates", &defaults.predicates_suffix),
        }
    }

    /// Name of the variant synthesised for models declaring none.
    pub fn default_dto_name(&self, model: &str) -> String {
        format!("{model}{}", self.dto_suffix)
    }

    fn namespace_for(&self, descriptor: &ModelDescriptor, kind: ArtifactKind) -> Namespace {
        match kind.sub_namespace() {
            Some(segment) => descriptor.parent_namespace.child(segment),
            None => descriptor.namespace().clone(),
        }
    }

    /// Qualified name of a per-model artifact.
    pub fn model_artifact(&self, descriptor: &ModelDescriptor, kind: ArtifactKind) -> QualifiedName {
        let model = descriptor.simple_name();
        let name = match kind {
            ArtifactKind::Dto => self.default_dto_name(model),
            ArtifactKind::Mapper => {
                format!("{}{}", self.default_dto_name(model), self.mapper_suffix)
            }
            ArtifactKind::IdAdapter => format!("{model}{}", self.id_adapter_suffix),
            ArtifactKind::Repository => format!("{model}{}", self.repository_suffix),
            ArtifactKind::ServiceInterface => format!("{model}{}", self.service_suffix),
            ArtifactKind::ServiceImpl => format!("{model}{}", self.service_impl_suffix),
            ArtifactKind::Controller => format!("{model}{}", self.controller_suffix),
            ArtifactKind::PredicateFactory => format!("{model}{}", self.predicates_suffix),
        };
        self.namespace_for(descriptor, kind).qualify(name)
    }

    pub fn dto(&self, descriptor: &ModelDescriptor, variant: &DtoVariant) -> QualifiedName {
        let namespace = variant
            .namespace
            .clone()
            .unwrap_or_else(|| self.namespace_for(descriptor, ArtifactKind::Dto));
        namespace.qualify(&variant.name)
    }

    pub fn mapper(&self, descriptor: &ModelDescriptor, variant: &DtoVariant) -> QualifiedName {
        self.namespace_for(descriptor, ArtifactKind::Mapper)
            .qualify(format!("{}{}", variant.name, self.mapper_suffix))
    }

    /// Alias naming the model's identifier type, declared by its IdAdapter.
    pub fn id_alias(&self, descriptor: &ModelDescriptor) -> QualifiedName {
        descriptor
            .namespace()
            .qualify(format!("{}{}", descriptor.simple_name(), self.id_alias_suffix))
    }

    /// Controller base path fragment: explicit override or the kebab-case
    /// plural of the model name.
    pub fn path_fragment(&self, descriptor: &ModelDescriptor) -> String {
        match &descriptor.flags.path_fragment {
            Some(fragment) => fragment.trim_matches('/').to_string(),
            None => pluralize(&descriptor.simple_name().to_kebab_case()),
        }
    }

    /// Repository operation resolving a relation of the model.
    pub fn relation_finder(&self, field: &str) -> String {
        format!("find_{}", field.to_snake_case())
    }
}

fn pluralize(word: &str) -> String {
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before_vowel = stem
            .chars()
            .last()
            .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
        if !before_vowel {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}
