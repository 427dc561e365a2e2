//! Structured members of an artifact specification.
//!
//! Members describe what a generated artifact contains without committing to
//! any target syntax. A renderer turns them into source text.

use scrudgen_codec::Arity;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::names::QualifiedName;
use crate::spec::EntityGraph;

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldMember),
    Operation(Operation),
    Dependency(Dependency),
    Identifier(IdentifierContract),
    EntityGraph(EntityGraph),
    Constant(Constant),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub value: String,
}

/// Type of a field, parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A type as written in the manifest
    Declared(String),
    /// A model or generated type
    Named(QualifiedName),
    /// Canonical string form of an identifier
    Text,
    /// An item of the runtime crate, by name
    Runtime(String),
    List(Box<TypeRef>),
    Optional(Box<TypeRef>),
}

impl TypeRef {
    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn optional(inner: TypeRef) -> Self {
        match inner {
            TypeRef::Optional(_) => inner,
            other => TypeRef::Optional(Box::new(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMember {
    pub name: String,
    pub ty: TypeRef,
    /// Model field this member mirrors
    pub source_field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DependencyRole {
    Repository,
    Service,
    Mapper,
    IdAdapter,
    /// Superclass override, composed as a delegate
    Base,
}

/// Another artifact or type this artifact calls into.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub role: DependencyRole,
    pub ty: TypeRef,
}

/// Identifier shape published by an IdAdapter.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierContract {
    /// Alias naming the model's identifier type
    pub alias: QualifiedName,
    pub model_field: String,
    pub codec: CodecContract,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CodecContract {
    Scalar { id_type: String },
    Composite {
        separator: char,
        arity: Arity,
        slots: Vec<CodecSlot>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodecSlot {
    /// Slot name on the composite value (`left`, `middle`, ...)
    pub slot: String,
    pub entity: QualifiedName,
    pub id_type: String,
}

/// Slot names used by the codec's composite types, by arity.
pub fn slot_names(arity: Arity) -> &'static [&'static str] {
    match arity {
        Arity::Two => &["left", "right"],
        Arity::Three => &["left", "middle", "right"],
        Arity::Four => &["left", "inner_left", "inner_right", "right"],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: Returns,
    pub failure: Option<Failure>,
    pub body: OperationBody,
    pub route: Option<Route>,
    pub doc: Option<String>,
}

impl Operation {
    pub fn new(name: impl Into<String>, body: OperationBody) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: Returns::Unit,
            failure: None,
            body,
            route: None,
            doc: None,
        }
    }

    pub fn param(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.param_with(name, ty, ParamMode::Owned)
    }

    pub fn param_ref(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.param_with(name, ty, ParamMode::Ref)
    }

    pub fn param_mut(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.param_with(name, ty, ParamMode::RefMut)
    }

    fn param_with(mut self, name: impl Into<String>, ty: TypeRef, mode: ParamMode) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
            mode,
        });
        self
    }

    pub fn returns(mut self, returns: Returns) -> Self {
        self.returns = returns;
        self
    }

    pub fn fails_with(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub mode: ParamMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    Owned,
    Ref,
    RefMut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Returns {
    Unit,
    Value(TypeRef),
    Optional(TypeRef),
    Many(TypeRef),
    Count,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The runtime's error type
    Runtime,
    /// The codec's `MalformedIdentifier`
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationBody {
    /// Declared only; implemented elsewhere
    Abstract,
    Query(Query),
    Persist(Persist),
    Delegate(Delegate),
    Map(Mapping),
    Codec(CodecOperation),
    Predicate(PredicateOperation),
    Handle(Handler),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub shape: QueryShape,
    /// Exclude soft-deleted rows
    pub not_disabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryShape {
    ById,
    All,
    Count,
    ExistsById,
    /// Query the related type directly: `related.reverse_field.id == id`
    DirectEquality {
        root: QualifiedName,
        reverse_field: String,
        /// The reverse side holds a collection of owners
        reverse_is_collection: bool,
    },
    /// Query the owning type by id and select the joined relation
    Join {
        root: QualifiedName,
        join_field: String,
        target: QualifiedName,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Persist {
    Save,
    /// Copy non-absent fields of a delta onto the persisted entity
    Patch,
    DeleteById { soft: bool },
    DeleteAll { soft: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delegate {
    pub role: DependencyRole,
    pub operation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapDirection {
    ToDto,
    /// Build a fresh model from a DTO
    ToModel,
    /// Copy DTO fields onto an existing model
    OntoModel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub direction: MapDirection,
    pub model: QualifiedName,
    pub dto: QualifiedName,
    pub id: IdConversion,
    pub copies: Vec<FieldCopy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdConversion {
    pub field: String,
    pub adapter: QualifiedName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldCopy {
    pub field: String,
    pub conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Direct,
    /// Embed the related model through its DTO mapper
    Embed { mapper: QualifiedName },
    EmbedList { mapper: QualifiedName },
    /// Collapse the related model to its encoded identifier
    Reference,
    ReferenceList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOperation {
    Encode,
    Decode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredicateOperation {
    /// Attribute path the predicate applies to
    pub path: String,
    pub operand: OperandCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum OperandCategory {
    Text,
    Comparable,
    Boolean,
    RelationId,
    CollectionMembership,
    Embedded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Contains,
}

impl OperandCategory {
    /// Operators a predicate over this category accepts.
    pub fn operators(self) -> Vec<Operator> {
        use Operator::*;
        match self {
            OperandCategory::Text => vec![Eq, NotEq, Like, NotLike, In, NotIn, IsNull, IsNotNull],
            OperandCategory::Comparable => Operator::iter()
                .filter(|op| !matches!(op, Like | NotLike | Contains))
                .collect(),
            OperandCategory::Boolean => vec![Eq, NotEq, IsNull, IsNotNull],
            OperandCategory::RelationId => vec![Eq, NotEq, In, NotIn, IsNull, IsNotNull],
            OperandCategory::CollectionMembership => vec![Contains, IsNull, IsNotNull],
            OperandCategory::Embedded => vec![Eq, NotEq, IsNull, IsNotNull],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    /// Path relative to the controller's base path
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handler {
    pub shape: HandlerShape,
    pub service_operation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandlerShape {
    GetById,
    List,
    Count,
    Exists,
    Create,
    Patch,
    Delete,
    /// Related entity of a to-one relation, through its mapper when the
    /// related model has a DTO
    Related { mapper: Option<QualifiedName> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_operators() {
        assert!(OperandCategory::Text.operators().contains(&Operator::Like));
        assert!(!OperandCategory::Comparable.operators().contains(&Operator::Like));
        assert!(OperandCategory::Comparable.operators().contains(&Operator::Gte));
        assert_eq!(
            OperandCategory::CollectionMembership.operators(),
            vec![Operator::Contains, Operator::IsNull, Operator::IsNotNull]
        );
    }

    #[test]
    fn test_optional_does_not_nest() {
        let ty = TypeRef::optional(TypeRef::optional(TypeRef::Text));
        assert_eq!(ty, TypeRef::Optional(Box::new(TypeRef::Text)));
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
