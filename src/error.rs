//! Errors raised while building a type model. Generation itself never fails:
//! anything it cannot resolve is left out of the output.
use crate::model::TypeId;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Bad JSON, or JSON of the wrong shape.
    #[error("invalid model document{}: at JSON path {path} → {message}", origin_suffix(.origin))]
    Document {
        origin: Option<String>,
        path: String,
        message: String,
    },

    #[error("type `{0}` is declared more than once")]
    DuplicateType(TypeId),

    #[error("field `{field}` of `{owner}` has a malformed type `{expr}`: {reason}")]
    TypeExpr {
        owner: TypeId,
        field: String,
        expr: String,
        reason: String,
    },

    #[error("`{owner}` extends `{parent}`, which is not a declared class")]
    UnknownParent { owner: TypeId, parent: String },

    /// A simple name shared by several declarations; use the qualified id.
    #[error("`{name}` is ambiguous: {}", join_ids(.candidates))]
    AmbiguousName { name: String, candidates: Vec<TypeId> },
}

fn origin_suffix(origin: &Option<String>) -> String {
    origin.as_ref().map(|o| format!(" ({o})")).unwrap_or_default()
}

fn join_ids(ids: &[TypeId]) -> String {
    ids.iter().map(TypeId::as_str).collect::<Vec<_>>().join(", ")
}
