//! JSON model documents → `TypeModel`.
//!
//! ```json
//! { "types": [
//!     { "kind": "class", "name": "com.acme.Person", "extends": "com.acme.Base",
//!       "fields": [ { "name": "tags", "type": "List<Tag>", "comment": "..",
//!                     "constraints": ["@NotNull"] } ] },
//!     { "kind": "enum", "name": "com.acme.Tag",
//!       "constants": [ { "name": "RED", "comment": ".." } ] } ] }
//! ```
use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::defaults::ScalarTable;
use crate::error::{ModelError, Result};
use crate::model::{
    simple_name, CompositeDecl, EnumConstant, EnumDecl, Field, Primitive, TypeId, TypeModel, TypeRef,
};

// ------------------------------ Document --------------------------------- //

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub types: Vec<DeclDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeclDocument {
    Class {
        name: String,
        #[serde(default)]
        extends: Option<String>,
        #[serde(default)]
        fields: Vec<FieldDocument>,
    },
    Enum {
        name: String,
        #[serde(default)]
        constants: Vec<ConstantDocument>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstantDocument {
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str, origin: Option<&str>) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| ModelError::Document {
        origin: origin.map(str::to_string),
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Parse one document against the shared scalar table.
pub fn parse_model(src: &str) -> Result<TypeModel> {
    let doc = from_str_with_path::<ModelDocument>(src, None)?;
    ModelBuilder::new(ScalarTable::shared()).document(doc).build()
}

pub fn from_value(value: serde_json::Value) -> Result<TypeModel> {
    let doc = serde_path_to_error::deserialize::<_, ModelDocument>(value).map_err(|err| {
        ModelError::Document {
            origin: None,
            path: err.path().to_string(),
            message: err.into_inner().to_string(),
        }
    })?;
    ModelBuilder::new(ScalarTable::shared()).document(doc).build()
}

// ------------------------------- Builder --------------------------------- //

/// Collects any number of documents, then resolves every field type at once
/// so forward and cross-document references work.
pub struct ModelBuilder<'t> {
    table: &'t ScalarTable,
    decls: Vec<DeclDocument>,
}

#[derive(Clone, Copy, PartialEq)]
enum Kind { Class, Enum }

impl<'t> ModelBuilder<'t> {
    pub fn new(table: &'t ScalarTable) -> Self {
        Self { table, decls: Vec::new() }
    }

    pub fn document(mut self, doc: ModelDocument) -> Self {
        self.decls.extend(doc.types);
        self
    }

    pub fn source(self, src: &str, origin: &str) -> Result<Self> {
        let doc = from_str_with_path::<ModelDocument>(src, Some(origin))?;
        Ok(self.document(doc))
    }

    pub fn build(self) -> Result<TypeModel> {
        let mut declared: HashMap<String, Kind> = HashMap::new();
        let mut by_simple: HashMap<String, Vec<String>> = HashMap::new();
        for decl in &self.decls {
            let (name, kind) = match decl {
                DeclDocument::Class { name, .. } => (name, Kind::Class),
                DeclDocument::Enum { name, .. } => (name, Kind::Enum),
            };
            if declared.insert(name.clone(), kind).is_some() {
                return Err(ModelError::DuplicateType(TypeId::new(name.as_str())));
            }
            by_simple.entry(simple_name(name).to_string()).or_default().push(name.clone());
        }
        let resolver = Resolver { table: self.table, declared: &declared, by_simple: &by_simple };

        let mut model = TypeModel::new();
        for decl in self.decls {
            match decl {
                DeclDocument::Class { name, extends, fields } => {
                    let id = TypeId::new(name);
                    let parent = match extends {
                        None => None,
                        Some(p) => match resolver.declared(&p)? {
                            Some((q, Kind::Class)) => Some(TypeId::new(q)),
                            _ => return Err(ModelError::UnknownParent { owner: id, parent: p }),
                        },
                    };
                    let fields = fields
                        .into_iter()
                        .map(|f| resolver.field(&id, f))
                        .collect::<Result<Vec<_>>>()?;
                    model.insert(CompositeDecl { id, parent, fields })?;
                }
                DeclDocument::Enum { name, constants } => {
                    let constants = constants
                        .into_iter()
                        .map(|c| EnumConstant { name: c.name, description: c.comment })
                        .collect();
                    model.insert(EnumDecl { id: TypeId::new(name), constants })?;
                }
            }
        }
        Ok(model)
    }
}

struct Resolver<'a> {
    table: &'a ScalarTable,
    declared: &'a HashMap<String, Kind>,
    by_simple: &'a HashMap<String, Vec<String>>,
}

impl<'a> Resolver<'a> {
    /// Qualified name first, then a simple name that only one declaration has.
    fn declared(&self, name: &str) -> Result<Option<(&'a str, Kind)>> {
        if let Some((q, kind)) = self.declared.get_key_value(name) {
            return Ok(Some((q.as_str(), *kind)));
        }
        match self.by_simple.get(name).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([q]) => Ok(self.declared.get(q).map(|kind| (q.as_str(), *kind))),
            Some(many) => Err(ModelError::AmbiguousName {
                name: name.to_string(),
                candidates: many.iter().map(|q| TypeId::new(q.as_str())).collect(),
            }),
        }
    }

    fn field(&self, owner: &TypeId, doc: FieldDocument) -> Result<Field> {
        let expr = parse_type_expr(&doc.ty).map_err(|reason| ModelError::TypeExpr {
            owner: owner.clone(),
            field: doc.name.clone(),
            expr: doc.ty.clone(),
            reason,
        })?;
        Ok(Field {
            name: doc.name,
            ty: self.resolve(&expr)?,
            description: doc.comment,
            constraints: doc.constraints,
        })
    }

    fn resolve(&self, expr: &TypeExpr) -> Result<TypeRef> {
        let base = self.resolve_base(expr)?;
        Ok((0..expr.dims).fold(base, |ty, _| TypeRef::Array(Box::new(ty))))
    }

    /// primitive → declared type → known scalar → collection → unresolved
    fn resolve_base(&self, expr: &TypeExpr) -> Result<TypeRef> {
        if expr.args.is_empty() {
            if let Some(p) = Primitive::from_keyword(&expr.name) {
                return Ok(TypeRef::Primitive(p));
            }
        }
        match self.declared(&expr.name)? {
            Some((q, Kind::Class)) => return Ok(TypeRef::Composite(TypeId::new(q))),
            Some((q, Kind::Enum)) => return Ok(TypeRef::Enum(TypeId::new(q))),
            None => {}
        }
        if let Some(q) = self.table.resolve_name(&expr.name) {
            return Ok(TypeRef::Scalar(q.to_string()));
        }
        if is_collection_container(&expr.name) {
            let element = match expr.args.as_slice() {
                [TypeArg::Type(arg)] => Some(Box::new(self.resolve(arg)?)),
                _ => None,
            };
            return Ok(TypeRef::Collection { container: simple_name(&expr.name).to_string(), element });
        }
        Ok(TypeRef::Composite(TypeId::new(expr.name.as_str())))
    }
}

const COLLECTION_CONTAINERS: &[&str] = &[
    "List", "ArrayList", "LinkedList", "Set", "HashSet", "LinkedHashSet", "TreeSet",
    "SortedSet", "Collection", "Iterable", "Queue", "Deque",
];

fn is_collection_container(name: &str) -> bool {
    let simple = match name.strip_prefix("java.util.").or_else(|| name.strip_prefix("java.lang.")) {
        Some(rest) => rest,
        None if !name.contains('.') => name,
        None => return false,
    };
    COLLECTION_CONTAINERS.contains(&simple)
}

// --------------------------- Type expressions ---------------------------- //

static HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\?\s+(?:extends|super)\s+)?([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*")
        .expect("type head pattern")
});
static DIMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\s*\[\s*\])*").expect("array dims pattern"));

#[derive(Debug, Clone, PartialEq)]
struct TypeExpr {
    name: String,
    args: Vec<TypeArg>,
    dims: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum TypeArg {
    /// Bare `?`.
    Wildcard,
    Type(TypeExpr),
}

/// `Name`, `Name<Arg, ..>`, trailing `[]`s; `? extends X` / `? super X` read as `X`.
fn parse_type_expr(src: &str) -> std::result::Result<TypeExpr, String> {
    let (expr, rest) = parse_prefix(src)?;
    match rest.trim() {
        "" => Ok(expr),
        tail => Err(format!("unexpected `{tail}`")),
    }
}

fn parse_prefix(src: &str) -> std::result::Result<(TypeExpr, &str), String> {
    let caps = HEAD
        .captures(src)
        .ok_or_else(|| format!("expected a type name at `{}`", src.trim()))?;
    let name = caps[1].to_string();
    let mut rest = &src[caps.get(0).map_or(0, |m| m.end())..];

    let mut args = Vec::new();
    if let Some(inner) = rest.strip_prefix('<') {
        rest = inner;
        loop {
            let trimmed = rest.trim_start();
            let bare_wildcard = trimmed
                .strip_prefix('?')
                .filter(|after| !after.trim_start().starts_with("extends") && !after.trim_start().starts_with("super"));
            match bare_wildcard {
                Some(after) => {
                    args.push(TypeArg::Wildcard);
                    rest = after;
                }
                None => {
                    let (arg, after) = parse_prefix(trimmed)?;
                    args.push(TypeArg::Type(arg));
                    rest = after;
                }
            }
            let trimmed = rest.trim_start();
            if let Some(after) = trimmed.strip_prefix(',') {
                rest = after;
            } else if let Some(after) = trimmed.strip_prefix('>') {
                rest = after;
                break;
            } else {
                return Err(format!("expected `,` or `>` at `{trimmed}`"));
            }
        }
    }

    let dims_end = DIMS.find(rest).map_or(0, |m| m.end());
    let dims = rest[..dims_end].matches('[').count();
    Ok((TypeExpr { name, args, dims }, &rest[dims_end..]))
}

// ------------------------------- Tests ------------------------------------ //
