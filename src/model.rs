//! Read-only type model the generators walk.
//!
//! A model is a registry of declarations (classes and enums) keyed by their
//! qualified id. Field types are closed `TypeRef` trees; references to other
//! declarations go through `TypeId` and are resolved against the registry at
//! generation time, so a dangling reference is simply "unresolvable".
pub mod load;

use std::collections::BTreeSet;
use std::fmt;
use indexmap::IndexMap;

use crate::error::{ModelError, Result};

// ------------------------------- Ids ------------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(qualified: impl Into<String>) -> Self { Self(qualified.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
    /// Segment after the last `.`; this is the name used as a nested doc key.
    pub fn simple_name(&self) -> &str { simple_name(&self.0) }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

// ------------------------------ TypeRef ---------------------------------- //

/// Non-nullable scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl Primitive {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let p = match keyword {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "char" => Primitive::Char,
            _ => return None,
        };
        Some(p)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Char => "char",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Primitive(Primitive),
    /// Boxed / library scalar by qualified name. Whether it is actually a
    /// leaf is decided by the scalar table, not here.
    Scalar(String),
    Enum(TypeId),
    /// Sequence type; `element` is `None` when the type argument is missing
    /// or could not be resolved (raw `List`, bare wildcard).
    Collection {
        container: String,
        element: Option<Box<TypeRef>>,
    },
    Array(Box<TypeRef>),
    Composite(TypeId),
}

impl TypeRef {
    pub fn scalar(qualified: impl Into<String>) -> Self { TypeRef::Scalar(qualified.into()) }
    pub fn composite(id: impl Into<String>) -> Self { TypeRef::Composite(TypeId::new(id)) }
    pub fn enumeration(id: impl Into<String>) -> Self { TypeRef::Enum(TypeId::new(id)) }
    pub fn array(element: TypeRef) -> Self { TypeRef::Array(Box::new(element)) }
    pub fn list(element: TypeRef) -> Self {
        TypeRef::Collection { container: "List".into(), element: Some(Box::new(element)) }
    }
}

/// Presentable type text, e.g. `List<Address>`, `int[]`, `String`.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.keyword()),
            TypeRef::Scalar(name) => f.write_str(simple_name(name)),
            TypeRef::Enum(id) | TypeRef::Composite(id) => f.write_str(id.simple_name()),
            TypeRef::Collection { container, element: Some(el) } => write!(f, "{container}<{el}>"),
            TypeRef::Collection { container, element: None } => f.write_str(container),
            TypeRef::Array(el) => write!(f, "{el}[]"),
        }
    }
}

// ---------------------------- Declarations ------------------------------- //

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub description: String,
    /// Constraint annotation texts in declaration order, e.g. `@NotBlank`.
    pub constraints: Vec<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self { name: name.into(), ty, description: String::new(), constraints: Vec::new() }
    }
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
    pub fn constrained(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDecl {
    pub id: TypeId,
    pub parent: Option<TypeId>,
    /// Own fields only; see `TypeModel::all_fields` for the flattened view.
    pub fields: Vec<Field>,
}

impl CompositeDecl {
    pub fn new(id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self { id: TypeId::new(id), parent: None, fields }
    }
    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(TypeId::new(parent));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub id: TypeId,
    pub constants: Vec<EnumConstant>,
}

impl EnumDecl {
    pub fn new<I, S>(id: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let constants = constants
            .into_iter()
            .map(|(name, description)| EnumConstant { name: name.into(), description: description.into() })
            .collect();
        Self { id: TypeId::new(id), constants }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDecl {
    Composite(CompositeDecl),
    Enum(EnumDecl),
}

impl TypeDecl {
    pub fn id(&self) -> &TypeId {
        match self {
            TypeDecl::Composite(c) => &c.id,
            TypeDecl::Enum(e) => &e.id,
        }
    }
    pub fn as_composite(&self) -> Option<&CompositeDecl> {
        match self {
            TypeDecl::Composite(c) => Some(c),
            TypeDecl::Enum(_) => None,
        }
    }
}

impl From<CompositeDecl> for TypeDecl {
    fn from(c: CompositeDecl) -> Self { TypeDecl::Composite(c) }
}

impl From<EnumDecl> for TypeDecl {
    fn from(e: EnumDecl) -> Self { TypeDecl::Enum(e) }
}

// ------------------------------ Registry --------------------------------- //

/// Declarations in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    decls: IndexMap<TypeId, TypeDecl>,
}

impl TypeModel {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, decl: impl Into<TypeDecl>) -> Result<()> {
        let decl = decl.into();
        let id = decl.id().clone();
        if self.decls.contains_key(&id) {
            return Err(ModelError::DuplicateType(id));
        }
        self.decls.insert(id, decl);
        Ok(())
    }

    /// Builder-style `insert` for hand-assembled models.
    pub fn with(mut self, decl: impl Into<TypeDecl>) -> Result<Self> {
        self.insert(decl)?;
        Ok(self)
    }

    pub fn get(&self, id: &TypeId) -> Option<&TypeDecl> {
        self.decls.get(id)
    }

    /// Find a declaration by qualified id, falling back to its simple name.
    /// A simple name shared by several declarations is an error.
    pub fn find(&self, name: &str) -> Result<Option<&TypeDecl>> {
        if let Some(decl) = self.decls.get(&TypeId::new(name)) {
            return Ok(Some(decl));
        }
        let matches: Vec<&TypeDecl> = self
            .decls
            .values()
            .filter(|d| d.id().simple_name() == name)
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [decl] => Ok(Some(*decl)),
            _ => Err(ModelError::AmbiguousName {
                name: name.to_string(),
                candidates: matches.iter().map(|d| d.id().clone()).collect(),
            }),
        }
    }

    /// `find` without the error: unknown and ambiguous names are both `None`.
    pub fn lookup(&self, name: &str) -> Option<&TypeDecl> {
        self.find(name).ok().flatten()
    }

    pub fn len(&self) -> usize { self.decls.len() }
    pub fn is_empty(&self) -> bool { self.decls.is_empty() }

    pub fn composites(&self) -> impl Iterator<Item = &CompositeDecl> {
        self.decls.values().filter_map(TypeDecl::as_composite)
    }

    /// Own fields first, then each ancestor's (nearest first). A name already
    /// contributed by a nearer type is not repeated. Both generators use this
    /// order, which keeps value and documentation trees key-aligned.
    pub fn all_fields<'m>(&'m self, decl: &'m CompositeDecl) -> Vec<&'m Field> {
        let mut out: Vec<&Field> = Vec::new();
        let mut names: BTreeSet<&str> = BTreeSet::new();
        let mut visited: BTreeSet<&TypeId> = BTreeSet::new();
        let mut current = Some(decl);
        while let Some(c) = current {
            if !visited.insert(&c.id) {
                break; // inheritance cycle
            }
            for f in &c.fields {
                if names.insert(f.name.as_str()) {
                    out.push(f);
                }
            }
            current = c
                .parent
                .as_ref()
                .and_then(|p| self.get(p))
                .and_then(TypeDecl::as_composite);
        }
        out
    }
}

// ------------------------------- Tests ------------------------------------ //
