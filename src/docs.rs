//! Documentation tree: per-field description, type text, constraints, enum
//! options and nested class docs, keyed like the sample value tree.
//!
//! Entry shape, keys in this order:
//!
//! ```text
//! { "comment": "...", "type": "List<Address>", "valid": [..],
//!   "optionalValue": {CONST: "desc", ..},   // enum or sequence of enum
//!   "Address": { <nested docs> } }         // class or sequence of class
//! ```
//!
//! Scalar fields carry no `type`.
use std::collections::BTreeSet;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::classify::{innermost_element, Category, Classifier};
use crate::model::{CompositeDecl, EnumDecl, Field, TypeId};

pub const COMMENT: &str = "comment";
pub const TYPE: &str = "type";
pub const VALID: &str = "valid";
pub const OPTIONAL_VALUE: &str = "optionalValue";
pub const ENUM_TYPE: &str = "enum";

pub struct DocGenerator<'m> {
    classifier: Classifier<'m>,
    expanding: BTreeSet<&'m TypeId>,
}

impl<'m> DocGenerator<'m> {
    pub fn new(classifier: Classifier<'m>) -> Self {
        Self { classifier, expanding: BTreeSet::new() }
    }

    pub fn generate(&mut self, decl: &'m CompositeDecl) -> Map<String, Value> {
        let mut out = Map::new();
        if !self.expanding.insert(&decl.id) {
            debug!(ty = %decl.id, "cyclic reference, emitting empty docs");
            return out;
        }
        trace!(ty = %decl.id, "expanding docs");

        for field in self.classifier.model().all_fields(decl) {
            match self.field_entry(field) {
                Some(entry) => { out.insert(field.name.clone(), Value::Object(entry)); }
                None => debug!(ty = %decl.id, field = %field.name, "unresolvable type, docs omitted"),
            }
        }

        self.expanding.remove(&decl.id);
        out
    }

    fn field_entry(&mut self, field: &'m Field) -> Option<Map<String, Value>> {
        let mut entry = Map::new();
        entry.insert(COMMENT.into(), Value::from(field.description.as_str()));

        // sequences first: a list of enums documents the enum's constants
        // under the list's own entry
        let target = match self.classifier.classify(&field.ty)? {
            Category::Scalar => {
                entry.insert(VALID.into(), valid(field));
                return Some(entry);
            }
            Category::Collection => {
                let element = innermost_element(&field.ty)?;
                self.classifier.classify(element)?
            }
            other => other,
        };

        match target {
            Category::Enum(decl) => {
                entry.insert(TYPE.into(), Value::from(ENUM_TYPE));
                entry.insert(VALID.into(), valid(field));
                entry.insert(OPTIONAL_VALUE.into(), enum_options(decl));
            }
            Category::Composite(decl) => {
                entry.insert(TYPE.into(), Value::from(field.ty.to_string()));
                entry.insert(VALID.into(), valid(field));
                entry.insert(decl.id.simple_name().to_string(), Value::Object(self.generate(decl)));
            }
            // sequence of scalars; nothing nested to describe
            Category::Scalar | Category::Collection => {
                entry.insert(TYPE.into(), Value::from(field.ty.to_string()));
                entry.insert(VALID.into(), valid(field));
            }
        }
        Some(entry)
    }
}

/// Constraint texts without their leading marker, e.g. `@NotBlank` → `NotBlank`.
fn valid(field: &Field) -> Value {
    let items = field
        .constraints
        .iter()
        .map(|c| {
            let c = c.trim();
            Value::from(c.strip_prefix(|ch: char| !ch.is_alphanumeric()).unwrap_or(c))
        })
        .collect();
    Value::Array(items)
}

fn enum_options(decl: &EnumDecl) -> Value {
    let options = decl
        .constants
        .iter()
        .map(|c| (c.name.clone(), Value::from(c.description.as_str())))
        .collect::<Map<String, Value>>();
    Value::Object(options)
}

// ------------------------------- Tests ------------------------------------ //
