use crate::defaults::ScalarTable;
use crate::model::{CompositeDecl, EnumDecl, TypeDecl, TypeModel, TypeRef};

/// What a declared type is, for generation purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Category<'m> {
    Scalar,
    Enum(&'m EnumDecl),
    /// Arrays and collections; see `element_type`.
    Collection,
    Composite(&'m CompositeDecl),
}

#[derive(Debug, Clone, Copy)]
pub struct Classifier<'m> {
    model: &'m TypeModel,
    table: &'m ScalarTable,
}

impl<'m> Classifier<'m> {
    pub fn new(model: &'m TypeModel, table: &'m ScalarTable) -> Self {
        Self { model, table }
    }

    pub fn model(&self) -> &'m TypeModel { self.model }

    /// `None` when the type is not a leaf the scalar table knows about and
    /// does not resolve to a declaration in the model. Callers omit such
    /// fields.
    pub fn classify(&self, ty: &TypeRef) -> Option<Category<'m>> {
        match ty {
            // sequence-ness is decided before anything else, so a list of
            // enums is a Collection and never an Enum
            TypeRef::Array(_) | TypeRef::Collection { .. } => Some(Category::Collection),
            TypeRef::Primitive(_) => Some(Category::Scalar),
            TypeRef::Scalar(name) => self.table.contains(name).then_some(Category::Scalar),
            // follow the id to what is actually declared
            TypeRef::Enum(id) | TypeRef::Composite(id) => match self.model.get(id)? {
                TypeDecl::Enum(e) => Some(Category::Enum(e)),
                TypeDecl::Composite(c) => Some(Category::Composite(c)),
            },
        }
    }
}

/// Element type of an array or collection. `None` for non-sequences and for
/// collections whose element could not be resolved.
pub fn element_type(ty: &TypeRef) -> Option<&TypeRef> {
    match ty {
        TypeRef::Array(el) => Some(el.as_ref()),
        TypeRef::Collection { element, .. } => element.as_deref(),
        _ => None,
    }
}

/// Strip every sequence layer: `List<Set<Tag>>` → `Tag`.
pub fn innermost_element(ty: &TypeRef) -> Option<&TypeRef> {
    let mut current = element_type(ty)?;
    while let TypeRef::Array(_) | TypeRef::Collection { .. } = current {
        current = element_type(current)?;
    }
    Some(current)
}
