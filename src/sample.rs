//! Sample value tree: one representative instance of a class.
use std::collections::BTreeSet;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::classify::{element_type, Category, Classifier};
use crate::defaults::Synthesizer;
use crate::model::{CompositeDecl, EnumDecl, TypeId, TypeRef};

pub struct SampleGenerator<'m> {
    classifier: Classifier<'m>,
    synth: &'m Synthesizer<'m>,
    /// Classes currently being expanded on this call path.
    expanding: BTreeSet<&'m TypeId>,
}

impl<'m> SampleGenerator<'m> {
    pub fn new(classifier: Classifier<'m>, synth: &'m Synthesizer<'m>) -> Self {
        Self { classifier, synth, expanding: BTreeSet::new() }
    }

    /// Fields appear in flattened declaration order. Re-entering a class that
    /// is already open yields an empty object.
    pub fn generate(&mut self, decl: &'m CompositeDecl) -> Map<String, Value> {
        let mut out = Map::new();
        if !self.expanding.insert(&decl.id) {
            debug!(ty = %decl.id, "cyclic reference, emitting empty object");
            return out;
        }
        trace!(ty = %decl.id, "expanding sample");

        for field in self.classifier.model().all_fields(decl) {
            match self.field_value(&field.ty) {
                Some(v) => { out.insert(field.name.clone(), v); }
                None => debug!(ty = %decl.id, field = %field.name, "no sample value, field omitted"),
            }
        }

        self.expanding.remove(&decl.id);
        out
    }

    fn field_value(&mut self, ty: &'m TypeRef) -> Option<Value> {
        match self.classifier.classify(ty)? {
            Category::Scalar => self.synth.default_for(ty),
            // second constant; fewer than two means no sample
            Category::Enum(decl) => decl.constants.get(1).map(|c| Value::from(c.name.as_str())),
            Category::Collection => self.sequence_value(element_type(ty)?),
            Category::Composite(decl) => Some(Value::Object(self.generate(decl))),
        }
    }

    /// One-element array wrapping a sample of `element`.
    fn sequence_value(&mut self, element: &'m TypeRef) -> Option<Value> {
        let item = match self.classifier.classify(element)? {
            Category::Scalar => self.synth.default_for(element),
            Category::Enum(decl) => Some(constant_names(decl)),
            Category::Collection => Some(self.sequence_value(element_type(element)?)?),
            Category::Composite(decl) if self.expanding.contains(&decl.id) => {
                debug!(ty = %decl.id, "cyclic reference, emitting empty array");
                None
            }
            Category::Composite(decl) => Some(Value::Object(self.generate(decl))),
        };
        Some(Value::Array(item.into_iter().collect()))
    }
}

/// Every constant name, in declaration order.
fn constant_names(decl: &EnumDecl) -> Value {
    Value::Array(decl.constants.iter().map(|c| Value::from(c.name.as_str())).collect())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::ScalarTable;
    use crate::model::{EnumDecl, Field, Primitive, TypeDecl, TypeModel};
    use chrono::{Local, TimeZone};
    use serde_json::json;

    fn sample(model: &TypeModel, root: &str) -> Value {
        let table = ScalarTable::standard();
        let now = Local.with_ymd_and_hms(2020, 5, 9, 9, 15, 0).single().unwrap();
        let synth = Synthesizer::new(&table, now);
        let decl = model.lookup(root).and_then(TypeDecl::as_composite).unwrap();
        let mut generator = SampleGenerator::new(Classifier::new(model, &table), &synth);
        Value::Object(generator.generate(decl))
    }

    fn string() -> TypeRef { TypeRef::scalar("java.lang.String") }

    #[test]
    fn flat_scalars_follow_field_order() {
        let model = TypeModel::new()
            .with(CompositeDecl::new("Flat", vec![
                Field::new("flag", TypeRef::Primitive(Primitive::Boolean)),
                Field::new("count", TypeRef::scalar("java.lang.Long")),
                Field::new("ratio", TypeRef::Primitive(Primitive::Double)),
                Field::new("label", string()),
                Field::new("when", TypeRef::scalar("java.time.LocalDate")),
                Field::new("opaque", TypeRef::scalar("java.util.UUID")),
            ])).unwrap();
        let v = sample(&model, "Flat");
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"flag":false,"count":0,"ratio":0.0,"label":"demoData","when":"2020-05-09"}"#
        );
    }

    #[test]
    fn enums_pick_the_second_constant() {
        let model = TypeModel::new()
            .with(EnumDecl::new("Level", [("A", "first"), ("B", "second"), ("C", "third")])).unwrap()
            .with(EnumDecl::new("Lonely", [("ONLY", "")])).unwrap()
            .with(CompositeDecl::new("Holder", vec![
                Field::new("level", TypeRef::enumeration("Level")),
                Field::new("lonely", TypeRef::enumeration("Lonely")),
            ])).unwrap();
        assert_eq!(sample(&model, "Holder"), json!({ "level": "B" }));
    }

    #[test]
    fn sequences_wrap_one_sample() {
        let model = TypeModel::new()
            .with(EnumDecl::new("Flag", [("A", ""), ("B", "")])).unwrap()
            .with(CompositeDecl::new("Point", vec![
                Field::new("x", TypeRef::Primitive(Primitive::Int)),
                Field::new("y", TypeRef::Primitive(Primitive::Int)),
            ])).unwrap()
            .with(CompositeDecl::new("Shape", vec![
                Field::new("flags", TypeRef::list(TypeRef::enumeration("Flag"))),
                Field::new("modes", TypeRef::array(TypeRef::enumeration("Flag"))),
                Field::new("points", TypeRef::list(TypeRef::composite("Point"))),
                Field::new("names", TypeRef::array(string())),
                Field::new("ids", TypeRef::array(TypeRef::Primitive(Primitive::Long))),
                Field::new("grid", TypeRef::list(TypeRef::list(TypeRef::Primitive(Primitive::Int)))),
            ])).unwrap();
        assert_eq!(sample(&model, "Shape"), json!({
            "flags": [["A", "B"]],
            "modes": [["A", "B"]],
            "points": [{ "x": 0, "y": 0 }],
            "names": ["demoData"],
            "ids": [0],
            "grid": [[0]],
        }));
    }

    #[test]
    fn unresolvable_fields_are_skipped() {
        let model = TypeModel::new()
            .with(CompositeDecl::new("Loose", vec![
                Field::new("raw", TypeRef::Collection { container: "List".into(), element: None }),
                Field::new("ghost", TypeRef::composite("com.acme.Ghost")),
                Field::new("ghosts", TypeRef::list(TypeRef::composite("com.acme.Ghost"))),
                Field::new("kept", string()),
            ])).unwrap();
        assert_eq!(sample(&model, "Loose"), json!({ "kept": "demoData" }));
    }

    #[test]
    fn nested_objects_recurse() {
        let model = TypeModel::new()
            .with(CompositeDecl::new("Address", vec![Field::new("city", string())])).unwrap()
            .with(CompositeDecl::new("Person", vec![
                Field::new("name", string()),
                Field::new("address", TypeRef::composite("Address")),
            ])).unwrap();
        assert_eq!(sample(&model, "Person"), json!({
            "name": "demoData",
            "address": { "city": "demoData" },
        }));
    }

    #[test]
    fn cycles_are_truncated() {
        let model = TypeModel::new()
            .with(CompositeDecl::new("A", vec![
                Field::new("id", TypeRef::Primitive(Primitive::Int)),
                Field::new("b", TypeRef::composite("B")),
            ])).unwrap()
            .with(CompositeDecl::new("B", vec![
                Field::new("a", TypeRef::composite("A")),
                Field::new("siblings", TypeRef::list(TypeRef::composite("A"))),
            ])).unwrap()
            .with(CompositeDecl::new("Node", vec![
                Field::new("children", TypeRef::list(TypeRef::composite("Node"))),
            ])).unwrap();
        assert_eq!(sample(&model, "A"), json!({ "id": 0, "b": { "a": {}, "siblings": [] } }));
        assert_eq!(sample(&model, "Node"), json!({ "children": [] }));
    }

    #[test]
    fn same_type_twice_is_not_a_cycle() {
        let model = TypeModel::new()
            .with(CompositeDecl::new("Money", vec![Field::new("amount", TypeRef::scalar("java.math.BigDecimal"))])).unwrap()
            .with(CompositeDecl::new("Order", vec![
                Field::new("net", TypeRef::composite("Money")),
                Field::new("gross", TypeRef::composite("Money")),
            ])).unwrap();
        assert_eq!(sample(&model, "Order"), json!({
            "net": { "amount": 0.0 },
            "gross": { "amount": 0.0 },
        }));
    }
}
