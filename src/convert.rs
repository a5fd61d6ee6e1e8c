//! Entry point: root class → sample object, optionally with its docs
//! attached under `@comment`.
use std::borrow::Cow;
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::classify::Classifier;
use crate::defaults::{ScalarTable, Synthesizer};
use crate::docs::DocGenerator;
use crate::model::{CompositeDecl, TypeModel};
use crate::sample::SampleGenerator;

/// Reserved top-level key holding the documentation tree.
pub const COMMENT_KEY: &str = "@comment";

/// Holds only read-only state, so one converter can serve many roots at once.
#[derive(Debug, Clone)]
pub struct Converter<'m> {
    model: &'m TypeModel,
    table: Cow<'m, ScalarTable>,
    now: Option<DateTime<Local>>,
}

impl<'m> Converter<'m> {
    pub fn new(model: &'m TypeModel) -> Self {
        Self { model, table: Cow::Borrowed(ScalarTable::shared()), now: None }
    }

    pub fn with_table(mut self, table: &'m ScalarTable) -> Self {
        self.table = Cow::Borrowed(table);
        self
    }

    /// Sample for text scalars. Blank text still renders as the default
    /// placeholder.
    pub fn with_placeholder(mut self, text: &str) -> Self {
        self.table.to_mut().set_text_placeholder(text);
        self
    }

    /// Pin the clock used for date and time samples.
    pub fn with_clock(mut self, now: DateTime<Local>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn model(&self) -> &'m TypeModel { self.model }

    /// Missing, ambiguous and enum roots produce an empty object.
    pub fn convert(&self, root: &str, include_docs: bool) -> Map<String, Value> {
        match self.model.find(root) {
            Ok(Some(decl)) => match decl.as_composite() {
                Some(decl) => self.convert_decl(decl, include_docs),
                None => {
                    warn!(root, ty = %decl.id(), "root is not a class");
                    Map::new()
                }
            },
            Ok(None) => {
                warn!(root, "root type not found");
                Map::new()
            }
            Err(error) => {
                warn!(root, %error, "root type is ambiguous");
                Map::new()
            }
        }
    }

    pub fn convert_decl(&self, decl: &CompositeDecl, include_docs: bool) -> Map<String, Value> {
        debug!(root = %decl.id, include_docs, "converting");
        let now = self.now.unwrap_or_else(Local::now);
        let synth = Synthesizer::new(&self.table, now);
        let classifier = Classifier::new(self.model, &self.table);

        let mut out = SampleGenerator::new(classifier, &synth).generate(decl);
        if include_docs {
            let docs = DocGenerator::new(classifier).generate(decl);
            out.insert(COMMENT_KEY.into(), Value::Object(docs));
        }
        out
    }
}

/// `Converter::new(model).convert(root, include_docs)`.
pub fn convert(model: &TypeModel, root: &str, include_docs: bool) -> Map<String, Value> {
    Converter::new(model).convert(root, include_docs)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::load::from_value;
    use chrono::TimeZone;
    use serde_json::json;

    fn pinned() -> DateTime<Local> {
        Local.with_ymd_and_hms(2020, 5, 9, 9, 15, 0).single().unwrap()
    }

    fn person_model() -> TypeModel {
        from_value(json!({ "types": [
            { "kind": "class", "name": "com.acme.Person", "fields": [
                { "name": "name", "type": "String", "comment": "full name", "constraints": ["@NotBlank"] },
                { "name": "address", "type": "Address" }
            ] },
            { "kind": "class", "name": "com.acme.Address", "fields": [
                { "name": "city", "type": "String" }
            ] }
        ] })).unwrap()
    }

    fn keys(map: &Map<String, Value>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn person_without_docs() {
        let model = person_model();
        let out = convert(&model, "Person", false);
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"name":"demoData","address":{"city":"demoData"}}"#
        );
    }

    #[test]
    fn person_with_docs() {
        let model = person_model();
        let out = Converter::new(&model).with_clock(pinned()).convert("com.acme.Person", true);
        assert_eq!(Value::Object(out.clone()), json!({
            "name": "demoData",
            "address": { "city": "demoData" },
            "@comment": {
                "name": { "comment": "full name", "valid": ["NotBlank"] },
                "address": {
                    "comment": "",
                    "type": "Address",
                    "valid": [],
                    "Address": { "city": { "comment": "", "valid": [] } }
                }
            }
        }));
        assert_eq!(keys(&out), ["name", "address", "@comment"]);
        // nested samples never carry their own docs
        assert!(out["address"].get(COMMENT_KEY).is_none());
    }

    #[test]
    fn value_and_doc_keys_line_up() {
        let model = from_value(json!({ "types": [
            { "kind": "class", "name": "Base", "fields": [
                { "name": "id", "type": "Long" },
                { "name": "created", "type": "Date" }
            ] },
            { "kind": "class", "name": "Order", "extends": "Base", "fields": [
                { "name": "status", "type": "Status" },
                { "name": "lines", "type": "List<Line>" },
                { "name": "tags", "type": "Set<Status>" },
                { "name": "note", "type": "String" },
                { "name": "raw", "type": "List" },
                { "name": "codes", "type": "int[]" }
            ] },
            { "kind": "class", "name": "Line", "fields": [ { "name": "qty", "type": "int" } ] },
            { "kind": "enum", "name": "Status", "constants": [ { "name": "NEW" }, { "name": "PAID" } ] }
        ] })).unwrap();
        let mut out = Converter::new(&model).with_clock(pinned()).convert("Order", true);
        let docs = match out.remove(COMMENT_KEY) {
            Some(Value::Object(docs)) => docs,
            other => panic!("unexpected {other:?}"),
        };
        let expected = ["status", "lines", "tags", "note", "codes", "id", "created"];
        assert_eq!(keys(&out), expected);
        assert_eq!(keys(&docs), expected);
        assert_eq!(out["created"], json!("2020-05-09 09:15:00"));
        assert_eq!(out["tags"], json!([["NEW", "PAID"]]));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let model = person_model();
        let converter = Converter::new(&model).with_clock(pinned());
        assert_eq!(converter.convert("Person", true), converter.convert("Person", true));
    }

    #[test]
    fn missing_or_enum_roots_give_empty_objects() {
        let model = from_value(json!({ "types": [ { "kind": "enum", "name": "E", "constants": [] } ] })).unwrap();
        assert!(convert(&model, "Nope", true).is_empty());
        assert!(convert(&model, "E", true).is_empty());

        let model = from_value(json!({ "types": [
            { "kind": "class", "name": "a.Item", "fields": [ { "name": "x", "type": "int" } ] },
            { "kind": "class", "name": "b.Item", "fields": [ { "name": "y", "type": "int" } ] }
        ] })).unwrap();
        assert!(convert(&model, "Item", false).is_empty());
        assert_eq!(Value::Object(convert(&model, "b.Item", false)), json!({ "y": 0 }));
    }

    #[test]
    fn cyclic_roots_terminate() {
        let model = from_value(json!({ "types": [
            { "kind": "class", "name": "A", "fields": [ { "name": "b", "type": "B" } ] },
            { "kind": "class", "name": "B", "fields": [ { "name": "a", "type": "A" } ] }
        ] })).unwrap();
        let out = convert(&model, "A", true);
        assert_eq!(Value::Object(out), json!({
            "b": { "a": {} },
            "@comment": {
                "b": { "comment": "", "type": "B", "valid": [],
                       "B": { "a": { "comment": "", "type": "A", "valid": [], "A": {} } } }
            }
        }));
    }

    #[test]
    fn placeholder_and_custom_tables() {
        let model = person_model();
        let out = Converter::new(&model).with_placeholder("sample").convert("Person", false);
        assert_eq!(Value::Object(out), json!({ "name": "sample", "address": { "city": "sample" } }));

        let empty = ScalarTable::empty();
        let out = Converter::new(&model).with_table(&empty).convert("Person", false);
        assert_eq!(Value::Object(out), json!({ "address": {} }));
    }

    #[test]
    fn one_converter_serves_many_threads() {
        let model = person_model();
        let converter = Converter::new(&model).with_clock(pinned());
        let expected = converter.convert("Person", true);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| converter.convert("Person", true))).collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
