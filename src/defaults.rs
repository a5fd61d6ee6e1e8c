//! Representative sample values for scalar leaves.
//!
//! The known-scalar table is plain data: callers can use the shared standard
//! table or build their own. Time-based entries are rendered against the
//! `now` handed to the `Synthesizer`, so a pinned clock gives byte-stable
//! output.
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::model::{simple_name, Primitive, TypeRef};

// ------------------------------- Policy ---------------------------------- //

/// Text sample, also substituted for any blank text value.
pub const DEMO_DATA: &str = "demoData";

pub const DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_PATTERN: &str = "%Y-%m-%d";
pub const TIME_PATTERN: &str = "%H:%M:%S";

static STANDARD: Lazy<ScalarTable> = Lazy::new(ScalarTable::standard);

// ------------------------------- Table ----------------------------------- //

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarDefault {
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Zero character, emitted as its integer value.
    Char,
    Text(String),
    /// Current moment rendered with a chrono format pattern.
    Now(String),
    /// Current moment as epoch milliseconds.
    EpochMillis,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarTable {
    entries: IndexMap<String, ScalarDefault>,
}

impl ScalarTable {
    pub fn empty() -> Self { Self::default() }

    pub fn standard() -> Self {
        let mut t = Self::empty();
        t.insert("java.lang.Boolean", ScalarDefault::Bool(false))
            .insert("java.lang.Byte", ScalarDefault::Integer(0))
            .insert("java.lang.Short", ScalarDefault::Integer(0))
            .insert("java.lang.Integer", ScalarDefault::Integer(0))
            .insert("java.lang.Long", ScalarDefault::Integer(0))
            .insert("java.lang.Float", ScalarDefault::Float(0.0))
            .insert("java.lang.Double", ScalarDefault::Float(0.0))
            .insert("java.lang.Character", ScalarDefault::Char)
            .insert("java.lang.String", ScalarDefault::Text(DEMO_DATA.into()))
            .insert("java.math.BigDecimal", ScalarDefault::Float(0.0))
            .insert("java.math.BigInteger", ScalarDefault::Integer(0))
            .insert("java.util.Date", ScalarDefault::Now(DATE_TIME_PATTERN.into()))
            .insert("java.sql.Timestamp", ScalarDefault::EpochMillis)
            .insert("java.time.LocalDate", ScalarDefault::Now(DATE_PATTERN.into()))
            .insert("java.time.LocalTime", ScalarDefault::Now(TIME_PATTERN.into()))
            .insert("java.time.LocalDateTime", ScalarDefault::Now(DATE_TIME_PATTERN.into()));
        t
    }

    /// Process-wide standard table, built on first use.
    pub fn shared() -> &'static ScalarTable { &STANDARD }

    pub fn insert(&mut self, qualified: impl Into<String>, default: ScalarDefault) -> &mut Self {
        self.entries.insert(qualified.into(), default);
        self
    }

    /// Replace the sample of every text entry.
    pub fn set_text_placeholder(&mut self, text: &str) -> &mut Self {
        for default in self.entries.values_mut() {
            if let ScalarDefault::Text(t) = default {
                *t = text.to_string();
            }
        }
        self
    }

    /// Qualified key for `name`: exact match first, then the first entry
    /// whose simple name equals `name`.
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.entries.get_key_value(name) {
            return Some(key.as_str());
        }
        self.entries
            .keys()
            .find(|k| simple_name(k) == name)
            .map(String::as_str)
    }

    pub fn lookup(&self, name: &str) -> Option<&ScalarDefault> {
        self.resolve_name(name).and_then(|k| self.entries.get(k))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve_name(name).is_some()
    }
}

// ----------------------------- Synthesizer ------------------------------- //

pub struct Synthesizer<'t> {
    table: &'t ScalarTable,
    now: DateTime<Local>,
}

impl<'t> Synthesizer<'t> {
    pub fn new(table: &'t ScalarTable, now: DateTime<Local>) -> Self {
        Self { table, now }
    }

    /// `None` means "no sample": the caller drops the key, never emits null.
    pub fn default_for(&self, ty: &TypeRef) -> Option<Value> {
        match ty {
            TypeRef::Primitive(p) => Some(primitive_default(*p)),
            TypeRef::Scalar(name) => self.table.lookup(name).map(|d| self.render(d)),
            _ => None,
        }
    }

    fn render(&self, default: &ScalarDefault) -> Value {
        match default {
            ScalarDefault::Bool(b) => Value::Bool(*b),
            ScalarDefault::Integer(i) => Value::from(*i),
            ScalarDefault::Float(f) => Value::from(*f),
            ScalarDefault::Char => Value::from(0),
            ScalarDefault::Text(t) => text_or_placeholder(t),
            ScalarDefault::Now(pattern) => text_or_placeholder(&self.now.format(pattern).to_string()),
            ScalarDefault::EpochMillis => Value::from(self.now.timestamp_millis()),
        }
    }
}

pub fn primitive_default(p: Primitive) -> Value {
    match p {
        Primitive::Boolean => Value::Bool(false),
        Primitive::Byte | Primitive::Short | Primitive::Int | Primitive::Long => Value::from(0),
        Primitive::Float | Primitive::Double => Value::from(0.0),
        Primitive::Char => Value::from(0),
    }
}

fn text_or_placeholder(text: &str) -> Value {
    if text.trim().is_empty() {
        Value::from(DEMO_DATA)
    } else {
        Value::from(text)
    }
}

// ------------------------------- Tests ------------------------------------ //
