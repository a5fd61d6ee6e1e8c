//! Replays `fixtures/*.case.json` against the library with a pinned clock.
//!
//! usage: dev-test-runner [GLOB]
use chrono::{Local, TimeZone};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;

use bean_json::model::load::{ModelBuilder, ModelDocument};
use bean_json::{Converter, ScalarTable};

#[derive(Debug, Deserialize)]
struct Case {
    #[serde(default)]
    description: String,
    root: String,
    #[serde(default)]
    docs: bool,
    #[serde(default)]
    placeholder: Option<String>,
    model: ModelDocument,
    expected: Value,
}

fn load_case(path: &std::path::Path) -> Result<Case, String> {
    let src = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let de = &mut serde_json::Deserializer::from_str(&src);
    serde_path_to_error::deserialize::<_, Case>(de)
        .map_err(|err| {
            let path = err.path().to_string();
            format!("at JSON path {} → {}", path, err.into_inner())
        })
}

fn run_case(case: Case) -> Result<(), String> {
    let model = ModelBuilder::new(ScalarTable::shared())
        .document(case.model)
        .build()
        .map_err(|e| e.to_string())?;
    let now = Local
        .with_ymd_and_hms(2020, 5, 9, 9, 15, 0)
        .single()
        .ok_or("pinned clock is ambiguous in this time zone")?;
    let mut converter = Converter::new(&model).with_clock(now);
    if let Some(text) = case.placeholder.as_deref() {
        converter = converter.with_placeholder(text);
    }
    let actual = Value::Object(converter.convert(&case.root, case.docs));

    // string comparison so key order counts
    let actual = serde_json::to_string_pretty(&actual).map_err(|e| e.to_string())?;
    let expected = serde_json::to_string_pretty(&case.expected).map_err(|e| e.to_string())?;
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected:\n{expected}\nactual:\n{actual}"))
    }
}

fn main() {
    let pattern = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/*.case.json").to_string());
    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect::<Vec<_>>(),
        Err(error) => {
            eprintln!("bad fixture pattern {pattern}: {error}");
            std::process::exit(2);
        }
    };

    let mut failed = 0usize;
    for path in &paths {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let outcome = load_case(path).and_then(|case| {
            if !case.description.is_empty() {
                eprintln!("   {}", case.description.dimmed());
            }
            run_case(case)
        });
        match outcome {
            Ok(()) => eprintln!("✅ {name}"),
            Err(error) => {
                failed += 1;
                eprintln!("❌ {}\n{error}", name.red());
            }
        }
    }

    eprintln!("{} cases, {} failed", paths.len(), failed);
    if failed > 0 {
        std::process::exit(1);
    }
}
