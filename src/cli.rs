//! Minimal CLI: model documents → sample JSON (with or without `@comment`)
use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::{Map, Value};

use bean_json::defaults::DATE_TIME_PATTERN;
use bean_json::model::load::ModelBuilder;
use bean_json::{Converter, ScalarTable, TypeId, TypeModel};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate a ready-to-paste sample JSON payload from class declarations
#[derive(Parser, Debug)]
#[command(name = "bean-json", version)]
pub struct CommandLineInterface {
    /// more logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the sample JSON only
    Json(ConvertOut),
    /// print the sample JSON with field docs under `@comment`
    Commented(ConvertOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more model documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// root class (qualified or simple name); repeatable, defaults to every class
    #[arg(long, short)]
    root: Vec<String>,

    /// sample text for String fields
    #[arg(long)]
    placeholder: Option<String>,

    /// pin the clock for date/time samples, `yyyy-MM-dd HH:mm:ss`
    #[arg(long)]
    now: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct ConvertOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_model(&self) -> Result<TypeModel> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|e| anyhow::anyhow!("failed to resolve input file paths: {e}"))?;
        let mut builder = ModelBuilder::new(ScalarTable::shared());
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read model file {source_path_str}"))?;
            builder = builder.source(&source, &source_path_str)?;
        }
        let model = builder.build()?;
        tracing::info!(types = model.len(), "model loaded");
        Ok(model)
    }

    fn clock(&self) -> Result<Option<DateTime<Local>>> {
        let Some(raw) = self.now.as_deref() else { return Ok(None) };
        let naive = NaiveDateTime::parse_from_str(raw, DATE_TIME_PATTERN)
            .with_context(|| format!("--now expects `yyyy-MM-dd HH:mm:ss`, got `{raw}`"))?;
        match Local.from_local_datetime(&naive).earliest() {
            Some(now) => Ok(Some(now)),
            None => bail!("--now `{raw}` does not exist in the local time zone"),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
    pub fn run(&self) -> Result<()> {
        let (target, include_docs) = match &self.cmd {
            Command::Json(target) => (target, false),
            Command::Commented(target) => (target, true),
        };
        // debug path
        if target.no_op {
            eprintln!("{self:#?}");
            return Ok(())
        }

        let settings = &target.input_settings;
        let model = settings.load_model()?;
        let mut converter = Converter::new(&model);
        if let Some(text) = settings.placeholder.as_deref() {
            converter = converter.with_placeholder(text);
        }
        if let Some(now) = settings.clock()? {
            converter = converter.with_clock(now);
        }

        let roots: Vec<String> = if settings.root.is_empty() {
            model.composites().map(|c| c.id.to_string()).collect()
        } else {
            settings.root.clone()
        };
        if roots.is_empty() {
            bail!("the model declares no classes");
        }

        let keyed = output_keys(&model, &roots)?;
        // roots are independent; the converter only reads shared state
        let results: Vec<(String, Map<String, Value>)> = keyed
            .par_iter()
            .map(|(key, id)| (key.clone(), converter.convert(id.as_str(), include_docs)))
            .collect();

        for (name, object) in &results {
            if object.is_empty() {
                eprintln!("{}", format!("Nothing could be generated for {name}.").yellow());
            } else {
                eprintln!("{}", format!("Convert {name} to JSON success.").green());
            }
        }

        let output = match results.len() {
            1 => results.into_iter().next().map(|(_, o)| Value::Object(o)).unwrap_or_default(),
            _ => Value::Object(results.into_iter().map(|(n, o)| (n, Value::Object(o))).collect()),
        };
        let json_src = serde_json::to_string_pretty(&output)?;
        if let Some(out) = target.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &json_src)
                .with_context(|| format!("failed to write {}", out.display()))?;
        } else {
            println!("{json_src}");
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `(output key, id)` per distinct root. The key is the simple name unless
/// another root shares it, then the qualified id. Unknown roots keep their
/// spelling; ambiguous ones are an error.
fn output_keys(model: &TypeModel, roots: &[String]) -> Result<Vec<(String, TypeId)>> {
    let mut ids: Vec<TypeId> = Vec::new();
    for root in roots {
        let id = match model.find(root)? {
            Some(decl) => decl.id().clone(),
            None => TypeId::new(root.as_str()),
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    let shared = |name: &str| ids.iter().filter(|id| id.simple_name() == name).count() > 1;
    let keyed = ids
        .iter()
        .map(|id| {
            let key = if shared(id.simple_name()) { id.as_str() } else { id.simple_name() };
            (key.to_string(), id.clone())
        })
        .collect();
    Ok(keyed)
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(p) => {
                        matched_any = true;
                        out.push(p);
                    }
                    Err(e) => return Err(Box::new(e)),
                }
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["a.json", "dir/b.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("a.json"), PathBuf::from("dir/b.json")]);
    }

    #[test]
    fn empty_globs_are_errors() {
        assert!(resolve_file_path_patterns(["/definitely/not/here/*.json"]).is_err());
    }

    #[test]
    fn clock_flag_parses() {
        let settings = InputSettings {
            input: vec![],
            root: vec![],
            placeholder: None,
            now: Some("2020-05-09 09:15:00".into()),
        };
        let now = settings.clock().unwrap().unwrap();
        assert_eq!(now.format(DATE_TIME_PATTERN).to_string(), "2020-05-09 09:15:00");

        let bad = InputSettings { now: Some("yesterday".into()), ..settings };
        assert!(bad.clock().is_err());
    }

    fn item_model() -> TypeModel {
        bean_json::model::load::from_value(serde_json::json!({ "types": [
            { "kind": "class", "name": "a.Item", "fields": [ { "name": "x", "type": "int" } ] },
            { "kind": "class", "name": "b.Item", "fields": [ { "name": "y", "type": "String" } ] },
            { "kind": "class", "name": "b.Cart", "fields": [ { "name": "item", "type": "b.Item" } ] }
        ] })).unwrap()
    }

    #[test]
    fn shared_simple_names_keep_qualified_keys() {
        let model = item_model();
        let every: Vec<String> = model.composites().map(|c| c.id.to_string()).collect();
        let keys: Vec<String> = output_keys(&model, &every).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a.Item", "b.Item", "Cart"]);

        let roots = vec!["b.Item".to_string(), "Cart".to_string(), "b.Cart".to_string()];
        let picked = output_keys(&model, &roots).unwrap();
        assert_eq!(picked, [("Item".to_string(), TypeId::new("b.Item")), ("Cart".to_string(), TypeId::new("b.Cart"))]);
    }

    #[test]
    fn ambiguous_roots_are_errors() {
        let err = output_keys(&item_model(), &["Item".to_string()]).unwrap_err();
        assert!(err.to_string().contains("a.Item, b.Item"), "{err}");
    }

    #[test]
    fn every_root_lands_in_the_output() {
        let dir = std::env::temp_dir().join(format!("bean-json-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("model.json");
        let out = dir.join("out.json");
        std::fs::write(&input, r#"{ "types": [
            { "kind": "class", "name": "a.Item", "fields": [ { "name": "x", "type": "int" } ] },
            { "kind": "class", "name": "b.Item", "fields": [ { "name": "y", "type": "String" } ] }
        ] }"#).unwrap();

        let cli = CommandLineInterface::try_parse_from([
            "bean-json", "json", "-i", input.to_str().unwrap(), "-o", out.to_str().unwrap(),
        ]).unwrap();
        cli.run().unwrap();
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({ "a.Item": { "x": 0 }, "b.Item": { "y": "demoData" } }));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn commands_parse() {
        let cli = CommandLineInterface::try_parse_from([
            "bean-json", "-vv", "commented", "-i", "model.json", "--root", "Person",
        ]).unwrap();
        assert_eq!(cli.verbosity(), 2);
        assert!(matches!(cli.cmd, Command::Commented(_)));
    }
}
