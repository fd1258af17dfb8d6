//! CLI: validate | check | emit
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::{Map, Value};

use crate::emit::emit;
use crate::report::ValidationResult;
use crate::resolve::resolve_all;
use crate::schema::SchemaDocument;
use crate::validate::{Options, Validator};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate JSON documents against a draft-07 JSON Schema
#[derive(Parser, Debug)]
#[command(name = "json-osv", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate documents and report every violation
    Validate(ValidateOut),
    /// load the schema and resolve every `$ref`
    Check(CheckOut),
    /// print the normalized schema
    Emit(EmitOut),
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// schema file (JSON)
    #[arg(long, short)]
    schema: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct ValidateOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// report file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// most nested `$ref` traversals per path
    #[arg(long, default_value_t = 128)]
    max_depth: usize,

    /// treat `format` as an annotation only
    #[arg(long, default_value_t = false)]
    no_formats: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,
}

#[derive(clap::Parser, Debug)]
struct EmitOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One document to validate and where it came from.
#[derive(Debug)]
struct Document {
    label: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn load(&self) -> Result<SchemaDocument> {
        let source = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read schema file {}", self.schema.display()))?;
        let doc = SchemaDocument::from_str(&source)
            .with_context(|| format!("failed to load schema {}", self.schema.display()))?;
        tracing::info!(schema = %self.schema.display(), nodes = doc.len(), "schema loaded");
        Ok(doc)
    }
}

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            if self.ndjson {
                for (line_index, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let label = format!("{source_path_str}:{}", line_index + 1);
                    let value = serde_json::from_str::<Value>(line)
                        .with_context(|| format!("failed to parse NDJSON line ({label})"))?;
                    self.process(label, value, &mut out)?;
                }
            } else {
                let value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                self.process(source_path_str, value, &mut out)?;
            }
        }
        Ok(out)
    }

    /// Apply `--json-pointer` then `--jq-expr`; the filter may yield several documents.
    fn process(&self, label: String, value: Value, out: &mut Vec<Document>) -> Result<()> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => match value.pointer(pointer) {
                Some(selected) => selected.clone(),
                None => bail!("json pointer `{pointer}` selects nothing in {label}"),
            },
        };
        let Some(jq_expr) = self.jq_expr.as_ref() else {
            out.push(Document { label, value });
            return Ok(());
        };
        let results = crate::jq_exec::run_filter(jq_expr, &value)
            .with_context(|| format!("failed to apply jq expression to {label}"))?;
        let many = results.len() > 1;
        for (index, value) in results.into_iter().enumerate() {
            let label = if many { format!("{label}#{index}") } else { label.clone() };
            out.push(Document { label, value });
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `Ok(false)` when the command ran but found invalid documents or references.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Validate(target) => target.run(),
            Command::Check(target) => target.run(),
            Command::Emit(target) => target.run(),
        }
    }
}

impl ValidateOut {
    fn run(&self) -> Result<bool> {
        let doc = self.schema_settings.load()?;
        let documents = self.input_settings.load_documents()?;
        let options = Options::default()
            .with_max_depth(self.max_depth)
            .with_formats(!self.no_formats);
        let validator = Validator::with_options(&doc, options);

        let values: Vec<Value> = documents.iter().map(|d| d.value.clone()).collect();
        let results = validator.validate_all(&values);
        let all_valid = results.iter().all(ValidationResult::is_valid);

        let rendered = match self.report {
            ReportFormat::Text => render_text(&documents, &results),
            ReportFormat::Json => render_json(&documents, &results)?,
        };
        write_output(self.out.as_deref(), &rendered)?;
        Ok(all_valid)
    }
}

impl CheckOut {
    fn run(&self) -> Result<bool> {
        let doc = self.schema_settings.load()?;
        let failures = resolve_all(&doc);
        for (id, error) in &failures {
            println!("{} {}: {error}", "✗".red(), doc.node(*id).pointer.fragment());
        }
        if !failures.is_empty() {
            println!("{}", format!("{} unresolvable reference(s)", failures.len()).red().bold());
            return Ok(false);
        }
        println!(
            "{} {} ({} nodes, {} references)",
            "✓".green(),
            self.schema_settings.schema.display(),
            doc.len(),
            doc.refs().count()
        );
        Ok(true)
    }
}

impl EmitOut {
    fn run(&self) -> Result<bool> {
        let doc = self.schema_settings.load()?;
        let schema_src = serde_json::to_string_pretty(&emit(&doc))?;
        write_output(self.out.as_deref(), &schema_src)?;
        Ok(true)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn render_text(documents: &[Document], results: &[ValidationResult]) -> String {
    let mut out = String::new();
    let mut valid = 0;
    for (document, result) in documents.iter().zip(results) {
        if result.is_valid() {
            valid += 1;
            out.push_str(&format!("{} {}\n", "✓".green(), document.label));
            continue;
        }
        out.push_str(&format!(
            "{} {} ({} violation{})\n",
            "✗".red(),
            document.label.bold(),
            result.len(),
            if result.len() == 1 { "" } else { "s" }
        ));
        for violation in result.errors() {
            out.push_str(&format!(
                "    {}: {} {}\n",
                violation.document_path.fragment().yellow(),
                violation.message(),
                format!("[{}]", violation.schema_path.fragment()).dimmed()
            ));
        }
    }
    let summary = format!("{valid}/{} documents valid", documents.len());
    if valid == documents.len() {
        out.push_str(&format!("{}\n", summary.green().bold()));
    } else {
        out.push_str(&format!("{}\n", summary.red().bold()));
    }
    out
}

fn render_json(documents: &[Document], results: &[ValidationResult]) -> Result<String> {
    let mut reports = Vec::with_capacity(documents.len());
    for (document, result) in documents.iter().zip(results) {
        let mut entry = Map::new();
        entry.insert("source".into(), Value::String(document.label.clone()));
        if let Value::Object(fields) = serde_json::to_value(result)? {
            entry.extend(fields);
        }
        reports.push(Value::Object(entry));
    }
    Ok(serde_json::to_string_pretty(&reports)?)
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    let Some(out) = out else {
        println!("{contents}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
