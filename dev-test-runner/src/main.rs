//! Runs JSON fixture suites against the validator.
//!
//! Each `suites/*.json` file holds groups in the JSON-Schema-Test-Suite layout:
//! `[{ "description", "schema", "tests": [{ "description", "data", "valid" }] }]`.
//! An optional first argument is a regex filtering groups by description.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use json_osv::SchemaDocument;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Group {
    description: String,
    schema: Value,
    tests: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    description: String,
    data: Value,
    valid: bool,
}

#[derive(Debug, Default)]
struct Tally {
    passed: usize,
    failed: usize,
}

fn load_suite(path: &PathBuf) -> Result<Vec<Group>> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let de = &mut serde_json::Deserializer::from_str(&source);
    serde_path_to_error::deserialize(de).with_context(|| format!("malformed suite {}", path.display()))
}

fn run_group(group: &Group, tally: &mut Tally) {
    let doc = match SchemaDocument::parse(&group.schema) {
        Ok(doc) => doc,
        Err(error) => {
            println!("  {} {}: schema failed to load: {error}", "✗".red(), group.description);
            tally.failed += group.tests.len();
            return;
        }
    };
    for case in &group.tests {
        let result = doc.validate(&case.data);
        if result.is_valid() == case.valid {
            tally.passed += 1;
            continue;
        }
        tally.failed += 1;
        println!(
            "  {} {} / {} (expected {})",
            "✗".red(),
            group.description.bold(),
            case.description,
            if case.valid { "valid" } else { "invalid" }
        );
        for violation in result.errors() {
            println!("      {violation}");
        }
    }
}

fn run() -> Result<bool> {
    let filter = std::env::args()
        .nth(1)
        .map(|src| Regex::new(&src))
        .transpose()
        .context("invalid filter regex")?;
    let pattern = concat!(env!("CARGO_MANIFEST_DIR"), "/suites/*.json");

    let mut tally = Tally::default();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        let groups = load_suite(&path)?;
        println!("{}", path.file_name().unwrap_or_default().to_string_lossy().bold());
        for group in &groups {
            if filter.as_ref().is_some_and(|re| !re.is_match(&group.description)) {
                continue;
            }
            run_group(group, &mut tally);
        }
    }

    let summary = format!("{} passed, {} failed", tally.passed, tally.failed);
    if tally.failed == 0 {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
    Ok(tally.failed == 0)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
