//! `--jq-expr` pre-filtering with jaq.
use anyhow::{anyhow, Context, Result};
use jaq_core::{load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run a jq filter over one document; every output becomes a document.
pub fn run_filter(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(|errors| problems(errors.iter().map(|(_, error)| format!("{error:?}"))))
        .with_context(|| format!("cannot parse jq filter `{filter_src}`"))?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errors| {
            problems(
                errors
                    .iter()
                    .flat_map(|(_, undefined)| undefined.iter())
                    .map(|(name, kind)| format!("undefined {kind:?} `{name}`")),
            )
        })
        .with_context(|| format!("cannot compile jq filter `{filter_src}`"))?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    for item in outputs {
        let val = item.map_err(|e| anyhow!("jq runtime error: {e:?}"))?;
        // Val renders as JSON text
        let text = val.to_string();
        let value = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("jq produced a non-JSON value: {text}"))?;
        out.push(value);
    }
    tracing::debug!(filter = filter_src, outputs = out.len(), "jq filter applied");
    Ok(out)
}

fn problems(details: impl Iterator<Item = String>) -> anyhow::Error {
    anyhow!(details.collect::<Vec<_>>().join("; "))
}
