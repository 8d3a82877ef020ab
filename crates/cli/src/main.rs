// ABOUTME: CLI for running the fieldscope extraction engine over local HTML documents.
// ABOUTME: Reads files or stdin, extracts links, fields, and table items, and prints JSON or text.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use fieldscope_engine::{
    load_builtin_mapping, load_field_mapping, Document, ExtractionResult, ExtractorEngine,
    Options,
};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Extract structured fields from already-fetched HTML pages.
#[derive(Parser, Debug)]
#[command(name = "fieldscope")]
#[command(about = "Extract schema fields, links and table rows from HTML", long_about = None)]
struct Args {
    /// HTML file paths. Use "-" to read one document from stdin.
    #[arg(required = true)]
    targets: Vec<String>,

    /// Source URL of the documents (used to resolve relative links)
    #[arg(long)]
    url: String,

    /// Mapping file with a "content_types" object (default: builtin schemas)
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Content type to load from the mapping
    #[arg(long, default_value = "movies")]
    content_type: String,

    /// JSON file overriding extraction options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Output format: json (default) or text
    #[arg(short = 'f', long = "format", default_value = "json")]
    format: String,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Log extraction details to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.targets.iter().filter(|t| t.as_str() == "-").count() > 1 {
        bail!("stdin (\"-\") can only be read once");
    }

    let engine = build_engine(&args)?;

    let mut results = Vec::new();
    for target in &args.targets {
        match load_bytes(target).and_then(|bytes| {
            let doc = Document::from_bytes(&bytes, None, &args.url)?;
            Ok(engine.extract_all(&doc))
        }) {
            Ok(result) => results.push((target, Ok(result))),
            Err(err) => {
                tracing::warn!(file = %target, error = %err, "Extraction failed");
                results.push((target, Err(err)));
            }
        }
    }

    if args.format.eq_ignore_ascii_case("text") {
        print_text(&results);
    } else {
        print_json(&results, args.compact)?;
    }

    if results.iter().all(|(_, r)| r.is_err()) {
        bail!("no document could be extracted");
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn build_engine(args: &Args) -> Result<ExtractorEngine> {
    let mapping = match &args.mapping {
        Some(path) => {
            let json = read_text(path)?;
            load_field_mapping(&json, &args.content_type)?
        }
        None => load_builtin_mapping(&args.content_type)?,
    };

    let mut builder = ExtractorEngine::builder();
    if let Some(path) = &args.options {
        builder = builder.options(Options::from_json_str(&read_text(path)?)?);
    }
    Ok(builder.build(mapping)?)
}

fn print_json(results: &[(&String, Result<ExtractionResult>)], compact: bool) -> Result<()> {
    // Single ok target => the result object itself; otherwise an envelope.
    let output = match results {
        [(_, Ok(result))] => serde_json::to_value(result)?,
        _ => {
            let documents: Vec<_> = results
                .iter()
                .map(|(target, r)| match r {
                    Ok(result) => json!({"target": target, "ok": true, "result": result, "error": null}),
                    Err(err) => json!({"target": target, "ok": false, "result": null, "error": err.to_string()}),
                })
                .collect();
            let extracted = results.iter().filter(|(_, r)| r.is_ok()).count();
            json!({
                "documents": documents,
                "total_documents": results.len(),
                "extracted": extracted,
                "failed": results.len() - extracted
            })
        }
    };

    if compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

fn print_text(results: &[(&String, Result<ExtractionResult>)]) {
    let multiple = results.len() > 1;
    for (target, result) in results {
        if multiple {
            println!("== {} ==", target);
        }
        match result {
            Ok(result) => println!("{}", result.format_text()),
            Err(err) => println!("error: {}", err),
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_bytes(target: &str) -> Result<Vec<u8>> {
    if target == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    Ok(fs::read(path)?)
}
