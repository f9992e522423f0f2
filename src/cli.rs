//! Minimal CLI: JSON/NDJSON → pretty tree → (text | debug dump)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde_json::Value;

use pretty_value::{ExternalLeaf, JsonWalker, PrettyValue, Record, RenderOptions, render};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// print JSON/NDJSON documents as compact, colorized pretty trees
#[derive(Parser, Debug)]
#[command(name = "pretty-value", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// render each document as a pretty tree
    Render(RenderOut),
    /// print the intermediate tree of each document (Rust debug form)
    Dump(DumpOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /body/0)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct TreeSettings {
    /// object key naming the record type
    #[arg(long, default_value = "_type")]
    type_key: String,

    /// print small all-scalar objects positionally
    #[arg(long, default_value_t = false)]
    abbreviate: bool,

    /// largest field count eligible for --abbreviate
    #[arg(long, default_value_t = 3)]
    abbreviate_max_fields: usize,

    /// wrap each document as (Document source:<path> value:...)
    #[arg(long, default_value_t = false)]
    show_source: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(clap::Parser, Debug)]
struct RenderOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    tree_settings: TreeSettings,

    /// column limit before nodes break across lines
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// spaces per nesting level
    #[arg(long, default_value_t = 2)]
    indent: usize,

    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct DumpOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    tree_settings: TreeSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One input document and where it came from.
struct Document {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source = source_path.to_string_lossy().to_string();
            let text = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source}"))?;
            let values = if self.ndjson {
                text.lines()
                    .enumerate()
                    .filter(|(_, line)| !line.trim().is_empty())
                    .map(|(i, line)| {
                        serde_json::from_str::<Value>(line)
                            .with_context(|| format!("failed to parse {source}:{}", i + 1))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                vec![serde_json::from_str::<Value>(&text)
                    .with_context(|| format!("failed to parse JSON source file {source}"))?]
            };
            tracing::debug!(source = source.as_str(), documents = values.len(), "loaded input");
            for value in values {
                for value in self.preprocess(&source, value)? {
                    documents.push(Document { source: source.clone(), value });
                }
            }
        }
        Ok(documents)
    }

    fn preprocess(&self, source: &str, value: Value) -> Result<Vec<Value>> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => match value.pointer(pointer) {
                Some(selected) => selected.clone(),
                None => {
                    tracing::warn!(
                        source,
                        pointer,
                        "JSON pointer matched nothing; skipping document"
                    );
                    return Ok(Vec::new());
                }
            },
        };
        match self.jq_expr.as_deref() {
            None => Ok(vec![value]),
            Some(jq_expr) => pretty_value::jq_exec::run_jaq(jq_expr, &value)
                .with_context(|| format!("failed to apply jq expression to {source}")),
        }
    }
}

impl TreeSettings {
    fn walker(&self) -> JsonWalker {
        JsonWalker {
            type_key: self.type_key.clone(),
            abbreviate: self.abbreviate,
            abbreviate_max_fields: self.abbreviate_max_fields,
        }
    }

    fn build<'d>(&self, walker: &JsonWalker, document: &'d Document) -> Result<PrettyValue<'d>> {
        let tree = walker
            .walk(&document.value)
            .with_context(|| format!("failed to build tree for {}", document.source))?;
        if !self.show_source {
            return Ok(tree);
        }
        let wrapped = Record::new("Document")
            .with_field("source", ExternalLeaf::new(&document.source))?
            .with_field("value", tree)?;
        Ok(wrapped.into())
    }
}

impl ColorChoice {
    fn enabled(self, to_file: bool) -> bool {
        match self {
            ColorChoice::Always => {
                colored::control::set_override(true);
                true
            }
            ColorChoice::Never => false,
            // `colored` checks the terminal and NO_COLOR/CLICOLOR itself
            ColorChoice::Auto => !to_file,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Render(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                if target.width == 0 {
                    bail!("--width must be at least 1");
                }

                let documents = target.input_settings.load_documents()?;
                let walker = target.tree_settings.walker();
                let options = RenderOptions {
                    max_width: target.width,
                    indent: target.indent,
                    color: target.color.enabled(target.out.is_some()),
                };

                let rendered = documents
                    .par_iter()
                    .map(|document| -> Result<String> {
                        let tree = target.tree_settings.build(&walker, document)?;
                        Ok(render(&tree, &options))
                    })
                    .collect::<Result<Vec<String>>>()?;
                tracing::info!(documents = rendered.len(), "rendered");

                write_output(target.out.as_deref(), &rendered)
            }
            Command::Dump(target) => {
                let documents = target.input_settings.load_documents()?;
                let walker = target.tree_settings.walker();
                let mut dumps = Vec::with_capacity(documents.len());
                for document in &documents {
                    let tree = target.tree_settings.build(&walker, document)?;
                    tracing::debug!(
                        source = document.source.as_str(),
                        nodes = tree.node_count(),
                        "built tree"
                    );
                    dumps.push(format!("{tree:#?}"));
                }
                write_output(target.out.as_deref(), &dumps)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, chunks: &[String]) -> Result<()> {
    let mut text = chunks.join("\n");
    text.push('\n');
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            let entries =
                glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))?;
            for entry in entries {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
