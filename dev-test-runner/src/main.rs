//! Golden-fixture runner: every `cases/*.json` holds an input document, the
//! walker/render settings, and the exact expected text.
mod path_de;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use pretty_value::{JsonWalker, RenderOptions, render};

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("static regex"));

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Case {
    name: String,
    #[serde(default)]
    walker: JsonWalker,
    #[serde(default)]
    render: RenderOptions,
    input: serde_json::Value,
    /// Either one string or one string per line.
    expected: Expected,
    /// Expect tree construction to fail instead.
    #[serde(default)]
    error: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expected {
    Text(String),
    Lines(Vec<String>),
}

impl Expected {
    fn text(&self) -> String {
        match self {
            Expected::Text(text) => text.clone(),
            Expected::Lines(lines) => lines.join("\n"),
        }
    }
}

fn run_case(path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let case = path_de::from_str_with_path::<Case>(path, &source)?;

    let tree = match case.walker.walk(&case.input) {
        Ok(tree) if !case.error => tree,
        Ok(_) => bail!("{}: expected a construction error", case.name),
        Err(error) if case.error => {
            let got = error.to_string();
            let want = case.expected.text();
            if got != want {
                bail!("{}: error mismatch\n  want: {want}\n  got:  {got}", case.name);
            }
            return Ok(());
        }
        Err(error) => bail!("{}: {error}", case.name),
    };

    let rendered = render(&tree, &case.render);
    let got = ANSI_ESCAPE.replace_all(&rendered, "");
    let want = case.expected.text();
    if got != want {
        bail!("{}: output mismatch\n--- want\n{want}\n--- got\n{got}", case.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cases_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cases");
    let pattern = cases_dir.join("*.json");
    let mut paths = glob::glob(&pattern.to_string_lossy())?.collect::<Result<Vec<PathBuf>, _>>()?;
    paths.sort();

    let mut failures = 0usize;
    for path in &paths {
        match run_case(path) {
            Ok(()) => eprintln!("✅ {}", path.display()),
            Err(error) => {
                failures += 1;
                eprintln!("❌ {error:#}");
            }
        }
    }
    eprintln!("{} cases, {failures} failed", paths.len());
    if failures > 0 {
        bail!("{failures} golden case(s) failed");
    }
    Ok(())
}
