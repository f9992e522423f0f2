//! Reference renderer: `PrettyValue` → text.
//!
//! Formatting policy:
//! - named record:       `(TypeName a:1 b:2)`
//! - abbreviated record: `{TypeName 1 2}` with the record's own brackets
//! - array:              `[1 2 3]`, empty as `[]`
//! - leaves print their text; string constants are quoted when not a plain word
//! - an absent leaf prints `_`; a string constant `"_"` prints `'_'`
//! - external leaves print their `Display` form, or `<external>` when that is
//!   empty or fails
//!
//! A node stays on one line while it fits in `max_width` from the current
//! column. Otherwise it breaks into one child per line.
//!
//! Rendering recurses once per nesting level. Trees up to a few thousand
//! levels deep render on a default 2 MiB thread stack; deeper trees need a
//! bigger stack.
use std::borrow::Cow;
use std::fmt::{self, Write};

use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::value::{ABSENT_TEXT, Color, ExternalLeaf, Leaf, PrettyValue, Record, RecordShape};

/// Shown for an external object whose `Display` output is empty or fails.
pub const EXTERNAL_PLACEHOLDER: &str = "<external>";

/// String constants matching this print without quotes.
static PLAIN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_./+\-=:,@%^~!?*#$&|<>]+$").expect("static regex"));

// ————————————————————————————————————————————————————————————————————————————
// OPTIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Column limit for single-line forms.
    pub max_width: usize,
    /// Spaces per nesting level once a node breaks.
    pub indent: usize,
    /// Emit ANSI colors (subject to `colored`'s own environment checks).
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { max_width: 80, indent: 2, color: false }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// API
// ————————————————————————————————————————————————————————————————————————————

pub fn render(value: &PrettyValue<'_>, options: &RenderOptions) -> String {
    let mut out = String::new();
    // fmt::Write for String is infallible
    let _ = render_to(value, options, &mut out);
    out
}

pub fn render_to<W: Write>(
    value: &PrettyValue<'_>,
    options: &RenderOptions,
    out: &mut W,
) -> fmt::Result {
    let mut printer = Printer { options, out };
    printer.node(value, 0, 0)
}

/// Single-line width of `value`, or `None` once it exceeds `budget`.
pub fn flat_width(value: &PrettyValue<'_>, budget: usize) -> Option<usize> {
    let mut meter = Meter { used: 0, budget };
    meter.value(value)?;
    Some(meter.used)
}

/// Terminal color for each leaf category.
pub fn paint(text: &str, color: Color) -> colored::ColoredString {
    match color {
        Color::TypeName => text.yellow(),
        Color::StringConst => text.bold(),
        Color::OtherConst => text.green(),
        Color::UserType => text.cyan(),
        Color::External => text.blue(),
    }
}

/// Printed form of a leaf, before coloring.
pub fn leaf_text(leaf: &Leaf) -> Cow<'_, str> {
    if leaf.color() == Color::StringConst && !leaf.is_absent() {
        quote_if_needed(leaf.text())
    } else {
        Cow::Borrowed(leaf.text())
    }
}

pub fn external_text(external: &ExternalLeaf<'_>) -> String {
    let mut text = String::new();
    match write!(text, "{external}") {
        Ok(()) if !text.is_empty() => text,
        Ok(()) => EXTERNAL_PLACEHOLDER.to_string(),
        Err(_) => {
            tracing::debug!("external object failed to format; using placeholder");
            EXTERNAL_PLACEHOLDER.to_string()
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn quote_if_needed(text: &str) -> Cow<'_, str> {
    // a bare `_` would read as an absent value
    if text != ABSENT_TEXT && PLAIN_WORD.is_match(text) {
        return Cow::Borrowed(text);
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(quoted, "\\u{{{:x}}}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}

struct Meter {
    used: usize,
    budget: usize,
}

impl Meter {
    fn add(&mut self, n: usize) -> Option<()> {
        self.used += n;
        (self.used <= self.budget).then_some(())
    }

    fn text(&mut self, s: &str) -> Option<()> {
        self.add(s.chars().count())
    }

    fn value(&mut self, value: &PrettyValue<'_>) -> Option<()> {
        match value {
            PrettyValue::Leaf(leaf) => self.text(&leaf_text(leaf)),
            PrettyValue::External(external) => self.text(&external_text(external)),
            PrettyValue::Array(array) => {
                self.add(1)?;
                for (i, child) in array.iter().enumerate() {
                    if i > 0 {
                        self.add(1)?;
                    }
                    self.value(child)?;
                }
                self.add(1)
            }
            PrettyValue::Record(record) => {
                let (left, right) = record.brackets();
                self.text(left)?;
                self.text(record.type_name())?;
                let mut first = record.type_name().is_empty();
                match record.shape() {
                    RecordShape::Named(fields) => {
                        for field in fields {
                            if !first {
                                self.add(1)?;
                            }
                            first = false;
                            self.text(&field.name)?;
                            self.add(1)?;
                            self.value(&field.value)?;
                        }
                    }
                    RecordShape::Abbreviated(abbrev) => {
                        for child in &abbrev.children {
                            if !first {
                                self.add(1)?;
                            }
                            first = false;
                            self.value(child)?;
                        }
                    }
                }
                self.text(right)
            }
        }
    }
}

struct Printer<'o, W> {
    options: &'o RenderOptions,
    out: &'o mut W,
}

impl<W: Write> Printer<'_, W> {
    fn node(&mut self, value: &PrettyValue<'_>, indent: usize, column: usize) -> fmt::Result {
        let budget = self.options.max_width.saturating_sub(column);
        if flat_width(value, budget).is_some() {
            return self.flat(value);
        }
        match value {
            PrettyValue::Leaf(_) | PrettyValue::External(_) => self.flat(value),
            PrettyValue::Array(array) if array.is_empty() => self.flat(value),
            PrettyValue::Array(array) => {
                tracing::trace!(indent, column, len = array.len(), "breaking array");
                let inner = indent + self.options.indent;
                self.out.write_char('[')?;
                for child in array.iter() {
                    self.newline(inner)?;
                    self.node(child, inner, inner)?;
                }
                self.newline(indent)?;
                self.out.write_char(']')
            }
            PrettyValue::Record(record) => self.broken_record(record, indent),
        }
    }

    fn broken_record(&mut self, record: &Record<'_>, indent: usize) -> fmt::Result {
        if record.fields().is_empty() && record.unnamed_children().is_empty() {
            return self.flat_record(record);
        }
        tracing::trace!(indent, type_name = record.type_name(), "breaking record");
        let inner = indent + self.options.indent;
        let (left, right) = record.brackets();
        self.out.write_str(left)?;
        self.type_name(record.type_name())?;
        match record.shape() {
            RecordShape::Named(fields) => {
                for field in fields {
                    self.newline(inner)?;
                    self.out.write_str(&field.name)?;
                    self.out.write_str(": ")?;
                    let column = inner + field.name.chars().count() + 2;
                    self.node(&field.value, inner, column)?;
                }
            }
            RecordShape::Abbreviated(abbrev) => {
                for child in &abbrev.children {
                    self.newline(inner)?;
                    self.node(child, inner, inner)?;
                }
            }
        }
        self.newline(indent)?;
        self.out.write_str(right)
    }

    fn flat(&mut self, value: &PrettyValue<'_>) -> fmt::Result {
        match value {
            PrettyValue::Leaf(leaf) => self.colored(&leaf_text(leaf), leaf.color()),
            PrettyValue::External(external) => {
                self.colored(&external_text(external), Color::External)
            }
            PrettyValue::Array(array) => {
                self.out.write_char('[')?;
                for (i, child) in array.iter().enumerate() {
                    if i > 0 {
                        self.out.write_char(' ')?;
                    }
                    self.flat(child)?;
                }
                self.out.write_char(']')
            }
            PrettyValue::Record(record) => self.flat_record(record),
        }
    }

    fn flat_record(&mut self, record: &Record<'_>) -> fmt::Result {
        let (left, right) = record.brackets();
        self.out.write_str(left)?;
        self.type_name(record.type_name())?;
        let mut first = record.type_name().is_empty();
        match record.shape() {
            RecordShape::Named(fields) => {
                for field in fields {
                    if !first {
                        self.out.write_char(' ')?;
                    }
                    first = false;
                    self.out.write_str(&field.name)?;
                    self.out.write_char(':')?;
                    self.flat(&field.value)?;
                }
            }
            RecordShape::Abbreviated(abbrev) => {
                for child in &abbrev.children {
                    if !first {
                        self.out.write_char(' ')?;
                    }
                    first = false;
                    self.flat(child)?;
                }
            }
        }
        self.out.write_str(right)
    }

    fn type_name(&mut self, name: &str) -> fmt::Result {
        if name.is_empty() {
            return Ok(());
        }
        self.colored(name, Color::TypeName)
    }

    fn colored(&mut self, text: &str, color: Color) -> fmt::Result {
        if self.options.color {
            write!(self.out, "{}", paint(text, color))
        } else {
            self.out.write_str(text)
        }
    }

    fn newline(&mut self, indent: usize) -> fmt::Result {
        self.out.write_char('\n')?;
        for _ in 0..indent {
            self.out.write_char(' ')?;
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
