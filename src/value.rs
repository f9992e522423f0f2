//! Homogeneous tree for pretty-printing.
//!
//! Generated schema types convert themselves into a `PrettyValue` so that one
//! renderer can print any of them without knowing their concrete shape.
//!
//! - Records are named, ordered field lists, or abbreviated positional forms.
//! - Arrays are ordered children; empty arrays are kept.
//! - Leaves are colored scalar text; an absent scalar prints as `_`.
//! - External leaves borrow an object and print its `Display` form.
//!
//! Children are moved into their parent, so a node has exactly one owner and
//! a node can never become its own descendant.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrettyError;

/// Printed in place of an absent scalar.
pub const ABSENT_TEXT: &str = "_";

/// Default record brackets.
pub const DEFAULT_LEFT: &str = "(";
pub const DEFAULT_RIGHT: &str = ")";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Display category of a leaf. The visual mapping is up to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    TypeName,
    StringConst,
    /// Numbers, booleans and the absent placeholder.
    OtherConst,
    /// An identifier naming a user-defined type.
    UserType,
    /// Only ever carried by `ExternalLeaf`.
    External,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrettyValue<'a> {
    Record(Record<'a>),
    Array(Array<'a>),
    Leaf(Leaf),
    External(ExternalLeaf<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    type_name: String,
    shape: RecordShape<'a>,
}

/// The two mutually exclusive ways a record holds its children.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordShape<'a> {
    Named(Vec<Field<'a>>),
    Abbreviated(Abbreviation<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    pub name: String,
    pub value: PrettyValue<'a>,
}

/// Positional children delimited by custom brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct Abbreviation<'a> {
    pub left: String,
    pub right: String,
    pub children: Vec<PrettyValue<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array<'a> {
    children: Vec<PrettyValue<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    text: Option<String>,
    color: Color,
}

/// Borrows an object the tree cannot decompose. The object must outlive the
/// tree; the tree never owns or mutates it.
#[derive(Clone, Copy)]
pub struct ExternalLeaf<'a> {
    obj: &'a (dyn fmt::Display + Sync),
}

// ————————————————————————————————————————————————————————————————————————————
// PRETTY VALUE
// ————————————————————————————————————————————————————————————————————————————

impl<'a> PrettyValue<'a> {
    /// Color of a leaf node; `None` for records and arrays.
    pub fn color(&self) -> Option<Color> {
        match self {
            PrettyValue::Leaf(leaf) => Some(leaf.color()),
            PrettyValue::External(external) => Some(external.color()),
            PrettyValue::Record(_) | PrettyValue::Array(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PrettyValue::Record(_) => "record",
            PrettyValue::Array(_) => "array",
            PrettyValue::Leaf(_) => "leaf",
            PrettyValue::External(_) => "external",
        }
    }

    pub fn as_record(&self) -> Option<&Record<'a>> {
        match self {
            PrettyValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array<'a>> {
        match self {
            PrettyValue::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            PrettyValue::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Total number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        match self {
            PrettyValue::Leaf(_) | PrettyValue::External(_) => 1,
            PrettyValue::Array(array) => 1 + array.iter().map(Self::node_count).sum::<usize>(),
            PrettyValue::Record(record) => {
                let children: usize = match &record.shape {
                    RecordShape::Named(fields) => fields.iter().map(|f| f.value.node_count()).sum(),
                    RecordShape::Abbreviated(abbrev) => {
                        abbrev.children.iter().map(Self::node_count).sum()
                    }
                };
                1 + children
            }
        }
    }
}

impl<'a> From<Record<'a>> for PrettyValue<'a> {
    fn from(record: Record<'a>) -> Self {
        PrettyValue::Record(record)
    }
}

impl<'a> From<Array<'a>> for PrettyValue<'a> {
    fn from(array: Array<'a>) -> Self {
        PrettyValue::Array(array)
    }
}

impl From<Leaf> for PrettyValue<'_> {
    fn from(leaf: Leaf) -> Self {
        PrettyValue::Leaf(leaf)
    }
}

impl<'a> From<ExternalLeaf<'a>> for PrettyValue<'a> {
    fn from(external: ExternalLeaf<'a>) -> Self {
        PrettyValue::External(external)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RECORD
// ————————————————————————————————————————————————————————————————————————————

impl<'a> Record<'a> {
    /// Empty record with named fields. `type_name` may be empty.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            shape: RecordShape::Named(Vec::new()),
        }
    }

    /// Synthetic grouping node with no type name.
    pub fn anonymous() -> Self {
        Self::new("")
    }

    /// Empty record already in abbreviated mode.
    pub fn abbreviated(
        type_name: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            shape: RecordShape::Abbreviated(Abbreviation {
                left: left.into(),
                right: right.into(),
                children: Vec::new(),
            }),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn shape(&self) -> &RecordShape<'a> {
        &self.shape
    }

    pub fn is_abbreviated(&self) -> bool {
        matches!(self.shape, RecordShape::Abbreviated(_))
    }

    /// Named fields in insertion order; empty for abbreviated records.
    pub fn fields(&self) -> &[Field<'a>] {
        match &self.shape {
            RecordShape::Named(fields) => fields,
            RecordShape::Abbreviated(_) => &[],
        }
    }

    /// Positional children; empty for named records.
    pub fn unnamed_children(&self) -> &[PrettyValue<'a>] {
        match &self.shape {
            RecordShape::Named(_) => &[],
            RecordShape::Abbreviated(abbrev) => &abbrev.children,
        }
    }

    /// Delimiters the renderer uses for this record.
    pub fn brackets(&self) -> (&str, &str) {
        match &self.shape {
            RecordShape::Named(_) => (DEFAULT_LEFT, DEFAULT_RIGHT),
            RecordShape::Abbreviated(abbrev) => (&abbrev.left, &abbrev.right),
        }
    }

    /// Appends a named field. Duplicate names are kept as separate entries.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PrettyValue<'a>>,
    ) -> Result<(), PrettyError> {
        match &mut self.shape {
            RecordShape::Named(fields) => {
                fields.push(Field {
                    name: name.into(),
                    value: value.into(),
                });
                Ok(())
            }
            RecordShape::Abbreviated(_) => Err(self.mode_error("add a named field")),
        }
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<PrettyValue<'a>>,
    ) -> Result<Self, PrettyError> {
        self.add_field(name, value)?;
        Ok(self)
    }

    /// Switches to abbreviated mode with the given brackets.
    ///
    /// Named fields added so far are handed back to the caller instead of
    /// being kept alongside the positional children. Calling this on a record
    /// that is already abbreviated only replaces the brackets.
    pub fn set_abbreviated(
        &mut self,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Vec<Field<'a>> {
        let (left, right) = (left.into(), right.into());
        match &mut self.shape {
            RecordShape::Abbreviated(abbrev) => {
                abbrev.left = left;
                abbrev.right = right;
                Vec::new()
            }
            RecordShape::Named(fields) => {
                let displaced = std::mem::take(fields);
                self.shape = RecordShape::Abbreviated(Abbreviation {
                    left,
                    right,
                    children: Vec::new(),
                });
                displaced
            }
        }
    }

    pub fn add_unnamed_child(
        &mut self,
        value: impl Into<PrettyValue<'a>>,
    ) -> Result<(), PrettyError> {
        match &mut self.shape {
            RecordShape::Abbreviated(abbrev) => {
                abbrev.children.push(value.into());
                Ok(())
            }
            RecordShape::Named(_) => Err(self.mode_error("add an unnamed child")),
        }
    }

    pub fn with_unnamed_child(
        mut self,
        value: impl Into<PrettyValue<'a>>,
    ) -> Result<Self, PrettyError> {
        self.add_unnamed_child(value)?;
        Ok(self)
    }

    fn mode_error(&self, operation: &'static str) -> PrettyError {
        PrettyError::InvalidModeOperation {
            operation,
            type_name: self.type_name.clone(),
            mode: if self.is_abbreviated() { "abbreviated" } else { "named" },
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ARRAY
// ————————————————————————————————————————————————————————————————————————————

impl<'a> Array<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { children: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, value: impl Into<PrettyValue<'a>>) {
        self.children.push(value.into());
    }

    pub fn children(&self) -> &[PrettyValue<'a>] {
        &self.children
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PrettyValue<'a>> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<'a> FromIterator<PrettyValue<'a>> for Array<'a> {
    fn from_iter<I: IntoIterator<Item = PrettyValue<'a>>>(iter: I) -> Self {
        Self { children: iter.into_iter().collect() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// LEAF
// ————————————————————————————————————————————————————————————————————————————

impl Leaf {
    /// Leaf for an optional scalar slot. `None` always yields the absent leaf,
    /// whatever color was asked for.
    pub fn maybe<S: Into<String>>(text: Option<S>, color: Color) -> Result<Self, PrettyError> {
        match text {
            None => Ok(Self::absent()),
            Some(text) => Self::new(text, color),
        }
    }

    pub fn new(text: impl Into<String>, color: Color) -> Result<Self, PrettyError> {
        let text = text.into();
        if color == Color::External {
            return Err(PrettyError::InvalidLeafInput {
                found: format!("external color requested for leaf {text:?}"),
            });
        }
        Ok(Self { text: Some(text), color })
    }

    pub fn absent() -> Self {
        Self { text: None, color: Color::OtherConst }
    }

    pub fn type_name(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), color: Color::TypeName }
    }

    pub fn string_const(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), color: Color::StringConst }
    }

    pub fn other_const(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), color: Color::OtherConst }
    }

    pub fn user_type(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), color: Color::UserType }
    }

    /// Printed text; `_` for an absent leaf.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or(ABSENT_TEXT)
    }

    /// `true` only for the absent marker, never for a literal `"_"`.
    pub fn is_absent(&self) -> bool {
        self.text.is_none()
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXTERNAL LEAF
// ————————————————————————————————————————————————————————————————————————————

impl<'a> ExternalLeaf<'a> {
    pub fn new(obj: &'a (dyn fmt::Display + Sync)) -> Self {
        Self { obj }
    }

    pub fn object(&self) -> &'a (dyn fmt::Display + Sync) {
        self.obj
    }

    pub fn color(&self) -> Color {
        Color::External
    }
}

impl fmt::Display for ExternalLeaf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.obj.fmt(f)
    }
}

impl fmt::Debug for ExternalLeaf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ExternalLeaf {}>", self.obj)
    }
}

/// Two external leaves are equal when they borrow the same object.
impl PartialEq for ExternalLeaf<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self.obj, other.obj)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Color::TypeName)]
    #[case(Color::StringConst)]
    #[case(Color::OtherConst)]
    #[case(Color::UserType)]
    #[case(Color::External)]
    fn absent_leaf_ignores_requested_color(#[case] color: Color) {
        let leaf = Leaf::maybe(None::<String>, color).unwrap();
        assert_eq!(leaf.text(), "_");
        assert_eq!(leaf.color(), Color::OtherConst);
        assert!(leaf.is_absent());
    }

    #[test]
    fn literal_underscore_is_not_absent() {
        let leaf = Leaf::maybe(Some("_"), Color::StringConst).unwrap();
        assert_eq!(leaf.text(), "_");
        assert!(!leaf.is_absent());
        assert_eq!(leaf.color(), Color::StringConst);
    }

    #[test]
    fn leaf_rejects_external_color() {
        let err = Leaf::new("x", Color::External).unwrap_err();
        assert!(matches!(err, PrettyError::InvalidLeafInput { .. }));
    }

    #[test]
    fn record_keeps_field_order() {
        let record = Record::new("BinOp")
            .with_field("op", Leaf::other_const("+"))
            .and_then(|r| r.with_field("left", Leaf::other_const("1")))
            .and_then(|r| r.with_field("right", Leaf::other_const("2")))
            .unwrap();
        let names: Vec<_> = record.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["op", "left", "right"]);
        assert!(!record.is_abbreviated());
        assert!(record.unnamed_children().is_empty());
        assert_eq!(record.brackets(), ("(", ")"));
    }

    #[test]
    fn duplicate_field_names_are_kept() {
        let mut record = Record::anonymous();
        record.add_field("x", Leaf::other_const("1")).unwrap();
        record.add_field("x", Leaf::other_const("2")).unwrap();
        assert_eq!(record.fields().len(), 2);
        assert_eq!(record.type_name(), "");
    }

    #[test]
    fn unnamed_child_on_named_record_is_rejected() {
        let mut record = Record::new("Token");
        let err = record.add_unnamed_child(Leaf::other_const("1")).unwrap_err();
        assert_eq!(
            err,
            PrettyError::InvalidModeOperation {
                operation: "add an unnamed child",
                type_name: "Token".into(),
                mode: "named",
            }
        );
        assert!(record.unnamed_children().is_empty());
    }

    #[test]
    fn abbreviated_record_routes_children_positionally() {
        let mut record = Record::new("BinOp");
        record.add_field("op", Leaf::other_const("+")).unwrap();

        let displaced = record.set_abbreviated("{", "}");
        assert_eq!(displaced.len(), 1);
        assert_eq!(displaced[0].name, "op");

        record.add_unnamed_child(Leaf::other_const("+")).unwrap();
        record.add_unnamed_child(Leaf::other_const("1")).unwrap();
        let err = record.add_field("right", Leaf::other_const("2")).unwrap_err();
        assert!(matches!(err, PrettyError::InvalidModeOperation { mode: "abbreviated", .. }));

        assert!(record.is_abbreviated());
        assert!(record.fields().is_empty());
        assert_eq!(record.unnamed_children().len(), 2);
        assert_eq!(record.brackets(), ("{", "}"));
    }

    #[test]
    fn re_abbreviating_only_swaps_brackets() {
        let mut record = Record::abbreviated("T", "<", ">")
            .with_unnamed_child(Leaf::other_const("1"))
            .unwrap();
        assert!(record.set_abbreviated("[", "]").is_empty());
        assert_eq!(record.brackets(), ("[", "]"));
        assert_eq!(record.unnamed_children().len(), 1);
    }

    #[test]
    fn array_preserves_order() {
        let mut array = Array::new();
        for text in ["a", "b", "c"] {
            array.push(Leaf::string_const(text));
        }
        let texts: Vec<_> = array.iter().filter_map(|v| v.as_leaf()).map(Leaf::text).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert!(Array::new().is_empty());
    }

    #[test]
    fn external_leaf_is_always_external() {
        let obj = 42_u32;
        let value = PrettyValue::from(ExternalLeaf::new(&obj));
        assert_eq!(value.color(), Some(Color::External));
        assert_eq!(format!("{value:?}"), "External(<ExternalLeaf 42>)");
    }

    #[test]
    fn node_count_covers_both_record_shapes() {
        let named = Record::new("A")
            .with_field(
                "xs",
                Array::from_iter([
                    PrettyValue::from(Leaf::other_const("1")),
                    PrettyValue::from(Leaf::absent()),
                ]),
            )
            .unwrap();
        assert_eq!(PrettyValue::from(named).node_count(), 4);

        let abbrev = Record::abbreviated("B", "(", ")")
            .with_unnamed_child(Leaf::other_const("1"))
            .unwrap();
        assert_eq!(PrettyValue::from(abbrev).node_count(), 2);
    }
}
