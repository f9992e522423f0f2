//! Homogeneous pretty-print trees for schema-generated values.
//!
//! Producers (generated code via [`ToPretty`], or [`JsonWalker`] for JSON
//! documents) build a [`PrettyValue`]; [`render`] turns it into colorized,
//! width-aware text.
pub mod error;
pub mod value;
pub mod convert;
pub mod render;
pub mod json;
pub mod jq_exec;

pub use error::PrettyError;
pub use value::{
    Abbreviation, Array, Color, ExternalLeaf, Field, Leaf, PrettyValue, Record, RecordShape,
};
pub use convert::ToPretty;
pub use render::{RenderOptions, render, render_to};
pub use json::{JsonWalker, leaf_from_json};
