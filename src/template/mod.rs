//! # Template Module
//!
//! Route templates describe the shape of a URL: `/`-separated segments made of
//! literal text and `{parameters}`. This module parses template text, matches
//! request paths against a parsed template and binds route values back into a
//! URL.
//!
//! ## Syntax
//!
//! | Form | Meaning |
//! |------|---------|
//! | `{id}` | required parameter |
//! | `{id?}` | optional parameter |
//! | `{id=5}` | parameter with a default value |
//! | `{*path}` / `{**path}` | catch-all, captures the rest of the path |
//! | `{id:int}` | inline constraint (`int`, `range(1,10)`, `regex(...)`, ...) |
//! | `{{` / `}}` | literal braces |
//!
//! A segment may mix literals and parameters (`{name}.{ext?}`); such a segment is
//! called *complex*.
//!
//! ## Components
//!
//! - [`RouteTemplate`] - parsed template
//! - [`PathTokenizer`] - allocation-free request path splitter
//! - [`TemplateMatcher`] - inbound matching, writes captured values
//! - [`TemplateBinder`] - outbound value selection and URL building
//! - [`precedence`] - numeric specificity of a template

mod binder;
mod matcher;
mod parser;
pub mod precedence;
mod tokenizer;
mod types;

pub use binder::{TemplateBinder, TemplateValuesResult};
pub use matcher::{Captures, TemplateMatcher};
pub use parser::TemplateError;
pub use tokenizer::{PathTokenizer, MAX_INLINE_SEGMENTS};
pub use types::{
    InlineConstraint, LiteralPart, ParameterPart, RouteTemplate, TemplatePart, TemplateSegment,
};
