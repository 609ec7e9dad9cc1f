use std::fmt;

use super::parser::{self, TemplateError};
use crate::values::eq_ignore_case;

/// Inline constraint reference attached to a parameter, e.g. `int` or `range(1,10)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineConstraint {
    pub name: String,
    pub argument: Option<String>,
}

impl fmt::Display for InlineConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(arg) => write!(f, "{}({})", self.name, arg),
            None => f.write_str(&self.name),
        }
    }
}

/// Literal text inside a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralPart {
    pub text: String,
    /// `.` literal directly before a trailing optional parameter (`{id}.{format?}`)
    pub is_optional_separator: bool,
}

/// Parameter inside a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPart {
    pub name: String,
    pub is_catch_all: bool,
    pub is_optional: bool,
    pub default_value: Option<String>,
    pub constraints: Vec<InlineConstraint>,
}

impl ParameterPart {
    /// A parameter that does not need a value from the request path
    #[inline]
    #[must_use]
    pub fn is_optional_like(&self) -> bool {
        self.is_optional || self.is_catch_all || self.default_value.is_some()
    }

    #[inline]
    #[must_use]
    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(LiteralPart),
    Parameter(ParameterPart),
}

impl TemplatePart {
    #[inline]
    #[must_use]
    pub fn as_parameter(&self) -> Option<&ParameterPart> {
        match self {
            TemplatePart::Parameter(p) => Some(p),
            TemplatePart::Literal(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_literal(&self) -> Option<&LiteralPart> {
        match self {
            TemplatePart::Literal(l) => Some(l),
            TemplatePart::Parameter(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_parameter(&self) -> bool {
        matches!(self, TemplatePart::Parameter(_))
    }
}

/// One `/`-delimited piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSegment {
    pub parts: Vec<TemplatePart>,
}

impl TemplateSegment {
    /// A simple segment holds exactly one literal or one parameter
    #[inline]
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }

    /// The single part of a simple segment
    #[inline]
    #[must_use]
    pub fn simple_part(&self) -> Option<&TemplatePart> {
        if self.is_simple() {
            self.parts.first()
        } else {
            None
        }
    }
}

/// A parsed route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    pub(crate) text: String,
    pub(crate) segments: Vec<TemplateSegment>,
}

impl RouteTemplate {
    /// Parse a template string such as `{controller=Home}/{action=Index}/{id?}`
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        parser::parse(text)
    }

    /// Original template text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// All parameters in declaration order
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterPart> {
        self.segments
            .iter()
            .flat_map(|s| s.parts.iter())
            .filter_map(TemplatePart::as_parameter)
    }

    /// Look up a parameter by name (case-insensitive)
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterPart> {
        self.parameters()
            .find(|p| eq_ignore_case(&p.name, name))
    }

    /// True when the last segment is a catch-all parameter
    #[must_use]
    pub fn ends_with_catch_all(&self) -> bool {
        self.segments
            .last()
            .and_then(TemplateSegment::simple_part)
            .and_then(TemplatePart::as_parameter)
            .is_some_and(|p| p.is_catch_all)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
