//! Route template parser.
//!
//! Turns template text into [`RouteTemplate`] segments. Parentheses inside a
//! parameter are balanced so constraint arguments may contain `/`, `{` and `}`
//! (`{path:regex(^\d{3}/x$)}`).

use std::fmt;

use super::types::{
    InlineConstraint, LiteralPart, ParameterPart, RouteTemplate, TemplatePart, TemplateSegment,
};
use crate::values::eq_ignore_case;

/// Template parse error
///
/// Returned by [`RouteTemplate::parse`] when the template text is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Two `/` separators with nothing in between
    ConsecutiveSeparators { template: String },
    /// `{` without a matching `}` or a lone `}`
    UnbalancedBraces { template: String },
    /// Literal text contains `?`
    InvalidLiteral { template: String, literal: String },
    /// Parameter name is empty or contains a reserved character
    InvalidParameterName { template: String, name: String },
    /// Parameter body could not be read (`{id:int!}`)
    InvalidParameter { template: String, parameter: String },
    /// Same parameter name used twice (case-insensitive)
    RepeatedParameter { template: String, name: String },
    /// Catch-all parameter that is not the last segment
    CatchAllNotLast { template: String, name: String },
    /// Catch-all parameter that shares its segment with other parts
    CatchAllInComplexSegment { template: String, name: String },
    /// Catch-all parameter marked optional
    OptionalCatchAll { template: String, name: String },
    /// Parameter that is both optional and defaulted
    OptionalWithDefault { template: String, name: String },
    /// Two parameters with no literal between them (`{a}{b}`)
    ConsecutiveParameters { template: String },
    /// Optional parameter inside a complex segment that is not its last part
    OptionalNotLast { template: String, name: String },
    /// Optional parameter in a complex segment not preceded by `.`
    InvalidOptionalSeparator { template: String, name: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::ConsecutiveSeparators { template } => write!(
                f,
                "invalid route template '{template}': the separator '/' cannot appear consecutively"
            ),
            TemplateError::UnbalancedBraces { template } => write!(
                f,
                "invalid route template '{template}': braces are unbalanced; use '{{{{' and '}}}}' for literal braces"
            ),
            TemplateError::InvalidLiteral { template, literal } => write!(
                f,
                "invalid route template '{template}': literal '{literal}' cannot contain '?'"
            ),
            TemplateError::InvalidParameterName { template, name } => write!(
                f,
                "invalid route template '{template}': parameter name '{name}' is empty or contains one of '{{', '}}', '/', '?', '*', '=', '(', ')'"
            ),
            TemplateError::InvalidParameter {
                template,
                parameter,
            } => write!(
                f,
                "invalid route template '{template}': cannot read parameter '{{{parameter}}}'"
            ),
            TemplateError::RepeatedParameter { template, name } => write!(
                f,
                "invalid route template '{template}': parameter '{name}' appears more than once"
            ),
            TemplateError::CatchAllNotLast { template, name } => write!(
                f,
                "invalid route template '{template}': catch-all parameter '{name}' must be the last segment"
            ),
            TemplateError::CatchAllInComplexSegment { template, name } => write!(
                f,
                "invalid route template '{template}': catch-all parameter '{name}' cannot share its segment"
            ),
            TemplateError::OptionalCatchAll { template, name } => write!(
                f,
                "invalid route template '{template}': catch-all parameter '{name}' cannot be optional"
            ),
            TemplateError::OptionalWithDefault { template, name } => write!(
                f,
                "invalid route template '{template}': optional parameter '{name}' cannot have a default value"
            ),
            TemplateError::ConsecutiveParameters { template } => write!(
                f,
                "invalid route template '{template}': parameters must be separated by a literal"
            ),
            TemplateError::OptionalNotLast { template, name } => write!(
                f,
                "invalid route template '{template}': optional parameter '{name}' must be at the end of its segment"
            ),
            TemplateError::InvalidOptionalSeparator { template, name } => write!(
                f,
                "invalid route template '{template}': only '.' can precede optional parameter '{name}'"
            ),
        }
    }
}

impl std::error::Error for TemplateError {}

const INVALID_NAME_CHARS: &[char] = &['{', '}', '/', '?', '*', '=', '(', ')', ':'];

pub(crate) fn parse(text: &str) -> Result<RouteTemplate, TemplateError> {
    let body = text
        .strip_prefix("~/")
        .or_else(|| text.strip_prefix('/'))
        .unwrap_or(text);
    let body = body.strip_suffix('/').unwrap_or(body);

    let mut segments = Vec::new();
    let mut parts: Vec<TemplatePart> = Vec::new();
    let mut literal = String::new();
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '/' => {
                flush_literal(&mut literal, &mut parts, text)?;
                if parts.is_empty() {
                    return Err(TemplateError::ConsecutiveSeparators {
                        template: text.to_string(),
                    });
                }
                segments.push(TemplateSegment {
                    parts: std::mem::take(&mut parts),
                });
            }
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    literal.push('{');
                    continue;
                }
                flush_literal(&mut literal, &mut parts, text)?;

                let start = i + 1;
                let mut depth = 0usize;
                let mut end = None;
                for (j, c) in chars.by_ref() {
                    match c {
                        '(' => depth += 1,
                        ')' => depth = depth.saturating_sub(1),
                        '}' if depth == 0 => {
                            end = Some(j);
                            break;
                        }
                        _ => {}
                    }
                }
                let end = end.ok_or_else(|| TemplateError::UnbalancedBraces {
                    template: text.to_string(),
                })?;
                parts.push(TemplatePart::Parameter(parse_parameter(
                    &body[start..end],
                    text,
                )?));
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(TemplateError::UnbalancedBraces {
                        template: text.to_string(),
                    });
                }
            }
            c => literal.push(c),
        }
    }

    flush_literal(&mut literal, &mut parts, text)?;
    if !parts.is_empty() {
        segments.push(TemplateSegment { parts });
    } else if !body.is_empty() {
        return Err(TemplateError::ConsecutiveSeparators {
            template: text.to_string(),
        });
    }

    validate(&mut segments, text)?;

    Ok(RouteTemplate {
        text: text.to_string(),
        segments,
    })
}

fn flush_literal(
    literal: &mut String,
    parts: &mut Vec<TemplatePart>,
    template: &str,
) -> Result<(), TemplateError> {
    if literal.is_empty() {
        return Ok(());
    }
    if literal.contains('?') {
        return Err(TemplateError::InvalidLiteral {
            template: template.to_string(),
            literal: std::mem::take(literal),
        });
    }
    parts.push(TemplatePart::Literal(LiteralPart {
        text: std::mem::take(literal),
        is_optional_separator: false,
    }));
    Ok(())
}

fn parse_parameter(body: &str, template: &str) -> Result<ParameterPart, TemplateError> {
    let invalid = || TemplateError::InvalidParameter {
        template: template.to_string(),
        parameter: body.to_string(),
    };

    let (is_catch_all, rest) = if let Some(rest) = body.strip_prefix("**") {
        (true, rest)
    } else if let Some(rest) = body.strip_prefix('*') {
        (true, rest)
    } else {
        (false, body)
    };

    let name_end = rest.find([':', '=', '?']).unwrap_or(rest.len());
    let name = &rest[..name_end];
    if name.is_empty() || name.contains(INVALID_NAME_CHARS) {
        return Err(TemplateError::InvalidParameterName {
            template: template.to_string(),
            name: name.to_string(),
        });
    }

    let mut tail = &rest[name_end..];
    let mut constraints = Vec::new();
    while let Some(after) = tail.strip_prefix(':') {
        let (constraint, consumed) = parse_constraint(after).ok_or_else(invalid)?;
        constraints.push(constraint);
        tail = &after[consumed..];
    }

    let (is_optional, default_value) = if tail.is_empty() {
        (false, None)
    } else if tail == "?" {
        (true, None)
    } else if let Some(default) = tail.strip_prefix('=') {
        if default.ends_with('?') {
            return Err(TemplateError::OptionalWithDefault {
                template: template.to_string(),
                name: name.to_string(),
            });
        }
        (false, Some(default.to_string()))
    } else {
        return Err(invalid());
    };

    Ok(ParameterPart {
        name: name.to_string(),
        is_catch_all,
        is_optional,
        default_value,
        constraints,
    })
}

/// Read one constraint reference; returns it with the number of bytes consumed
fn parse_constraint(text: &str) -> Option<(InlineConstraint, usize)> {
    let mut name_end = text.len();
    let mut argument = None;
    let mut consumed = text.len();

    for (i, c) in text.char_indices() {
        match c {
            '(' => {
                name_end = i;
                let mut depth = 0usize;
                let mut close = None;
                for (j, c) in text[i..].char_indices() {
                    match c {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                close = Some(i + j);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let close = close?;
                argument = Some(unescape_braces(&text[i + 1..close]));
                consumed = close + 1;
                break;
            }
            ':' | '=' => {
                name_end = i;
                consumed = i;
                break;
            }
            '?' if i + 1 == text.len() => {
                name_end = i;
                consumed = i;
                break;
            }
            _ => {}
        }
    }

    let name = &text[..name_end];
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((
        InlineConstraint {
            name: name.to_string(),
            argument,
        },
        consumed,
    ))
}

fn unescape_braces(text: &str) -> String {
    text.replace("{{", "{").replace("}}", "}")
}

fn validate(segments: &mut [TemplateSegment], template: &str) -> Result<(), TemplateError> {
    let mut seen: Vec<&str> = Vec::new();
    let last_segment = segments.len().saturating_sub(1);
    let mut separators = Vec::new();

    for (si, segment) in segments.iter().enumerate() {
        if segment
            .parts
            .windows(2)
            .any(|w| w[0].is_parameter() && w[1].is_parameter())
        {
            return Err(TemplateError::ConsecutiveParameters {
                template: template.to_string(),
            });
        }

        let simple = segment.is_simple();
        for (pi, part) in segment.parts.iter().enumerate() {
            let Some(p) = part.as_parameter() else {
                continue;
            };
            let err_name = || p.name.clone();

            if seen.iter().any(|n| eq_ignore_case(n, &p.name)) {
                return Err(TemplateError::RepeatedParameter {
                    template: template.to_string(),
                    name: err_name(),
                });
            }
            seen.push(&p.name);

            if p.is_catch_all {
                if !simple {
                    return Err(TemplateError::CatchAllInComplexSegment {
                        template: template.to_string(),
                        name: err_name(),
                    });
                }
                if si != last_segment {
                    return Err(TemplateError::CatchAllNotLast {
                        template: template.to_string(),
                        name: err_name(),
                    });
                }
                if p.is_optional {
                    return Err(TemplateError::OptionalCatchAll {
                        template: template.to_string(),
                        name: err_name(),
                    });
                }
            }

            if p.is_optional && !simple {
                if pi + 1 != segment.parts.len() {
                    return Err(TemplateError::OptionalNotLast {
                        template: template.to_string(),
                        name: err_name(),
                    });
                }
                match pi.checked_sub(1).and_then(|i| segment.parts[i].as_literal()) {
                    Some(lit) if lit.text == "." => separators.push((si, pi - 1)),
                    _ => {
                        return Err(TemplateError::InvalidOptionalSeparator {
                            template: template.to_string(),
                            name: err_name(),
                        })
                    }
                }
            }
        }
    }

    for (si, pi) in separators {
        if let TemplatePart::Literal(lit) = &mut segments[si].parts[pi] {
            lit.is_optional_separator = true;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(template: &RouteTemplate, name: &str) -> ParameterPart {
        template.parameter(name).cloned().unwrap()
    }

    #[test]
    fn test_parse_conventional_template() {
        let t = RouteTemplate::parse("{controller=Home}/{action=Index}/{id?}").unwrap();
        assert_eq!(t.segments().len(), 3);
        assert_eq!(param(&t, "controller").default_value.as_deref(), Some("Home"));
        assert!(param(&t, "id").is_optional);
        assert!(!param(&t, "action").is_optional);
    }

    #[test]
    fn test_parse_leading_and_trailing_slash() {
        let t = RouteTemplate::parse("/products/{id}/").unwrap();
        assert_eq!(t.segments().len(), 2);
        assert_eq!(t.text(), "/products/{id}/");
        assert!(RouteTemplate::parse("").unwrap().segments().is_empty());
        assert!(RouteTemplate::parse("~/").unwrap().segments().is_empty());
    }

    #[test]
    fn test_parse_constraints() {
        let t = RouteTemplate::parse("a/{id:int:range(1,10)=5}").unwrap();
        let id = param(&t, "id");
        assert_eq!(id.constraints.len(), 2);
        assert_eq!(id.constraints[0].name, "int");
        assert_eq!(id.constraints[1].argument.as_deref(), Some("1,10"));
        assert_eq!(id.default_value.as_deref(), Some("5"));

        let t = RouteTemplate::parse("template/{parameter:int?}").unwrap();
        let p = param(&t, "parameter");
        assert!(p.is_optional);
        assert_eq!(p.constraints[0].name, "int");
    }

    #[test]
    fn test_parse_regex_argument_with_slashes_and_braces() {
        let t = RouteTemplate::parse(r"a/{*path:regex(^\d{3}/(x|y)$)}").unwrap();
        assert_eq!(t.segments().len(), 2);
        let path = param(&t, "path");
        assert!(path.is_catch_all);
        assert_eq!(path.constraints[0].argument.as_deref(), Some(r"^\d{3}/(x|y)$"));
    }

    #[test]
    fn test_parse_complex_segment_marks_separator() {
        let t = RouteTemplate::parse("moo/{p1}.{p2?}").unwrap();
        let segment = &t.segments()[1];
        assert_eq!(segment.parts.len(), 3);
        assert!(segment.parts[1].as_literal().unwrap().is_optional_separator);
    }

    #[test]
    fn test_parse_escaped_braces() {
        let t = RouteTemplate::parse("a{{b}}").unwrap();
        assert_eq!(t.segments()[0].parts[0].as_literal().unwrap().text, "a{b}");
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            "a//b",
            "a/{b",
            "a/b}",
            "a/b?",
            "{}",
            "{a}/{A}",
            "{*a}/b",
            "a{*b}",
            "{a?=1}",
            "{a}{b}",
            "{a?}.{b}",
            "{a}-{b?}",
            "{*a?}",
            "{a:int!}",
        ];
        for case in cases {
            assert!(RouteTemplate::parse(case).is_err(), "expected error for {case}");
        }
    }

    #[test]
    fn test_error_display_names_template() {
        let err = RouteTemplate::parse("{*rest}/x").unwrap_err();
        assert_eq!(
            err,
            TemplateError::CatchAllNotLast {
                template: "{*rest}/x".to_string(),
                name: "rest".to_string()
            }
        );
        assert!(err.to_string().contains("{*rest}/x"));
    }
}
