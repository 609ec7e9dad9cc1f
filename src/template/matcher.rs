use std::borrow::Cow;

use smallvec::SmallVec;

use super::tokenizer::PathTokenizer;
use super::types::{LiteralPart, RouteTemplate, TemplatePart, TemplateSegment};
use crate::values::{eq_ignore_case, RouteValues};

/// Parameter values captured from one request path, in template order.
pub type Captures<'p> = SmallVec<[(&'p str, Cow<'p, str>); 8]>;

/// Matches request paths against one [`RouteTemplate`].
///
/// Captured values are percent-decoded. Nothing is written to the caller's
/// values unless the whole path matches; defaults are then added for every key
/// that is still absent.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    template: RouteTemplate,
    defaults: RouteValues,
}

impl TemplateMatcher {
    #[must_use]
    pub fn new(template: RouteTemplate, defaults: RouteValues) -> Self {
        Self { template, defaults }
    }

    #[must_use]
    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    #[must_use]
    pub fn defaults(&self) -> &RouteValues {
        &self.defaults
    }

    /// Try to match `path`, writing captured values and defaults into `values`
    pub fn try_match(&self, path: &str, values: &mut RouteValues) -> bool {
        match self.capture(path) {
            Some(captures) => {
                self.apply(captures, values);
                true
            }
            None => false,
        }
    }

    /// Match `path` without touching any route values.
    ///
    /// Returns the captured parameter values, or `None` when the path does not
    /// fit the template.
    #[must_use]
    pub fn capture<'p>(&'p self, path: &'p str) -> Option<Captures<'p>> {
        let tokens = PathTokenizer::new(path);
        let segments = self.template.segments();

        // Shape check: literals, empty segments and segment counts.
        let mut i = 0;
        for token in tokens.iter() {
            if token.is_empty() {
                return None;
            }
            let Some(segment) = segments.get(i) else {
                return None;
            };
            match segment.simple_part() {
                Some(TemplatePart::Parameter(p)) if p.is_catch_all => break,
                Some(TemplatePart::Literal(lit)) => {
                    if !eq_ignore_case(&lit.text, token) {
                        return None;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        // Template segments left over must be able to match nothing.
        for segment in &segments[i.min(segments.len())..] {
            match segment.simple_part() {
                Some(TemplatePart::Parameter(p)) if p.is_optional_like() => {}
                _ => return None,
            }
        }

        let mut captures = Captures::new();
        for (i, token) in tokens.iter().enumerate() {
            let Some(segment) = segments.get(i) else {
                break;
            };
            match segment.simple_part() {
                Some(TemplatePart::Parameter(p)) if p.is_catch_all => {
                    if let Some(rest) = tokens.remainder(i).filter(|r| !r.is_empty()) {
                        captures.push((p.name.as_str(), decode(rest)));
                    }
                    break;
                }
                Some(TemplatePart::Parameter(p)) => {
                    captures.push((p.name.as_str(), decode(token)));
                }
                Some(TemplatePart::Literal(_)) => {}
                None => {
                    if !match_complex_segment(segment, token, &mut captures) {
                        return None;
                    }
                }
            }
        }

        Some(captures)
    }

    /// Write `captures` and then the template defaults for keys still absent
    pub fn apply(&self, captures: Captures<'_>, values: &mut RouteValues) {
        for (name, value) in captures {
            values.insert(name, value.into_owned());
        }
        for (key, value) in self.defaults.iter() {
            values.insert_if_absent(key, value);
        }
    }
}

fn decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Match a segment mixing literals and parameters, e.g. `{name}.{ext?}`.
///
/// Literals are located right to left. When the segment ends with an optional
/// parameter behind a `.` separator, a second attempt ignores both.
fn match_complex_segment<'p>(
    segment: &'p TemplateSegment,
    request: &'p str,
    captures: &mut Captures<'p>,
) -> bool {
    let parts = &segment.parts;
    let last = parts.len() - 1;

    let trailing_optional = matches!(
        &parts[last],
        TemplatePart::Parameter(p) if p.is_optional
    );
    let separator = last
        .checked_sub(1)
        .and_then(|i| parts[i].as_literal())
        .filter(|lit| lit.is_optional_separator);

    match separator {
        Some(separator) if trailing_optional => {
            if match_complex_core(parts, request, last, captures) {
                return true;
            }
            if ends_with_ignore_case(request, &separator.text) {
                return false;
            }
            match last.checked_sub(2) {
                Some(end) => match_complex_core(parts, request, end, captures),
                None => false,
            }
        }
        _ => match_complex_core(parts, request, last, captures),
    }
}

fn match_complex_core<'p>(
    parts: &'p [TemplatePart],
    request: &'p str,
    last_used: usize,
    captures: &mut Captures<'p>,
) -> bool {
    let mut last_index = request.len();
    let mut pending: Option<&'p str> = None;
    let mut last_literal: Option<&'p LiteralPart> = None;
    let mut found = Captures::new();

    for index in (0..=last_used).rev() {
        let part = &parts[index];
        let mut new_last_index = last_index;

        match part {
            TemplatePart::Parameter(p) => pending = Some(p.name.as_str()),
            TemplatePart::Literal(lit) => {
                last_literal = Some(lit);

                let mut start = last_index;
                if pending.is_some() {
                    // Leave at least one character for the pending parameter.
                    start = start.saturating_sub(1);
                }
                if start == 0 {
                    return false;
                }
                let Some(at) = rfind_ignore_case(request, &lit.text, start) else {
                    return false;
                };
                if index == parts.len() - 1 && at + lit.text.len() != request.len() {
                    return false;
                }
                new_last_index = at;
            }
        }

        if let Some(name) = pending {
            if (last_literal.is_some() && !part.is_parameter()) || index == 0 {
                let (start, len) = match last_literal {
                    Some(lit) if !(index == 0 && part.is_parameter()) => {
                        let start = new_last_index + lit.text.len();
                        (start, last_index.saturating_sub(start))
                    }
                    _ => (0, last_index),
                };
                let Some(value) = request.get(start..start + len) else {
                    return false;
                };
                if value.is_empty() {
                    return false;
                }
                found.push((name, decode(value)));
                pending = None;
                last_literal = None;
            }
        }

        last_index = new_last_index;
    }

    if last_index == 0 || parts[0].is_parameter() {
        captures.extend(found);
        true
    } else {
        false
    }
}

/// Last match of `needle` that ends at or before byte `end`, ASCII case-insensitive
fn rfind_ignore_case(haystack: &str, needle: &str, end: usize) -> Option<usize> {
    let hay = haystack.as_bytes().get(..end.min(haystack.len()))?;
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .rev()
        .find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    text.len() >= suffix.len()
        && text.as_bytes()[text.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(template: &str) -> TemplateMatcher {
        let template = RouteTemplate::parse(template).unwrap();
        let defaults = template
            .parameters()
            .filter_map(|p| p.default_value.as_deref().map(|d| (p.name.clone(), d.to_string())))
            .collect();
        TemplateMatcher::new(template, defaults)
    }

    fn try_match(template: &str, path: &str) -> Option<RouteValues> {
        let mut values = RouteValues::new();
        matcher(template).try_match(path, &mut values).then_some(values)
    }

    #[test]
    fn test_match_literal_is_case_insensitive() {
        assert!(try_match("Home/Index", "/home/INDEX").is_some());
        assert!(try_match("Home/Index", "/home/about").is_none());
    }

    #[test]
    fn test_match_non_ascii_literal_ignores_case() {
        assert!(try_match("Straße/Äpfel", "/STRASSE/äpfel").is_none());
        assert!(try_match("Straße/Äpfel", "/straße/äPFEL").is_some());
    }

    #[test]
    fn test_capture_leaves_values_to_apply() {
        let matcher = matcher("{controller=Home}/{action=Index}/{id?}");
        assert!(matcher.capture("/a/b/c/d").is_none());

        let captures = matcher.capture("/Products/List").unwrap();
        let names: Vec<&str> = captures.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["controller", "action"]);

        let mut values = RouteValues::from([("action", "ignored"), ("area", "Admin")]);
        matcher.apply(captures, &mut values);
        assert_eq!(values.get("controller"), Some("Products"));
        assert_eq!(values.get("action"), Some("List"));
        assert_eq!(values.get("area"), Some("Admin"));
        assert_eq!(values.get("id"), None);
    }

    #[test]
    fn test_match_captures_parameters_and_defaults() {
        let values = try_match("{controller=Home}/{action=Index}/{id?}", "/Products").unwrap();
        assert_eq!(values.get("controller"), Some("Products"));
        assert_eq!(values.get("action"), Some("Index"));
        assert_eq!(values.get("id"), None);
    }

    #[test]
    fn test_match_rejects_missing_required_segment() {
        assert!(try_match("a/{b}", "/a").is_none());
        assert!(try_match("a/{b}/c", "/a/x").is_none());
    }

    #[test]
    fn test_match_rejects_extra_segments() {
        assert!(try_match("a/{b}", "/a/x/y").is_none());
    }

    #[test]
    fn test_match_rejects_empty_segments() {
        assert!(try_match("a/{b}/{c?}", "/a//c").is_none());
        assert!(try_match("{*path}", "//").is_none());
    }

    #[test]
    fn test_match_catch_all_takes_remainder() {
        let values = try_match("files/{*path}", "/files/a/b//c.txt").unwrap();
        assert_eq!(values.get("path"), Some("a/b//c.txt"));

        let values = try_match("files/{*path}", "/files").unwrap();
        assert_eq!(values.get("path"), None);

        let values = try_match("files/{*path=index}", "/files").unwrap();
        assert_eq!(values.get("path"), Some("index"));
    }

    #[test]
    fn test_match_decodes_values() {
        let values = try_match("users/{name}", "/users/J%C3%BCrgen%20K").unwrap();
        assert_eq!(values.get("name"), Some("Jürgen K"));
        let values = try_match("users/{name}", "/users/100%").unwrap();
        assert_eq!(values.get("name"), Some("100%"));
    }

    #[test]
    fn test_match_complex_segment() {
        let values = try_match("{a}.{b}", "/x.y.z").unwrap();
        assert_eq!(values.get("a"), Some("x.y"));
        assert_eq!(values.get("b"), Some("z"));

        let values = try_match("{name}_{version}.{ext}", "/tree_1.2.zip").unwrap();
        assert_eq!(values.get("name"), Some("tree"));
        assert_eq!(values.get("version"), Some("1.2"));
        assert_eq!(values.get("ext"), Some("zip"));

        assert!(try_match("file{id}", "/file").is_none());
        assert!(try_match("{id}.html", "/a.htm").is_none());
        assert!(try_match("x{id}", "/yx1").is_none());
    }

    #[test]
    fn test_match_complex_optional_extension() {
        let values = try_match("moo/{p1}.{p2?}", "/moo/foo.bar").unwrap();
        assert_eq!(values.get("p1"), Some("foo"));
        assert_eq!(values.get("p2"), Some("bar"));

        let values = try_match("moo/{p1}.{p2?}", "/moo/foo").unwrap();
        assert_eq!(values.get("p1"), Some("foo"));
        assert_eq!(values.get("p2"), None);

        let values = try_match("moo/{p1}.{p2?}", "/moo/.foo").unwrap();
        assert_eq!(values.get("p1"), Some(".foo"));
        assert_eq!(values.get("p2"), None);

        let values = try_match("moo/{p1}.{p2?}", "/moo/foo..bar").unwrap();
        assert_eq!(values.get("p1"), Some("foo."));
        assert_eq!(values.get("p2"), Some("bar"));

        assert!(try_match("moo/{p1}.{p2?}", "/moo/foo.").is_none());
    }

    #[test]
    fn test_failed_match_leaves_values_untouched() {
        let mut values = RouteValues::from([("area", "admin")]);
        assert!(!matcher("{a}_{b}").try_match("/nounderscore", &mut values));
        assert_eq!(values, RouteValues::from([("area", "admin")]));
    }

    #[test]
    fn test_rfind_ignore_case_respects_end() {
        assert_eq!(rfind_ignore_case("a.b.c", ".", 5), Some(3));
        assert_eq!(rfind_ignore_case("a.b.c", ".", 3), Some(1));
        assert_eq!(rfind_ignore_case("ABC", "bc", 3), Some(1));
        assert_eq!(rfind_ignore_case("ABC", "bc", 2), None);
    }
}
