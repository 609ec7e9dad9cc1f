use std::borrow::Cow;

use super::types::{RouteTemplate, TemplatePart};
use crate::values::{route_parts_equal, RouteValues};

/// Values selected by [`TemplateBinder::get_values`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValuesResult {
    /// Values used to build the URL (parameters first, then extra query values)
    pub accepted_values: RouteValues,
    /// Accepted values plus non-parameter ambient values, seen by constraints
    pub combined_values: RouteValues,
}

/// Builds URLs from route values for one [`RouteTemplate`].
///
/// Link generation runs in two steps: [`get_values`](Self::get_values) decides
/// which explicit, ambient and default values take part, and
/// [`bind_values`](Self::bind_values) writes them into the template. The
/// router evaluates constraints in between.
#[derive(Debug, Clone)]
pub struct TemplateBinder {
    template: RouteTemplate,
    defaults: RouteValues,
}

impl TemplateBinder {
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

    /// Select the values for a URL, or `None` when a required parameter has no value
    /// or an explicit value conflicts with a non-parameter default.
    #[must_use]
    pub fn get_values(
        &self,
        ambient: Option<&RouteValues>,
        values: &RouteValues,
    ) -> Option<TemplateValuesResult> {
        let mut accepted = RouteValues::new();

        // Ambient values are reused left to right until the first parameter
        // whose explicit value differs from the ambient one.
        for parameter in self.template.parameters() {
            let name = parameter.name.as_str();
            let explicit = values.get(name);
            let current = ambient.and_then(|a| a.get(name));

            if let (Some(explicit), Some(current)) = (explicit, current) {
                if !route_parts_equal(Some(current), Some(explicit)) {
                    break;
                }
            }

            match (explicit, current) {
                (Some(explicit), _) if !explicit.is_empty() => {
                    accepted.insert_if_absent(name, explicit);
                }
                (None, Some(current)) => {
                    accepted.insert_if_absent(name, current);
                }
                _ => {}
            }
        }

        for (key, value) in values.iter() {
            if !value.is_empty() {
                accepted.insert_if_absent(key, value);
            }
        }

        let required = || {
            self.template
                .parameters()
                .filter(|p| !p.is_optional && !p.is_catch_all)
        };
        for parameter in required() {
            if let Some(default) = self.defaults.get(&parameter.name) {
                accepted.insert_if_absent(&parameter.name, default);
            }
        }
        if required().any(|p| !accepted.contains_key(&p.name)) {
            return None;
        }

        for (key, default) in self.defaults.iter() {
            if self.template.parameter(key).is_some() {
                continue;
            }
            if let Some(explicit) = values.get(key) {
                if !route_parts_equal(Some(explicit), Some(default)) {
                    return None;
                }
            }
        }

        let mut combined_values = accepted.clone();
        if let Some(ambient) = ambient {
            for (key, value) in ambient.iter() {
                if !value.is_empty()
                    && self.template.parameter(key).is_none()
                    && !accepted.contains_key(key)
                {
                    combined_values.insert(key, value);
                }
            }
        }

        Some(TemplateValuesResult {
            accepted_values: accepted,
            combined_values,
        })
    }

    /// Write accepted values into the template.
    ///
    /// Returns the path without a leading `/`, followed by a query string for
    /// accepted values that are neither parameters nor defaults.
    #[must_use]
    pub fn bind_values(&self, accepted: &RouteValues) -> Option<String> {
        let mut remaining = accepted.clone();
        let mut context = UriBuildingContext::default();

        for segment in self.template.segments() {
            for (j, part) in segment.parts.iter().enumerate() {
                match part {
                    TemplatePart::Literal(literal) => {
                        if !context.accept(&literal.text) {
                            return None;
                        }
                    }
                    TemplatePart::Parameter(parameter) => {
                        let value = remaining.remove(&parameter.name);
                        let same_as_default = self
                            .defaults
                            .get(&parameter.name)
                            .is_some_and(|d| route_parts_equal(value.as_deref(), Some(d)));
                        let value = value.unwrap_or_default();
                        let encoded = encode_value(&value, !parameter.is_catch_all);

                        if same_as_default {
                            if !context.buffer(&encoded) {
                                return None;
                            }
                        } else if !context.accept(&encoded) {
                            let after_separator = j
                                .checked_sub(1)
                                .and_then(|i| segment.parts[i].as_literal())
                                .is_some_and(|l| l.is_optional_separator);
                            if parameter.is_optional && after_separator {
                                context.remove_last_value();
                            } else {
                                return None;
                            }
                        }
                    }
                }
            }
            context.end_segment();
        }

        for (key, value) in remaining.iter() {
            if self.defaults.contains_key(key) {
                continue;
            }
            context.append_query(key, value);
        }

        Some(context.finish())
    }
}

fn encode_value(value: &str, encode_slashes: bool) -> Cow<'_, str> {
    if encode_slashes || !value.contains('/') {
        return urlencoding::encode(value);
    }
    let parts: Vec<Cow<'_, str>> = value.split('/').map(urlencoding::encode).collect();
    Cow::Owned(parts.join("/"))
}

/// Incremental URL writer.
///
/// Values equal to their default are buffered and only written when something
/// follows them, so trailing defaults drop out of the URL.
#[derive(Debug, Default)]
struct UriBuildingContext {
    uri: String,
    query: String,
    buffer: Vec<String>,
    uri_inside: bool,
    buffer_inside: bool,
    has_empty_segment: bool,
    last_value_offset: Option<usize>,
}

impl UriBuildingContext {
    fn accept(&mut self, text: &str) -> bool {
        if text.is_empty() {
            if self.uri_inside || self.buffer_inside {
                // An empty part cannot sit inside a segment.
                return false;
            }
            self.has_empty_segment = true;
            return true;
        }
        if self.has_empty_segment {
            return false;
        }

        for buffered in self.buffer.drain(..) {
            self.uri.push_str(&buffered);
        }
        if !self.uri_inside && !self.buffer_inside && !self.uri.is_empty() {
            self.uri.push('/');
        }
        self.uri_inside = true;
        self.buffer_inside = true;

        self.last_value_offset = Some(self.uri.len());
        self.uri.push_str(text);
        true
    }

    fn buffer(&mut self, text: &str) -> bool {
        if text.is_empty() {
            if self.buffer_inside {
                return false;
            }
            self.has_empty_segment = true;
            return true;
        }
        if self.has_empty_segment {
            return false;
        }
        if self.uri_inside {
            // Part of this segment is already written.
            return self.accept(text);
        }

        if !self.buffer_inside {
            if !self.uri.is_empty() || !self.buffer.is_empty() {
                self.buffer.push("/".to_string());
            }
            self.buffer_inside = true;
        }
        self.buffer.push(text.to_string());
        true
    }

    /// Drop the text written by the last accepted value (an optional separator)
    fn remove_last_value(&mut self) {
        if let Some(offset) = self.last_value_offset.take() {
            self.uri.truncate(offset);
        }
    }

    fn end_segment(&mut self) {
        self.uri_inside = false;
        self.buffer_inside = false;
    }

    fn append_query(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.query.push(if self.query.is_empty() { '?' } else { '&' });
        self.query.push_str(&urlencoding::encode(key));
        self.query.push('=');
        self.query.push_str(&urlencoding::encode(value));
    }

    fn finish(mut self) -> String {
        self.uri.push_str(&self.query);
        self.uri
    }
}
