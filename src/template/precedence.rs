//! Template precedence.
//!
//! Precedence is a decimal number built from one digit per segment; digit `i`
//! contributes `digit / 10^i`. Literal segments are the most specific and
//! catch-alls the least specific.
//!
//! The two directions use opposite polarities:
//!
//! | Segment | Inbound | Outbound |
//! |---------|---------|----------|
//! | literal | 1 | 5 |
//! | complex | 2 | 4 |
//! | constrained parameter | 2 | 4 |
//! | parameter | 3 | 3 |
//! | constrained catch-all | 4 | 2 |
//! | catch-all | 5 | 1 |
//!
//! Inbound candidates are tried in ascending precedence, outbound candidates in
//! descending precedence, so a more specific template always wins.

use super::types::{RouteTemplate, TemplatePart, TemplateSegment};

/// Inbound precedence; lower means more specific
#[must_use]
pub fn compute_inbound(template: &RouteTemplate) -> f64 {
    compute(template, inbound_digit)
}

/// Outbound precedence; higher means more specific
#[must_use]
pub fn compute_outbound(template: &RouteTemplate) -> f64 {
    compute(template, outbound_digit)
}

fn compute(template: &RouteTemplate, digit: fn(&TemplateSegment) -> u8) -> f64 {
    let mut precedence = 0.0;
    let mut scale = 1.0;
    for segment in template.segments() {
        precedence += f64::from(digit(segment)) / scale;
        scale *= 10.0;
    }
    precedence
}

fn inbound_digit(segment: &TemplateSegment) -> u8 {
    match segment.simple_part() {
        None => 2,
        Some(TemplatePart::Literal(_)) => 1,
        Some(TemplatePart::Parameter(p)) => match (p.is_catch_all, p.has_constraints()) {
            (false, true) => 2,
            (false, false) => 3,
            (true, true) => 4,
            (true, false) => 5,
        },
    }
}

fn outbound_digit(segment: &TemplateSegment) -> u8 {
    match segment.simple_part() {
        None => 4,
        Some(TemplatePart::Literal(_)) => 5,
        Some(TemplatePart::Parameter(p)) => match (p.is_catch_all, p.has_constraints()) {
            (false, true) => 4,
            (false, false) => 3,
            (true, true) => 2,
            (true, false) => 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(text: &str) -> f64 {
        compute_inbound(&RouteTemplate::parse(text).unwrap())
    }

    fn outbound(text: &str) -> f64 {
        compute_outbound(&RouteTemplate::parse(text).unwrap())
    }

    #[test]
    fn test_inbound_literal_beats_parameter() {
        assert!(inbound("a/b") < inbound("a/{b}"));
        assert!(inbound("a/{b:int}") < inbound("a/{b}"));
        assert!(inbound("a/{b}") < inbound("a/{*b:int}"));
        assert!(inbound("a/{*b:int}") < inbound("a/{*b}"));
        assert!(inbound("a/{b}.{c}") < inbound("a/{b}"));
    }

    #[test]
    fn test_outbound_literal_beats_parameter() {
        assert!(outbound("a/b") > outbound("a/{b}"));
        assert!(outbound("a/{b:int}") > outbound("a/{b}"));
        assert!(outbound("a/{b}") > outbound("a/{*b:int}"));
        assert!(outbound("a/{*b:int}") > outbound("a/{*b}"));
    }

    #[test]
    fn test_digit_weights() {
        assert_eq!(inbound(""), 0.0);
        assert!((inbound("a/{b}") - 1.3).abs() < 1e-9);
        assert!((outbound("a/{b}") - 5.3).abs() < 1e-9);
    }

    #[test]
    fn test_earlier_segments_dominate() {
        assert!(inbound("a/{b}/{*c}") < inbound("{a}/b/c"));
        assert!(outbound("a/{b}/{*c}") > outbound("{a}/b/c"));
    }
}
