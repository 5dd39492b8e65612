// blackout-core/src/pdf/apply.rs
//! Destructive redaction of page content streams.
//!
//! Rewrites a content stream so that every glyph falling inside a target
//! rectangle is replaced with a space, then appends opaque black rectangles
//! over the target regions. Replacing glyphs with spaces keeps the text flow
//! stable (later glyphs do not shift) while guaranteeing the original text
//! cannot be copied or extracted from the output.
//!
//! The glyph walk here must stay in lockstep with the extraction walk in
//! `content`: both use the same matrix tracking and the same width estimate,
//! so a region computed from an extracted span covers exactly the glyphs
//! that produced it.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::Object;

use super::content::{estimate_char_width, estimate_text_width, Rect, TextState};
use crate::report::redact_sensitive;

/// Whether a glyph's bounding box falls inside any target region.
fn char_in_region(char_x: f32, char_y: f32, char_width: f32, font_size: f32, regions: &[Rect]) -> bool {
    let char_height = font_size.abs().max(12.0);
    regions
        .iter()
        .any(|r| r.intersects(char_x, char_y, char_width, char_height))
}

/// Replaces every glyph byte inside a target region with a space.
///
/// Returns the rewritten bytes and whether anything changed.
fn redact_text_chars(
    text: &[u8],
    start_x: f32,
    start_y: f32,
    font_size: f32,
    regions: &[Rect],
) -> (Vec<u8>, bool) {
    let mut result = Vec::with_capacity(text.len());
    let mut current_x = start_x;
    let mut any_redacted = false;

    for &byte in text.iter() {
        let char_width = estimate_char_width(byte, font_size);

        if char_in_region(current_x, start_y, char_width, font_size, regions) {
            result.push(b' ');
            any_redacted = true;
        } else {
            result.push(byte);
        }

        current_x += char_width;
    }

    (result, any_redacted)
}

/// Rewrites a content stream, destroying text inside the given regions and
/// overlaying them with filled black rectangles.
pub fn redact_page_content(content_data: &[u8], regions: &[Rect]) -> Result<Vec<u8>> {
    let content = Content::decode(content_data).context("Failed to decode content stream")?;
    let mut new_operations: Vec<Operation> = Vec::new();
    let mut state = TextState::new();

    for op in content.operations {
        let operator = op.operator.as_str();
        state.apply_operator(operator, &op.operands);

        if !state.in_text_object {
            new_operations.push(op);
            continue;
        }

        match operator {
            "Tj" | "'" => {
                let (user_x, user_y) = state.text_origin();
                if let Some(Object::String(bytes, fmt)) = op.operands.first() {
                    let (redacted, changed) =
                        redact_text_chars(bytes, user_x, user_y, state.font_size, regions);
                    if changed {
                        log_rewrite(operator, bytes);
                        new_operations.push(Operation::new(
                            operator,
                            vec![Object::String(redacted, *fmt)],
                        ));
                        continue;
                    }
                }
                new_operations.push(op);
            }
            "\"" if op.operands.len() >= 3 => {
                let (user_x, user_y) = state.text_origin();
                if let Object::String(bytes, fmt) = &op.operands[2] {
                    let (redacted, changed) =
                        redact_text_chars(bytes, user_x, user_y, state.font_size, regions);
                    if changed {
                        log_rewrite(operator, bytes);
                        let mut new_operands = op.operands.clone();
                        new_operands[2] = Object::String(redacted, *fmt);
                        new_operations.push(Operation::new(operator, new_operands));
                        continue;
                    }
                }
                new_operations.push(op);
            }
            "TJ" => {
                let (start_x, user_y) = state.text_origin();
                let mut current_x = start_x;
                let mut new_array: Vec<Object> = Vec::new();
                let mut any_redacted = false;

                if let Some(Object::Array(arr)) = op.operands.first() {
                    for item in arr {
                        match item {
                            Object::String(bytes, fmt) => {
                                let (redacted, changed) = redact_text_chars(
                                    bytes,
                                    current_x,
                                    user_y,
                                    state.font_size,
                                    regions,
                                );
                                if changed {
                                    any_redacted = true;
                                    log_rewrite(operator, bytes);
                                }
                                current_x += estimate_text_width(bytes, state.font_size);
                                new_array.push(Object::String(redacted, *fmt));
                            }
                            Object::Integer(n) => {
                                current_x -= (*n as f32) / 1000.0 * state.font_size;
                                new_array.push(item.clone());
                            }
                            Object::Real(n) => {
                                current_x -= n / 1000.0 * state.font_size;
                                new_array.push(item.clone());
                            }
                            _ => new_array.push(item.clone()),
                        }
                    }
                }

                if any_redacted {
                    new_operations.push(Operation::new("TJ", vec![Object::Array(new_array)]));
                } else {
                    new_operations.push(op);
                }
            }
            _ => new_operations.push(op),
        }
    }

    append_overlay(&mut new_operations, regions);

    let new_content = Content { operations: new_operations };
    new_content.encode().context("Failed to encode rewritten content stream")
}

fn log_rewrite(operator: &str, original: &[u8]) {
    log::debug!(
        "Blanked glyphs in {} run: {}",
        operator,
        redact_sensitive(&String::from_utf8_lossy(original))
    );
}

/// Appends opaque black rectangles over the target regions, inside a saved
/// graphics state so later content is unaffected.
fn append_overlay(operations: &mut Vec<Operation>, regions: &[Rect]) {
    if regions.is_empty() {
        return;
    }

    operations.push(Operation::new("q", vec![]));
    operations.push(Operation::new(
        "rg",
        vec![Object::Real(0.0), Object::Real(0.0), Object::Real(0.0)],
    ));
    // Stroke color too, for viewers that outline filled paths.
    operations.push(Operation::new(
        "RG",
        vec![Object::Real(0.0), Object::Real(0.0), Object::Real(0.0)],
    ));

    for rect in regions {
        operations.push(Operation::new(
            "re",
            vec![
                Object::Real(rect.x),
                Object::Real(rect.y),
                Object::Real(rect.width),
                Object::Real(rect.height),
            ],
        ));
        operations.push(Operation::new("f", vec![]));
    }

    operations.push(Operation::new("Q", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::content::extract_spans;

    fn content_with_text(x: f32, y: f32, size: f32, text: &str) -> Vec<u8> {
        let operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ];
        Content { operations }.encode().unwrap()
    }

    #[test]
    fn test_glyphs_in_region_become_spaces() {
        let data = content_with_text(72.0, 700.0, 12.0, "secret text");
        let spans = extract_spans(&data).unwrap();
        let region = spans[0].rect;

        let rewritten = redact_page_content(&data, &[region]).unwrap();
        let spans_after = extract_spans(&rewritten).unwrap();
        assert_eq!(spans_after[0].text.trim(), "");
    }

    #[test]
    fn test_glyphs_outside_region_survive() {
        let data = content_with_text(72.0, 700.0, 12.0, "hello world");
        let far_away = Rect { x: 400.0, y: 50.0, width: 30.0, height: 12.0 };

        let rewritten = redact_page_content(&data, &[far_away]).unwrap();
        let spans_after = extract_spans(&rewritten).unwrap();
        assert_eq!(spans_after[0].text, "hello world");
    }

    #[test]
    fn test_overlay_rectangles_appended() {
        let data = content_with_text(72.0, 700.0, 12.0, "x");
        let region = Rect { x: 72.0, y: 700.0, width: 10.0, height: 12.0 };

        let rewritten = redact_page_content(&data, &[region]).unwrap();
        let content = Content::decode(&rewritten).unwrap();
        let operators: Vec<&str> = content
            .operations
            .iter()
            .map(|op| op.operator.as_str())
            .collect();
        assert!(operators.contains(&"re"));
        assert!(operators.contains(&"f"));
    }

    #[test]
    fn test_no_regions_leaves_stream_untouched() {
        let data = content_with_text(72.0, 700.0, 12.0, "hello");
        let rewritten = redact_page_content(&data, &[]).unwrap();
        let before = Content::decode(&data).unwrap().operations.len();
        let after = Content::decode(&rewritten).unwrap().operations.len();
        assert_eq!(before, after);
    }
}
