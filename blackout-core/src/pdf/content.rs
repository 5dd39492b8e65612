// blackout-core/src/pdf/content.rs
//! Content-stream parsing: positioned text extraction from PDF pages.
//!
//! Walks a page's content stream tracking the current transformation matrix
//! and the text matrices, and produces one positioned `TextSpan` per
//! text-showing operator. Glyph positions are estimated from the font size
//! rather than font metrics, which is accurate enough for region matching as
//! long as the destructive pass in `apply` uses the same estimate.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{anyhow, Context, Result};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId, Stream};

/// An axis-aligned rectangle in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Whether this rectangle overlaps the given glyph bounding box.
    pub fn intersects(&self, gx: f32, gy: f32, gw: f32, gh: f32) -> bool {
        self.x < gx + gw && gx < self.x + self.width && self.y < gy + gh && gy < self.y + self.height
    }
}

/// A run of text produced by one text-showing operator, with its estimated
/// position on the page.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// Decoded text of the run.
    pub text: String,
    /// Estimated bounding box; `y` is the text baseline.
    pub rect: Rect,
}

/// Extracts a numeric operand as f32.
pub fn operand_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Estimated advance width of a single glyph byte.
///
/// ASCII glyphs are assumed to be 0.55 em wide, everything else a full em.
pub fn estimate_char_width(byte: u8, font_size: f32) -> f32 {
    if byte < 128 {
        font_size * 0.55
    } else {
        font_size * 1.0
    }
}

/// Estimated advance width of a run of glyph bytes.
pub fn estimate_text_width(text: &[u8], font_size: f32) -> f32 {
    text.iter().map(|&b| estimate_char_width(b, font_size)).sum()
}

/// Decodes the raw bytes of a PDF string object into text.
///
/// CID fonts commonly store text as UTF-16BE; everything else is treated as
/// Latin-1. UTF-16BE is recognized by a byte-order mark or by an even-length
/// byte run whose high bytes are all zero.
pub fn decode_pdf_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes.len() % 2 == 0 {
        let has_bom = bytes[0] == 0xFE && bytes[1] == 0xFF;
        let looks_utf16 = has_bom || bytes.iter().step_by(2).all(|&b| b == 0);
        if looks_utf16 {
            let payload = if has_bom { &bytes[2..] } else { bytes };
            let units: Vec<u16> = payload
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect();
            if let Ok(decoded) = String::from_utf16(&units) {
                return decoded;
            }
        }
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Fetches a stream's content, falling back to the raw bytes when the
/// stream's filter is unsupported.
fn stream_content(stream: &Stream) -> Vec<u8> {
    match stream.decompressed_content() {
        Ok(data) => data,
        Err(_) => stream.content.clone(),
    }
}

/// Collects the full content-stream bytes for a page.
///
/// Handles the three legal shapes of the `Contents` entry: a single stream
/// reference, an array of stream references, and an inline stream.
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page = doc
        .get_object(page_id)
        .with_context(|| format!("Failed to resolve page object {:?}", page_id))?;

    let dict = page
        .as_dict()
        .map_err(|_| anyhow!("Page object {:?} is not a dictionary", page_id))?;

    let contents = dict
        .get(b"Contents")
        .map_err(|_| anyhow!("Page {:?} has no Contents entry", page_id))?;

    match contents {
        Object::Reference(ref_id) => {
            let stream = doc
                .get_object(*ref_id)
                .with_context(|| format!("Failed to resolve content stream {:?}", ref_id))?
                .as_stream()
                .map_err(|_| anyhow!("Contents reference {:?} is not a stream", ref_id))?;
            Ok(stream_content(stream))
        }
        Object::Array(arr) => {
            let mut all_content = Vec::new();
            for item in arr {
                if let Object::Reference(ref_id) = item {
                    let stream = doc
                        .get_object(*ref_id)
                        .with_context(|| format!("Failed to resolve content stream {:?}", ref_id))?
                        .as_stream()
                        .map_err(|_| anyhow!("Contents element {:?} is not a stream", ref_id))?;
                    all_content.extend(stream_content(stream));
                    all_content.push(b'\n');
                }
            }
            Ok(all_content)
        }
        Object::Stream(stream) => Ok(stream_content(stream)),
        _ => Err(anyhow!("Page {:?} has an unsupported Contents entry", page_id)),
    }
}

/// Tracks the matrices needed to place text while walking a content stream.
#[derive(Debug)]
pub(crate) struct TextState {
    pub graphics_stack: Vec<[f32; 6]>,
    pub ctm: [f32; 6],
    pub text_matrix: [f32; 6],
    pub line_matrix: [f32; 6],
    pub in_text_object: bool,
    pub font_size: f32,
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl TextState {
    pub fn new() -> Self {
        Self {
            graphics_stack: Vec::new(),
            ctm: IDENTITY,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            in_text_object: false,
            font_size: 12.0,
        }
    }

    /// Current text origin in user space.
    pub fn text_origin(&self) -> (f32, f32) {
        let x = self.ctm[0] * self.text_matrix[4] + self.ctm[2] * self.text_matrix[5] + self.ctm[4];
        let y = self.ctm[1] * self.text_matrix[4] + self.ctm[3] * self.text_matrix[5] + self.ctm[5];
        (x, y)
    }

    /// Applies one state-affecting operator. Returns true when the operator
    /// was consumed as a state change (it should still be kept in rewritten
    /// streams; this only signals that no text was shown).
    pub fn apply_operator(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "q" => self.graphics_stack.push(self.ctm),
            "Q" => {
                if let Some(saved) = self.graphics_stack.pop() {
                    self.ctm = saved;
                }
            }
            "cm" if operands.len() >= 6 => {
                if let (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) = (
                    operand_number(&operands[0]),
                    operand_number(&operands[1]),
                    operand_number(&operands[2]),
                    operand_number(&operands[3]),
                    operand_number(&operands[4]),
                    operand_number(&operands[5]),
                ) {
                    let m = self.ctm;
                    self.ctm = [
                        m[0] * a + m[2] * b,
                        m[1] * a + m[3] * b,
                        m[0] * c + m[2] * d,
                        m[1] * c + m[3] * d,
                        m[0] * e + m[2] * f + m[4],
                        m[1] * e + m[3] * f + m[5],
                    ];
                }
            }
            "BT" => {
                self.in_text_object = true;
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "ET" => self.in_text_object = false,
            "Tm" if self.in_text_object && operands.len() >= 6 => {
                if let (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) = (
                    operand_number(&operands[0]),
                    operand_number(&operands[1]),
                    operand_number(&operands[2]),
                    operand_number(&operands[3]),
                    operand_number(&operands[4]),
                    operand_number(&operands[5]),
                ) {
                    self.text_matrix = [a, b, c, d, e, f];
                    self.line_matrix = self.text_matrix;
                }
            }
            "Td" | "TD" if self.in_text_object && operands.len() >= 2 => {
                if let (Some(tx), Some(ty)) =
                    (operand_number(&operands[0]), operand_number(&operands[1]))
                {
                    self.line_matrix[4] += tx;
                    self.line_matrix[5] += ty;
                    self.text_matrix = self.line_matrix;
                }
            }
            "Tf" if operands.len() >= 2 => {
                if let Some(size) = operand_number(&operands[1]) {
                    self.font_size = size.abs();
                }
            }
            _ => {}
        }
    }
}

/// Extracts all positioned text runs from a content stream.
pub fn extract_spans(content_data: &[u8]) -> Result<Vec<TextSpan>> {
    let content = Content::decode(content_data).context("Failed to decode content stream")?;
    let mut state = TextState::new();
    let mut spans: Vec<TextSpan> = Vec::new();

    for op in &content.operations {
        let operator = op.operator.as_str();
        state.apply_operator(operator, &op.operands);

        if !state.in_text_object {
            continue;
        }

        match operator {
            "Tj" | "'" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push_span(&mut spans, &state, bytes);
                }
            }
            "\"" if op.operands.len() >= 3 => {
                if let Object::String(bytes, _) = &op.operands[2] {
                    push_span(&mut spans, &state, bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(arr)) = op.operands.first() {
                    push_array_span(&mut spans, &state, arr);
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn push_span(spans: &mut Vec<TextSpan>, state: &TextState, bytes: &[u8]) {
    let (x, y) = state.text_origin();
    spans.push(TextSpan {
        text: decode_pdf_text(bytes),
        rect: Rect {
            x,
            y,
            width: estimate_text_width(bytes, state.font_size),
            height: state.font_size,
        },
    });
}

/// Collapses a TJ array into a single span, applying kerning adjustments to
/// the running x position so the estimated width tracks the adjustments.
fn push_array_span(spans: &mut Vec<TextSpan>, state: &TextState, arr: &[Object]) {
    let (start_x, y) = state.text_origin();
    let mut current_x = start_x;
    let mut text = String::new();

    for item in arr {
        match item {
            Object::String(bytes, _) => {
                text.push_str(&decode_pdf_text(bytes));
                current_x += estimate_text_width(bytes, state.font_size);
            }
            Object::Integer(n) => {
                current_x -= (*n as f32) / 1000.0 * state.font_size;
            }
            Object::Real(n) => {
                current_x -= n / 1000.0 * state.font_size;
            }
            _ => {}
        }
    }

    spans.push(TextSpan {
        text,
        rect: Rect {
            x: start_x,
            y,
            width: (current_x - start_x).max(0.0),
            height: state.font_size,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;

    fn encode(operations: Vec<Operation>) -> Vec<u8> {
        Content { operations }.encode().unwrap()
    }

    fn text_ops(x: f32, y: f32, size: f32, text: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_extracts_positioned_span() {
        let data = encode(text_ops(72.0, 700.0, 12.0, "hello"));
        let spans = extract_spans(&data).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "hello");
        assert!((spans[0].rect.x - 72.0).abs() < 0.01);
        assert!((spans[0].rect.y - 700.0).abs() < 0.01);
        assert!((spans[0].rect.width - 5.0 * 12.0 * 0.55).abs() < 0.01);
    }

    #[test]
    fn test_tj_array_concatenates() {
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.0f32.into()]),
            Operation::new("Td", vec![100.0f32.into(), 500.0f32.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("foo"),
                    Object::Integer(-250),
                    Object::string_literal("bar"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];
        let spans = extract_spans(&encode(ops)).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "foobar");
        // Six glyphs at 5.5pt plus the 2.5pt kerning adjustment.
        assert!((spans[0].rect.width - (6.0 * 5.5 + 2.5)).abs() < 0.01);
    }

    #[test]
    fn test_text_outside_bt_et_ignored() {
        let ops = vec![Operation::new("Tj", vec![Object::string_literal("stray")])];
        let spans = extract_spans(&encode(ops)).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_decode_utf16be_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, b'h', 0x00, b'i'];
        assert_eq!(decode_pdf_text(&bytes), "hi");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        assert_eq!(decode_pdf_text(b"plain"), "plain");
    }

    #[test]
    fn test_rect_intersects() {
        let r = Rect { x: 10.0, y: 10.0, width: 20.0, height: 10.0 };
        assert!(r.intersects(15.0, 12.0, 5.0, 5.0));
        assert!(!r.intersects(100.0, 100.0, 5.0, 5.0));
    }
}
