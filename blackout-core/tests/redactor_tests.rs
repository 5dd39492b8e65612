// blackout-core/tests/redactor_tests.rs
//! End-to-end tests for the document redaction pipeline, driven by PDFs
//! built in memory.

use blackout_core::{redact_document_bytes, DetectionConfig, SensitiveCategory};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;

/// Builds a simple PDF with one text line per page.
fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn default_config() -> DetectionConfig {
    DetectionConfig::load_default_rules().unwrap()
}

#[test_log::test]
fn redacts_email_and_reports_block() {
    let input = build_pdf(&["Contact john.doe@example.com for details"]);
    let result = redact_document_bytes(default_config(), &input, "doc-1").unwrap();

    assert_eq!(result.document_id, "doc-1");
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.blocks.len(), 1);

    let block = &result.blocks[0];
    assert_eq!(block.page_number, 1);
    assert_eq!(block.category, SensitiveCategory::Email);
    assert_eq!(block.original_text, "john.doe@example.com");
    assert!(block.applied);
    assert!(block.width > 0.0);

    assert_eq!(result.summary.total_redactions, 1);
    assert_eq!(result.summary.pages_affected, 1);
    assert!(result.skipped_pages.is_empty());
    assert!(result.processing_time_seconds >= 0.0);
}

#[test_log::test]
fn block_geometry_covers_whole_fragment() {
    // The match sits mid-fragment, but the reported block must carry the
    // whole fragment's bounding box, not a sub-rectangle around the match.
    let text = "Contact john.doe@example.com for details";
    let input = build_pdf(&[text]);
    let result = redact_document_bytes(default_config(), &input, "doc-1b").unwrap();

    assert_eq!(result.blocks.len(), 1);
    let block = &result.blocks[0];
    let expected_width = text.len() as f32 * 12.0 * 0.55;
    assert!((block.x - 72.0).abs() < 0.01);
    assert!((block.y - 720.0).abs() < 0.01);
    assert!((block.width - expected_width).abs() < 0.01);
    assert!((block.height - 12.0).abs() < 0.01);
}

#[test_log::test]
fn redacted_output_no_longer_matches() {
    let input = build_pdf(&["SSN 123-45-6789 on file"]);
    let first = redact_document_bytes(default_config(), &input, "doc-2").unwrap();
    assert_eq!(first.blocks.len(), 1);

    // The output must carry no recoverable trace of the original text.
    let second = redact_document_bytes(default_config(), &first.redacted_bytes, "doc-2-again").unwrap();
    assert!(second.blocks.is_empty());
}

#[test_log::test]
fn confidence_stats_across_pages() {
    // An email (0.95), an SSN (0.90), and a Luhn-invalid card (0.85, no
    // boost). The dashed form keeps the digit runs short enough that no
    // other rule fires.
    let input = build_pdf(&[
        "mail me at a@b.com",
        "ssn is 123-45-6789",
        "card 4111-1111-1111-1112 here",
    ]);
    let result = redact_document_bytes(default_config(), &input, "doc-3").unwrap();

    assert_eq!(result.total_pages, 3);
    assert_eq!(result.blocks.len(), 3);
    assert_eq!(result.summary.pages_affected, 3);
    assert_eq!(
        result.summary.redactions_by_reason[&SensitiveCategory::CreditCard],
        1
    );

    let stats = result.summary.confidence_scores.as_ref().unwrap();
    assert!((stats.minimum - 0.85).abs() < 1e-9);
    assert!((stats.maximum - 0.95).abs() < 1e-9);
    assert!((stats.average - (0.95 + 0.90 + 0.85) / 3.0).abs() < 1e-9);
}

#[test_log::test]
fn luhn_valid_card_gets_boosted_confidence() {
    let input = build_pdf(&["card 4111-1111-1111-1111 here"]);
    let result = redact_document_bytes(default_config(), &input, "doc-4").unwrap();

    assert_eq!(result.blocks.len(), 1);
    assert!((result.blocks[0].confidence - 0.95).abs() < 1e-9);
}

#[test_log::test]
fn clean_document_yields_empty_summary() {
    let input = build_pdf(&["nothing sensitive on this page"]);
    let result = redact_document_bytes(default_config(), &input, "doc-5").unwrap();

    assert!(result.blocks.is_empty());
    assert_eq!(result.summary.total_redactions, 0);
    assert!(result.summary.confidence_scores.is_none());
}

#[test_log::test]
fn rejects_non_pdf_bytes() {
    let err = redact_document_bytes(default_config(), b"just some text", "doc-6").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "Invalid PDF file: corrupted or unsupported file format"
    );
}

#[test_log::test]
fn rejects_truncated_header() {
    let err = redact_document_bytes(default_config(), b"%P", "doc-7").unwrap_err();
    assert!(err.is_validation());
}

#[test_log::test]
fn rejects_document_without_pages() {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();

    let err = redact_document_bytes(default_config(), &bytes, "doc-8").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "PDF file contains no pages or is empty");
}

#[test_log::test]
fn unreadable_page_is_skipped_not_fatal() {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    // Page 1 points at a content stream that does not exist.
    let broken_page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => Object::Reference((9999, 0)),
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => resources_id,
    });

    // Page 2 is a normal page with a detectable email.
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal("reach me: a@b.com")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let good_page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => resources_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![broken_page_id.into(), good_page_id.into()],
            "Count" => 2,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();

    let result = redact_document_bytes(default_config(), &bytes, "doc-9").unwrap();
    assert_eq!(result.total_pages, 2);
    assert_eq!(result.skipped_pages.len(), 1);
    assert_eq!(result.skipped_pages[0].page_number, 1);
    assert_eq!(result.blocks.len(), 1);
    assert_eq!(result.blocks[0].page_number, 2);
}

#[test_log::test]
fn custom_rules_from_file_override_defaults() {
    let yaml = r#"
rules:
  - name: badge_id
    description: "Internal badge identifiers."
    category: custom
    pattern: 'BADGE-\d{4}'
    base_confidence: 0.80
"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let user_config = DetectionConfig::load_from_file(file.path()).unwrap();
    let merged = blackout_core::merge_rules(default_config(), Some(user_config));
    assert_eq!(merged.rules.len(), 7);

    let input = build_pdf(&["badge BADGE-1234 issued"]);
    let result = redact_document_bytes(merged, &input, "doc-10").unwrap();
    assert_eq!(result.blocks.len(), 1);
    assert_eq!(result.blocks[0].category, SensitiveCategory::Custom);
    assert_eq!(result.blocks[0].original_text, "BADGE-1234");
}

#[test_log::test]
fn serialized_result_omits_document_bytes() {
    let input = build_pdf(&["a@b.com"]);
    let result = redact_document_bytes(default_config(), &input, "doc-11").unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("redacted_bytes").is_none());
    assert_eq!(json["document_id"], "doc-11");
    assert_eq!(json["summary"]["total_redactions"], 1);
}
