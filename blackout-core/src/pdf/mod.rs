// blackout-core/src/pdf/mod.rs
//! Document-level redaction pipeline.
//!
//! `DocumentRedactor` ties a `DetectionEngine` to the PDF layer: it
//! validates the input bytes, scans every page's positioned text, converts
//! detections into page regions, destructively rewrites the affected pages,
//! and returns the redacted bytes together with a full report.
//!
//! License: MIT OR APACHE 2.0

pub mod apply;
pub mod content;

use anyhow::Result as AnyResult;
use chrono::Utc;
use log::{debug, info, warn};
use lopdf::{Document, ObjectId};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::engine::DetectionEngine;
use crate::errors::BlackoutError;
use crate::report::{
    summarize, ProcessingResult, RedactionBlock, SkippedPage,
};

use self::content::{extract_spans, page_content, Rect};

/// A detection bound to a page region, prior to the apply phase.
#[derive(Debug)]
struct BlockCandidate {
    page_number: u32,
    rect: Rect,
    category: crate::config::SensitiveCategory,
    confidence: f64,
    text: String,
}

/// Runs the full detect-and-destroy pipeline over in-memory PDF bytes.
pub struct DocumentRedactor {
    engine: Box<dyn DetectionEngine>,
}

impl DocumentRedactor {
    pub fn new(engine: Box<dyn DetectionEngine>) -> Self {
        Self { engine }
    }

    /// Processes a document: validate, scan, apply, serialize, summarize.
    ///
    /// Unreadable pages are skipped and reported rather than failing the
    /// whole document; a page whose rewrite fails leaves its blocks marked
    /// `applied: false`. Structural problems with the document itself are
    /// reported as `Validation` errors.
    pub fn process(
        &self,
        document_bytes: &[u8],
        document_id: &str,
    ) -> Result<ProcessingResult, BlackoutError> {
        let started = Instant::now();
        info!("Processing document '{}' ({} bytes).", document_id, document_bytes.len());

        validate_header(document_bytes)?;

        let mut doc = Document::load_mem(document_bytes)
            .map_err(|e| classify_open_failure(&e.to_string()))?;

        if doc.trailer.has(b"Encrypt") {
            return Err(BlackoutError::validation(
                "Password-protected PDF files are not supported",
            ));
        }

        let page_ids: Vec<ObjectId> = doc.page_iter().collect();
        if page_ids.is_empty() {
            return Err(BlackoutError::validation(
                "PDF file contains no pages or is empty",
            ));
        }
        let total_pages = page_ids.len();
        debug!("Document '{}' has {} page(s).", document_id, total_pages);

        // Scan phase.
        let mut candidates: Vec<BlockCandidate> = Vec::new();
        let mut skipped_pages: Vec<SkippedPage> = Vec::new();

        for (index, page_id) in page_ids.iter().enumerate() {
            let page_number = index as u32 + 1;
            match self.scan_page(&doc, *page_id, page_number) {
                Ok(mut page_candidates) => candidates.append(&mut page_candidates),
                Err(e) => {
                    warn!(
                        "Skipping unreadable page {} of '{}': {:#}",
                        page_number, document_id, e
                    );
                    skipped_pages.push(SkippedPage {
                        page_number,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        // Apply phase: group regions by page and rewrite each page once.
        let mut regions_by_page: BTreeMap<u32, Vec<Rect>> = BTreeMap::new();
        for candidate in &candidates {
            regions_by_page
                .entry(candidate.page_number)
                .or_default()
                .push(candidate.rect);
        }

        let mut failed_pages: BTreeSet<u32> = BTreeSet::new();
        for (&page_number, regions) in &regions_by_page {
            let page_id = page_ids[(page_number - 1) as usize];
            if let Err(e) = apply_page(&mut doc, page_id, regions) {
                warn!(
                    "Failed to rewrite page {} of '{}': {:#}",
                    page_number, document_id, e
                );
                failed_pages.insert(page_number);
            }
        }

        let mut redacted_bytes = Vec::new();
        doc.save_to(&mut redacted_bytes)
            .map_err(|e| BlackoutError::processing(format!("failed to serialize document: {}", e)))?;

        let blocks: Vec<RedactionBlock> = candidates
            .into_iter()
            .map(|c| RedactionBlock {
                page_number: c.page_number,
                x: c.rect.x,
                y: c.rect.y,
                width: c.rect.width,
                height: c.rect.height,
                category: c.category,
                confidence: c.confidence,
                original_text: c.text,
                applied: !failed_pages.contains(&c.page_number),
            })
            .collect();

        let summary = summarize(&blocks);
        let processing_time_seconds = started.elapsed().as_secs_f64();
        info!(
            "Finished '{}': {} redaction(s) across {} page(s) in {:.3}s.",
            document_id,
            summary.total_redactions,
            summary.pages_affected,
            processing_time_seconds
        );

        Ok(ProcessingResult {
            document_id: document_id.to_string(),
            total_pages,
            blocks,
            summary,
            skipped_pages,
            processing_time_seconds,
            created_at: Utc::now(),
            redacted_bytes,
        })
    }

    /// Scans one page, converting detections into positioned candidates.
    fn scan_page(
        &self,
        doc: &Document,
        page_id: ObjectId,
        page_number: u32,
    ) -> AnyResult<Vec<BlockCandidate>> {
        let data = page_content(doc, page_id)?;
        let spans = extract_spans(&data)?;
        let mut candidates = Vec::new();

        for span in &spans {
            if span.text.trim().is_empty() {
                continue;
            }
            // One block per match, carrying the whole fragment's bounding
            // box. Fragments are never split or merged.
            for detection in self.engine.detect(&span.text) {
                candidates.push(BlockCandidate {
                    page_number,
                    rect: span.rect,
                    category: detection.category,
                    confidence: detection.confidence,
                    text: detection.text,
                });
            }
        }

        debug!("Page {}: {} candidate region(s).", page_number, candidates.len());
        Ok(candidates)
    }
}

/// Rewrites one page's content stream with the destructive pass.
fn apply_page(doc: &mut Document, page_id: ObjectId, regions: &[Rect]) -> AnyResult<()> {
    let data = page_content(doc, page_id)?;
    let rewritten = apply::redact_page_content(&data, regions)?;
    doc.change_page_content(page_id, rewritten)?;
    Ok(())
}

/// Checks the magic bytes and version token of a PDF header.
///
/// The version token (e.g. `1.4`) must appear within the first 20 bytes;
/// anything from 1.0 through 2.0 is accepted.
fn validate_header(bytes: &[u8]) -> Result<(), BlackoutError> {
    const HEADER_WINDOW: usize = 20;
    const INVALID: &str = "Invalid PDF file: corrupted or unsupported file format";

    if bytes.len() < 4 || !bytes.starts_with(b"%PDF") {
        return Err(BlackoutError::validation(INVALID));
    }

    let window = &bytes[..bytes.len().min(HEADER_WINDOW)];
    let header = String::from_utf8_lossy(window);
    let supported = [
        "1.0", "1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "2.0",
    ];
    if !supported.iter().any(|v| header.contains(v)) {
        return Err(BlackoutError::validation(INVALID));
    }

    Ok(())
}

/// Maps a document-open failure onto a user-actionable validation error.
fn classify_open_failure(message: &str) -> BlackoutError {
    let lowered = message.to_lowercase();
    if lowered.contains("password") || lowered.contains("encrypt") {
        BlackoutError::validation("Password-protected PDF files are not supported")
    } else if lowered.contains("corrupt") || lowered.contains("damaged") {
        BlackoutError::validation("PDF file appears to be corrupted or damaged")
    } else {
        BlackoutError::validation(format!("Unable to open PDF file: {}", message))
    }
}
