//! Content-keyword fallback used when a file's extension is not registered.
use super::categories::Category;

const COBOL_MARKERS: &[&str] = &[
    "IDENTIFICATION DIVISION",
    "PROGRAM-ID",
    "DATA DIVISION",
    "PROCEDURE DIVISION",
    "WORKING-STORAGE",
];

const JCL_MARKERS: &[&str] = &["//", "JOB ", "EXEC PGM=", "DD DSN="];

const COPYBOOK_MARKERS: &[&str] = &["01 ", "05 ", "PIC ", "PICTURE"];

const BMS_MARKERS: &[&str] = &["DFHMSD", "DFHMDI", "DFHMDF"];

fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

/// Rules are checked in a fixed order; the first hit wins.
pub fn classify_by_content(content: &str) -> Option<Category> {
    if content.is_empty() {
        return None;
    }

    let upper = content.to_uppercase();

    if contains_any(&upper, COBOL_MARKERS) {
        return Some(Category::CobolCode);
    }

    if contains_any(&upper, JCL_MARKERS) {
        return Some(Category::Jcl);
    }

    // Data layouts without a procedure division
    if contains_any(&upper, COPYBOOK_MARKERS) && !upper.contains("PROCEDURE DIVISION") {
        return Some(Category::Copybooks);
    }

    if contains_any(&upper, BMS_MARKERS) {
        return Some(Category::BmsMaps);
    }

    None
}
