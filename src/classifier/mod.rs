//! Upload classification into mainframe artifact categories.
//!
//! Extension lookup first, content heuristics second, `Unknown` last. The
//! classifier never fails: every input file lands in exactly one bucket.
pub mod categories;
pub mod heuristics;

use categories::{Category, ExtensionTable};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// One uploaded file as received from a client: either raw text or a
/// `{fileName, content}` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum UploadedFile {
    Text(String),
    Wrapped(FileWrapper),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileWrapper {
    /// Overrides the outer key when present
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<String> for UploadedFile {
    fn from(content: String) -> Self {
        UploadedFile::Text(content)
    }
}

impl From<&str> for UploadedFile {
    fn from(content: &str) -> Self {
        UploadedFile::Text(content.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedFile {
    pub file_name: String,
    pub content: String,
    /// Character count of `content`
    pub size: usize,
    /// Lowercase suffix including the dot, or empty
    pub extension: String,
    /// Number of `\n`-separated segments (at least 1)
    pub lines: usize,
    pub category: Category,
}

/// Category buckets. Every category key is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification {
    buckets: BTreeMap<Category, Vec<ClassifiedFile>>,
}

impl Classification {
    fn empty() -> Self {
        Self {
            buckets: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    pub fn get(&self, category: Category) -> &[ClassifiedFile] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[ClassifiedFile])> {
        self.buckets.iter().map(|(c, files)| (*c, files.as_slice()))
    }

    /// Total number of classified files across all buckets.
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn category_of(&self, file_name: &str) -> Option<Category> {
        self.buckets
            .values()
            .flatten()
            .find(|f| f.file_name == file_name)
            .map(|f| f.category)
    }

    /// `(name, content)` pairs the structural analyzer should see:
    /// COBOL code, then copybooks, then JCL.
    pub fn analysis_candidates(&self) -> Vec<(String, String)> {
        Category::ANALYZABLE
            .into_iter()
            .flat_map(|category| self.get(category).iter())
            .map(|f| (f.file_name.clone(), f.content.clone()))
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<Category, Vec<ClassifiedFile>> {
        self.buckets
    }
}

/// Flatten both accepted input shapes into ordered `(name, content)` pairs.
///
/// A name seen twice keeps its first position and takes the later content.
pub fn normalize<I, K>(files: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, UploadedFile)>,
    K: Into<String>,
{
    let mut normalized: Vec<(String, String)> = Vec::new();

    for (key, value) in files {
        let (name, content) = match value {
            UploadedFile::Text(content) => (key.into(), content),
            UploadedFile::Wrapped(wrapper) => (
                wrapper.file_name.unwrap_or_else(|| key.into()),
                wrapper.content.unwrap_or_default(),
            ),
        };

        match normalized.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = content,
            None => normalized.push((name, content)),
        }
    }

    normalized
}

/// Lowercase extension with its leading dot, or empty.
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: ExtensionTable,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            table: ExtensionTable::new(),
        }
    }

    /// Resolve the category of a single file.
    pub fn categorize(&self, file_name: &str, content: &str) -> Category {
        let ext = extension_of(file_name);
        self.table
            .get_by_extension(&ext)
            .or_else(|| heuristics::classify_by_content(content))
            .unwrap_or(Category::Unknown)
    }

    pub fn classify<I, K>(&self, files: I) -> Classification
    where
        I: IntoIterator<Item = (K, UploadedFile)>,
        K: Into<String>,
    {
        info!("=== FILE CLASSIFICATION STARTED ===");

        let normalized = normalize(files);
        info!("Number of files to classify: {}", normalized.len());

        let mut classification = Classification::empty();

        for (file_name, content) in normalized {
            let category = self.categorize(&file_name, &content);
            if category == Category::Unknown {
                info!("Could not classify '{file_name}' - marked as Unknown");
            } else {
                info!("Classified '{file_name}' as '{category}'");
            }

            let file = ClassifiedFile {
                size: content.chars().count(),
                extension: extension_of(&file_name),
                lines: content.split('\n').count(),
                file_name,
                content,
                category,
            };

            classification
                .buckets
                .entry(category)
                .or_default()
                .push(file);
        }

        for (category, files) in classification.iter() {
            if !files.is_empty() {
                info!("{category}: {} files", files.len());
            }
        }

        info!("=== FILE CLASSIFICATION COMPLETED ===");
        classification
    }
}

/// Classify with the default extension table.
pub fn classify_files<I, K>(files: I) -> Classification
where
    I: IntoIterator<Item = (K, UploadedFile)>,
    K: Into<String>,
{
    Classifier::new().classify(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(pairs: &[(&str, &str)]) -> Vec<(String, UploadedFile)> {
        pairs
            .iter()
            .map(|(n, c)| (n.to_string(), UploadedFile::from(*c)))
            .collect()
    }

    #[test]
    fn test_all_buckets_present() {
        let result = classify_files(Vec::<(String, UploadedFile)>::new());
        assert_eq!(result.total(), 0);
        let keys: Vec<Category> = result.iter().map(|(c, _)| c).collect();
        assert_eq!(keys, Category::ALL.to_vec());
    }

    #[test]
    fn test_extension_wins_over_content() {
        let result = classify_files(text(&[(
            "x.cpy",
            "       PROCEDURE DIVISION.\n           STOP RUN.",
        )]));
        assert_eq!(result.get(Category::Copybooks).len(), 1);
        assert!(result.get(Category::CobolCode).is_empty());
    }

    #[test]
    fn test_extension_case_insensitive() {
        let result = classify_files(text(&[("PAYROLL.CBL", "")]));
        let file = &result.get(Category::CobolCode)[0];
        assert_eq!(file.extension, ".cbl");
    }

    #[test]
    fn test_content_fallback() {
        let result = classify_files(text(&[
            ("prog", "IDENTIFICATION DIVISION.\nPROGRAM-ID. A."),
            ("job", "//STEP1 EXEC PGM=SORT"),
            ("layout", "01 REC.\n 05 F PIC X."),
            ("screen", "M DFHMDF POS=(1,1)"),
            ("notes", "nothing to see"),
        ]));
        assert_eq!(result.category_of("prog"), Some(Category::CobolCode));
        assert_eq!(result.category_of("job"), Some(Category::Jcl));
        assert_eq!(result.category_of("layout"), Some(Category::Copybooks));
        assert_eq!(result.category_of("screen"), Some(Category::BmsMaps));
        assert_eq!(result.category_of("notes"), Some(Category::Unknown));
    }

    #[test]
    fn test_size_and_lines() {
        let result = classify_files(text(&[("a.txt", "ab\ncd\n"), ("empty.md", "")]));
        let docs = result.get(Category::StandardsDocuments);
        let a = docs.iter().find(|f| f.file_name == "a.txt").unwrap();
        assert_eq!(a.size, 6);
        assert_eq!(a.lines, 3);
        let empty = docs.iter().find(|f| f.file_name == "empty.md").unwrap();
        assert_eq!(empty.size, 0);
        assert_eq!(empty.lines, 1);
    }

    #[test]
    fn test_size_counts_characters() {
        let result = classify_files(text(&[("é.txt", "héllo")]));
        assert_eq!(result.get(Category::StandardsDocuments)[0].size, 5);
    }

    #[test]
    fn test_wrapper_file_name_overrides_key() {
        let json = r#"{
            "upload-1": {"fileName": "CUSTMAST.cbl", "content": "PROGRAM-ID. CUSTMAST."},
            "RAW.jcl": "//JOB1 JOB"
        }"#;
        let input: BTreeMap<String, UploadedFile> = serde_json::from_str(json).unwrap();
        let result = classify_files(input);
        assert_eq!(result.category_of("CUSTMAST.cbl"), Some(Category::CobolCode));
        assert_eq!(result.category_of("upload-1"), None);
        assert_eq!(result.category_of("RAW.jcl"), Some(Category::Jcl));
    }

    #[test]
    fn test_wrapper_without_file_name_uses_key() {
        let normalized = normalize(vec![(
            "k.cpy",
            UploadedFile::Wrapped(FileWrapper {
                file_name: None,
                content: None,
            }),
        )]);
        assert_eq!(normalized, vec![("k.cpy".to_string(), String::new())]);
    }

    #[test]
    fn test_normalize_duplicate_keeps_first_position() {
        let normalized = normalize(vec![
            ("a", UploadedFile::from("1")),
            ("b", UploadedFile::from("2")),
            (
                "c",
                UploadedFile::Wrapped(FileWrapper {
                    file_name: Some("a".to_string()),
                    content: Some("3".to_string()),
                }),
            ),
        ]);
        assert_eq!(
            normalized,
            vec![
                ("a".to_string(), "3".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_analysis_candidates() {
        let result = classify_files(text(&[
            ("a.cpy", "01 A PIC X."),
            ("b.cbl", "PROGRAM-ID. B."),
            ("c.jcl", "//C JOB"),
            ("d.md", "# notes"),
            ("e.bms", "DFHMSD"),
        ]));
        let names: Vec<String> = result
            .analysis_candidates()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["b.cbl", "a.cpy", "c.jcl"]);
    }

    #[test]
    fn test_serialized_shape() {
        let result = classify_files(text(&[("b.cbl", "X")]));
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["Unknown"].as_array().unwrap().is_empty());
        let file = &value["COBOL Code"][0];
        assert_eq!(file["fileName"], "b.cbl");
        assert_eq!(file["extension"], ".cbl");
        assert_eq!(file["category"], "COBOL Code");
    }
}
