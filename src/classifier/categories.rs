use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mainframe artifact categories.
///
/// Variant order is the bucket order of a [`Classification`](super::Classification).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Category {
    #[serde(rename = "COBOL Code")]
    CobolCode,
    #[serde(rename = "JCL")]
    Jcl,
    #[serde(rename = "Copybooks")]
    Copybooks,
    #[serde(rename = "VSAM Definitions")]
    VsamDefinitions,
    #[serde(rename = "BMS Maps")]
    BmsMaps,
    #[serde(rename = "Control Files")]
    ControlFiles,
    #[serde(rename = "Standards Documents")]
    StandardsDocuments,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::CobolCode,
        Category::Jcl,
        Category::Copybooks,
        Category::VsamDefinitions,
        Category::BmsMaps,
        Category::ControlFiles,
        Category::StandardsDocuments,
        Category::Unknown,
    ];

    /// Categories fed to the structural analyzer, in hand-off order.
    pub const ANALYZABLE: [Category; 3] =
        [Category::CobolCode, Category::Copybooks, Category::Jcl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CobolCode => "COBOL Code",
            Category::Jcl => "JCL",
            Category::Copybooks => "Copybooks",
            Category::VsamDefinitions => "VSAM Definitions",
            Category::BmsMaps => "BMS Maps",
            Category::ControlFiles => "Control Files",
            Category::StandardsDocuments => "Standards Documents",
            Category::Unknown => "Unknown",
        }
    }

}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct CategoryConfig {
    pub category: Category,
    pub extensions: &'static [&'static str],
}

impl CategoryConfig {
    /// Registration order matters: `.ctl` and `.cntl` are claimed by JCL before
    /// VSAM Definitions and Control Files list them again.
    pub fn get_all() -> Vec<CategoryConfig> {
        vec![
            CategoryConfig {
                category: Category::CobolCode,
                extensions: &[".cob", ".cbl", ".cobol", ".pco", ".ccp"],
            },
            CategoryConfig {
                category: Category::Jcl,
                extensions: &[".jcl", ".job", ".cntl", ".ctl"],
            },
            CategoryConfig {
                category: Category::Copybooks,
                extensions: &[".cpy", ".copybook", ".cblcpy", ".inc"],
            },
            CategoryConfig {
                category: Category::VsamDefinitions,
                extensions: &[".ctl", ".cntl", ".def", ".vsam"],
            },
            CategoryConfig {
                category: Category::BmsMaps,
                extensions: &[".bms", ".map"],
            },
            CategoryConfig {
                category: Category::ControlFiles,
                extensions: &[".ctl", ".cfg", ".conf"],
            },
            CategoryConfig {
                category: Category::StandardsDocuments,
                extensions: &[".pdf", ".docx", ".pptx", ".txt", ".md"],
            },
        ]
    }
}

/// Flattened extension lookup built once from [`CategoryConfig::get_all`].
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    entries: Vec<(&'static str, Category)>,
}

impl ExtensionTable {
    pub fn new() -> Self {
        let mut entries: Vec<(&'static str, Category)> = Vec::new();
        for config in CategoryConfig::get_all() {
            for ext in config.extensions {
                if !entries.iter().any(|(known, _)| known == ext) {
                    entries.push((ext, config.category));
                }
            }
        }
        Self { entries }
    }

    /// Look up a lowercase, dot-prefixed extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Category> {
        self.entries
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, category)| *category)
    }

    pub fn extensions_for(&self, category: Category) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(_, c)| *c == category)
            .map(|(ext, _)| *ext)
            .collect()
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::new()
    }
}
