use serde::{Deserialize, Serialize};

/// Structural summary of one COBOL program, copybook or JCL member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file_name: String,
    /// Lowercase extension, e.g. `.cbl`
    pub file_type: String,
    pub divisions: Divisions,
    pub copybooks: Vec<CopybookRef>,
    pub cics_commands: Vec<CicsCommand>,
    pub variables: Vec<String>,
    pub paragraphs: Vec<String>,
    /// `Some` only for `.jcl` files; serialized as `null` otherwise
    pub jcl_definitions: Option<Vec<JclDefinition>>,
}

impl FileAnalysis {
    pub fn new(file_name: impl Into<String>, file_type: impl Into<String>, is_jcl: bool) -> Self {
        Self {
            file_name: file_name.into(),
            file_type: file_type.into(),
            divisions: Divisions::default(),
            copybooks: Vec::new(),
            cics_commands: Vec::new(),
            variables: Vec::new(),
            paragraphs: Vec::new(),
            jcl_definitions: if is_jcl { Some(Vec::new()) } else { None },
        }
    }

    pub fn program_id(&self) -> Option<&str> {
        self.divisions.identification.program_id.as_deref()
    }

    pub fn copybook_names(&self) -> impl Iterator<Item = &str> {
        self.copybooks.iter().map(|c| c.name.as_str())
    }

    /// Open a paragraph in both the flat list and the procedure blocks.
    pub(crate) fn open_paragraph(&mut self, name: String, line: String) {
        self.paragraphs.push(name.clone());
        self.divisions.procedure.push(ParagraphBlock {
            paragraph: name,
            code: vec![line],
        });
    }

    pub fn paragraph(&self, name: &str) -> Option<&ParagraphBlock> {
        self.divisions
            .procedure
            .iter()
            .find(|block| block.paragraph == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divisions {
    pub identification: Identification,
    pub environment: Environment,
    pub data: DataDivision,
    pub procedure: Vec<ParagraphBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
}

/// Kept as an empty object in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDivision {
    pub working_storage: Vec<VariableDeclaration>,
    pub linkage_section: Vec<VariableDeclaration>,
    pub file_section: Vec<VariableDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub level: String,
    pub name: String,
    /// Raw trailing tokens after the name
    #[serde(rename = "type")]
    pub data_type: String,
    /// Same as `data_type` when it carries a PIC clause, else empty
    pub picture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphBlock {
    pub paragraph: String,
    pub code: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopybookRef {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CicsCommand {
    pub command: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: String,
    /// Enclosing paragraph at the time of the match
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JclDefinition {
    #[serde(rename = "EXEC")]
    Exec { name: String, details: String },
    #[serde(rename = "DD")]
    Dd { name: String, details: String },
    #[serde(rename = "DEFINE")]
    Define { resource: String, details: String },
}

impl JclDefinition {
    pub fn kind(&self) -> &'static str {
        match self {
            JclDefinition::Exec { .. } => "EXEC",
            JclDefinition::Dd { .. } => "DD",
            JclDefinition::Define { .. } => "DEFINE",
        }
    }

    pub fn details(&self) -> &str {
        match self {
            JclDefinition::Exec { details, .. }
            | JclDefinition::Dd { details, .. }
            | JclDefinition::Define { details, .. } => details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        let analysis = FileAnalysis::new("A.cbl", ".cbl", false);
        let value = serde_json::to_value(&analysis).unwrap();
        for key in [
            "file_name",
            "file_type",
            "divisions",
            "copybooks",
            "cics_commands",
            "variables",
            "paragraphs",
            "jcl_definitions",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["jcl_definitions"].is_null());
        assert_eq!(value["divisions"]["environment"], serde_json::json!({}));
        assert_eq!(value["divisions"]["identification"], serde_json::json!({}));
        let data = &value["divisions"]["data"];
        assert!(data["working_storage"].is_array());
        assert!(data["linkage_section"].is_array());
        assert!(data["file_section"].is_array());
    }

    #[test]
    fn test_jcl_definition_tagging() {
        let def = JclDefinition::Define {
            resource: "CLUSTER".to_string(),
            details: "DEFINE CLUSTER".to_string(),
        };
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["type"], "DEFINE");
        assert_eq!(value["resource"], "CLUSTER");
        assert_eq!(def.kind(), "DEFINE");
    }

    #[test]
    fn test_paragraph_lists_stay_aligned() {
        let mut analysis = FileAnalysis::new("A.cbl", ".cbl", false);
        analysis.open_paragraph("MAIN".to_string(), "MAIN.".to_string());
        analysis.open_paragraph("EXIT-PARA".to_string(), "EXIT-PARA.".to_string());
        let names: Vec<&str> = analysis
            .divisions
            .procedure
            .iter()
            .map(|b| b.paragraph.as_str())
            .collect();
        assert_eq!(names, analysis.paragraphs);
        assert_eq!(analysis.paragraph("MAIN").unwrap().code, vec!["MAIN."]);
    }
}
