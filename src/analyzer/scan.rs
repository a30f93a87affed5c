//! Single forward pass over source lines.
//!
//! [`Scanner`] is folded over the lines of a file; all scan state lives in
//! [`ScanState`] and is owned by one invocation, so scans are reentrant.
use super::jcl;
use super::models::{CicsCommand, CopybookRef, FileAnalysis, VariableDeclaration};
use super::FileKind;

/// Statements that must never open a paragraph, matched as substrings.
const STATEMENT_KEYWORDS: &[&str] = &["MOVE", "PERFORM", "IF", "ELSE", "END"];

/// Single-word statements that look like bare paragraph names.
const BARE_VERBS: &[&str] = &["EXIT", "GOBACK", "CONTINUE"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Division {
    #[default]
    None,
    Identification,
    Environment,
    Data,
    Procedure,
}

impl Division {
    fn from_header(line: &str) -> Option<Self> {
        [
            ("IDENTIFICATION DIVISION", Division::Identification),
            ("ENVIRONMENT DIVISION", Division::Environment),
            ("DATA DIVISION", Division::Data),
            ("PROCEDURE DIVISION", Division::Procedure),
        ]
        .into_iter()
        .find(|(header, _)| line.starts_with(header))
        .map(|(_, division)| division)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    None,
    WorkingStorage,
    Linkage,
    File,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        [
            ("WORKING-STORAGE SECTION", Section::WorkingStorage),
            ("LINKAGE SECTION", Section::Linkage),
            ("FILE SECTION", Section::File),
        ]
        .into_iter()
        .find(|(header, _)| line.starts_with(header))
        .map(|(_, section)| section)
    }

    fn holds_variables(&self) -> bool {
        matches!(self, Section::WorkingStorage | Section::Linkage)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    pub division: Division,
    pub section: Section,
    pub paragraph: Option<String>,
}

impl ScanState {
    /// Copybooks are bare data fragments, so they start inside working storage.
    pub fn initial(kind: FileKind) -> Self {
        match kind {
            FileKind::Copybook => Self {
                division: Division::Data,
                section: Section::WorkingStorage,
                paragraph: None,
            },
            FileKind::Program | FileKind::Jcl => Self::default(),
        }
    }

    fn enter_division(&mut self, division: Division) {
        if self.division != division {
            self.division = division;
            self.section = Section::None;
        }
    }
}

pub struct Scanner {
    kind: FileKind,
    state: ScanState,
    analysis: FileAnalysis,
}

impl Scanner {
    pub fn new(kind: FileKind, analysis: FileAnalysis) -> Self {
        Self {
            kind,
            state: ScanState::initial(kind),
            analysis,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Feed one raw line. Intended for `lines().fold(scanner, Scanner::step)`.
    pub fn step(mut self, raw: &str) -> Self {
        let line = raw.trim().to_uppercase();
        if line.is_empty() || line.starts_with('*') || line.starts_with("//*") {
            return self;
        }

        match self.kind {
            FileKind::Jcl => self.scan_jcl(line),
            FileKind::Program | FileKind::Copybook => self.scan_cobol(line),
        }
        self
    }

    pub fn finish(self) -> FileAnalysis {
        self.analysis
    }

    fn is_copybook(&self) -> bool {
        self.kind == FileKind::Copybook
    }

    fn scan_jcl(&mut self, line: String) {
        if let Some(def) = jcl::parse_line(&line) {
            if let Some(defs) = self.analysis.jcl_definitions.as_mut() {
                defs.push(def);
            }
        }
    }

    fn scan_cobol(&mut self, line: String) {
        let division_header = Division::from_header(&line);
        if let Some(division) = division_header {
            self.state.enter_division(division);
        }

        match self.state.division {
            Division::Identification => self.scan_identification(&line),
            Division::Data => self.scan_data_header(&line),
            _ => {}
        }

        if !self.is_copybook() && line.contains("EXEC CICS") {
            self.record_cics(&line);
        }

        if self.state.division == Division::Data && self.state.section.holds_variables() {
            self.scan_variable(&line);
        }

        if self.state.division == Division::Procedure && !self.is_copybook() {
            self.scan_procedure(line, division_header.is_some());
        }
    }

    fn scan_identification(&mut self, line: &str) {
        let Some(rest) = line.strip_prefix("PROGRAM-ID") else {
            return;
        };
        // "PROGRAM-ID. NAME." or the compact "PROGRAM-ID.NAME."
        let program_id = match line.split_whitespace().nth(1) {
            Some(token) => token.trim_matches('.').to_string(),
            None => rest.trim_matches('.').trim().to_string(),
        };
        if !program_id.is_empty() {
            self.analysis.divisions.identification.program_id = Some(program_id);
        }
    }

    fn scan_data_header(&mut self, line: &str) {
        if let Some(section) = Section::from_header(line) {
            self.state.section = section;
        } else if line.starts_with("COPY") {
            if let Some(name) = line.split_whitespace().nth(1) {
                self.analysis.copybooks.push(CopybookRef {
                    name: name.trim_matches('.').to_string(),
                    content: line.to_string(),
                });
            }
        }
    }

    fn record_cics(&mut self, line: &str) {
        let kind = line
            .split_whitespace()
            .nth(2)
            .map(|t| t.trim_end_matches('.').to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let parameters = line
            .find("EXEC CICS")
            .map(|idx| line[idx..].to_string())
            .unwrap_or_default();

        self.analysis.cics_commands.push(CicsCommand {
            command: line.to_string(),
            kind,
            parameters,
            context: self.state.paragraph.clone(),
        });
    }

    fn scan_variable(&mut self, line: &str) {
        let levels: &[&str] = if self.is_copybook() {
            &["01", "05", "77", "88"]
        } else {
            &["01", "05", "77"]
        };
        if !levels.iter().any(|level| line.starts_with(level)) {
            return;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            return;
        }

        let name = parts[1].trim_matches('.').to_string();
        let data_type = parts[2..].join(" ");
        let picture = if data_type.contains("PIC") {
            data_type.clone()
        } else {
            String::new()
        };
        let declaration = VariableDeclaration {
            level: parts[0].to_string(),
            name: name.clone(),
            data_type,
            picture,
        };

        let data = &mut self.analysis.divisions.data;
        match self.state.section {
            Section::Linkage => data.linkage_section.push(declaration),
            _ => data.working_storage.push(declaration),
        }
        self.analysis.variables.push(name);
    }

    fn scan_procedure(&mut self, line: String, is_division_header: bool) {
        if is_division_header {
            return;
        }
        if let Some(name) = paragraph_name(&line) {
            self.state.paragraph = Some(name.clone());
            self.analysis.open_paragraph(name, line);
            return;
        }

        if self.state.paragraph.is_some() {
            if let Some(block) = self.analysis.divisions.procedure.last_mut() {
                block.code.push(line);
            }
        }
    }
}

/// Name declared by a paragraph or section header line, without its period.
pub fn paragraph_name(line: &str) -> Option<String> {
    if !line.ends_with('.') || line.starts_with("EXEC") {
        return None;
    }
    if STATEMENT_KEYWORDS.iter().any(|kw| line.contains(kw)) {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let name = match tokens.as_slice() {
        [single] => single.trim_end_matches('.'),
        [name, "SECTION."] => *name,
        _ => return None,
    };

    if name.is_empty() || BARE_VERBS.contains(&name) {
        return None;
    }
    Some(name.to_string())
}
