//! JCL statement extraction.
//!
//! `EXEC` and `DD` entries are named after the statement label (`//STEP1` ->
//! `STEP1`); unlabeled statements such as DD concatenations get an empty name.
//! Operation keywords are matched as whole tokens so that labels or operands
//! containing `DD` or `EXEC` are not mistaken for statements. Only `//` lines
//! are statements; in-stream data and `/*` delimiters are ignored.
use super::models::JclDefinition;

/// Parse one trimmed, uppercased, non-comment JCL line.
pub fn parse_line(line: &str) -> Option<JclDefinition> {
    let details = line.to_string();

    if let Some(rest) = line.strip_prefix("//") {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            return None;
        }

        // "// DD ..." leaves the first token as the bare "//"
        let label = if rest.starts_with(char::is_whitespace) {
            String::new()
        } else {
            tokens[0].trim_start_matches("//").to_string()
        };
        let operations = &tokens[1..];

        if operations.contains(&"EXEC") {
            return Some(JclDefinition::Exec {
                name: label,
                details,
            });
        }
        if operations.contains(&"DD") {
            return Some(JclDefinition::Dd {
                name: label,
                details,
            });
        }
        return define_resource(operations)
            .map(|resource| JclDefinition::Define { resource, details });
    }

    None
}

fn define_resource(operations: &[&str]) -> Option<String> {
    let mut tokens = operations.iter();
    tokens.find(|t| **t == "DEFINE")?;
    tokens
        .next()
        .map(|t| t.trim_end_matches(['-', '.']).to_string())
        .filter(|t| !t.is_empty())
}
