//! Section parser: partitions preprocessed lines into sections and
//! classifies each line. A small explicit state value (which kind of
//! section, if any, is open) drives which line shapes are accepted.

use tracing::debug;

use crate::error::{AsmError, SectionError};
use crate::literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Instr,
    Data,
    Rodata,
}

impl SectionKind {
    fn from_name(name: &str) -> Option<SectionKind> {
        match name {
            "instr" => Some(SectionKind::Instr),
            "data" => Some(SectionKind::Data),
            "rodata" => Some(SectionKind::Rodata),
            _ => None,
        }
    }

    fn is_data_like(self) -> bool {
        matches!(self, SectionKind::Data | SectionKind::Rodata)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Bare `name:` definition; records the current instruction offset.
    Label(String),
    /// Raw mnemonic + operand text, one word of output.
    Inst(String),
    /// `addr: value` entry in a data-like section.
    Data { addr: u32, value: String },
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub entries: Vec<Entry>,
}

/// Parsed assembly unit: the ordered sections plus the `global` entry-point
/// directive, if any.
#[derive(Debug, Clone, Default)]
pub struct SourceUnit {
    pub entry_point: Option<String>,
    pub sections: Vec<Section>,
}

impl SourceUnit {
    /// Entries of every instruction section, in source order.
    pub fn instr_entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.sections
            .iter()
            .filter(|s| s.kind == SectionKind::Instr)
            .flat_map(|s| s.entries.iter())
    }

    /// Entries of every data-like section (`data` and `rodata`), in source
    /// order.
    pub fn data_entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.sections
            .iter()
            .filter(|s| s.kind.is_data_like())
            .flat_map(|s| s.entries.iter())
    }
}

/// Truncate a line at the first `;` that is not inside a quoted literal.
pub fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, ';') => return &line[..i],
            _ => {}
        }
    }
    line
}

pub fn parse(lines: &[String]) -> Result<SourceUnit, AsmError> {
    let mut unit = SourceUnit::default();
    let mut current: Option<usize> = None; // index into unit.sections

    for raw in lines {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        // Entry-point directive, allowed anywhere; the last one wins.
        if let Some(rest) = line.strip_prefix("global ") {
            unit.entry_point = Some(rest.trim().to_string());
            continue;
        }

        // `.name:` opens a section.
        if let Some(name) = line.strip_prefix('.').and_then(|r| r.strip_suffix(':')) {
            let kind = SectionKind::from_name(name)
                .ok_or_else(|| SectionError::UnknownSection(name.to_string()))?;
            unit.sections.push(Section {
                kind,
                entries: Vec::new(),
            });
            current = Some(unit.sections.len() - 1);
            continue;
        }

        let Some(idx) = current else {
            return Err(SectionError::UnscopedContent(line.to_string()).into());
        };
        let section = &mut unit.sections[idx];

        let entry = match section.kind {
            SectionKind::Instr => {
                if let Some(name) = as_label(line) {
                    Entry::Label(name.to_string())
                } else {
                    Entry::Inst(line.to_string())
                }
            }
            SectionKind::Data | SectionKind::Rodata => {
                let (addr_text, value) = line
                    .split_once(':')
                    .ok_or_else(|| SectionError::MalformedEntry(line.to_string()))?;
                let addr = literal::parse_int(addr_text)
                    .filter(|v| (0..=i64::from(u32::MAX)).contains(v))
                    .ok_or_else(|| SectionError::MalformedEntry(line.to_string()))?;
                Entry::Data {
                    addr: addr as u32,
                    value: value.trim().to_string(),
                }
            }
        };
        section.entries.push(entry);
    }

    debug!(sections = unit.sections.len(), "parsed source unit");
    Ok(unit)
}

/// `name:` with a plain identifier and nothing else.
fn as_label(line: &str) -> Option<&str> {
    let name = line.strip_suffix(':')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        .then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn classifies_labels_and_instructions() {
        let unit = parse(&lines(&[".instr:", "main:", "addi A, 1", "jmp main"])).unwrap();
        let entries: Vec<_> = unit.instr_entries().collect();
        assert_eq!(
            entries,
            vec![
                &Entry::Label("main".into()),
                &Entry::Inst("addi A, 1".into()),
                &Entry::Inst("jmp main".into()),
            ]
        );
    }

    #[test]
    fn content_before_any_section_is_rejected() {
        let err = parse(&lines(&["addi A, 1"])).unwrap_err();
        assert!(matches!(
            err,
            AsmError::Section(SectionError::UnscopedContent(_))
        ));
    }

    #[test]
    fn data_and_rodata_both_collect_entries() {
        let unit = parse(&lines(&[
            ".rodata:",
            "0x00: str \"x\"",
            ".data:",
            "0x10: 0xFF",
        ]))
        .unwrap();
        assert_eq!(unit.data_entries().count(), 2);
    }

    #[test]
    fn comment_stripping_is_quote_aware() {
        assert_eq!(strip_comment("addi A, 1 ; inc"), "addi A, 1 ");
        assert_eq!(strip_comment("0x0: str \"a;b\" ; tail"), "0x0: str \"a;b\" ");
    }

    #[test]
    fn global_directive_is_recorded() {
        let unit = parse(&lines(&["global main", ".instr:", "main:", "halt"])).unwrap();
        assert_eq!(unit.entry_point.as_deref(), Some("main"));
    }
}
