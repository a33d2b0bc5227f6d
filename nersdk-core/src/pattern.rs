//! # Padrões Declarativos de Pacotes
//!
//! Um pacote de domínio descreve suas entidades em `patterns.yaml`:
//!
//! ```yaml
//! entities:
//!   - name: TICKER
//!     kind: regex-token
//!     pattern: "[A-Z]{2,5}"
//!   - name: ORG_ALIAS
//!     kind: phrase
//!     phrases: ["Federal Reserve", "the Fed"]
//! ```
//!
//! ## Tolerância deliberada
//!
//! Entradas sem `name` ou `kind`, com `kind` desconhecido ou sem os campos
//! específicos do tipo são **ignoradas** (com aviso no log), nunca rejeitadas.
//! Já um documento que não é YAML válido, cuja lista `entities` não é uma
//! sequência, ou um `regex-token` cuja regex não compila, tornam o pacote
//! inválido ([`NerError::PackConfigInvalid`]).

use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::error::{NerError, Result};

/// Nome do arquivo de padrões dentro do diretório base do pacote.
pub const PATTERN_FILE: &str = "patterns.yaml";

/// Um padrão declarativo já validado.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Casa um único token inteiro contra a regex.
    RegexToken { label: String, regex: Regex },
    /// Casa uma sequência contígua de tokens literais (com caixa).
    Phrase {
        label: String,
        phrases: Vec<Vec<String>>,
    },
}

impl Pattern {
    pub fn label(&self) -> &str {
        match self {
            Pattern::RegexToken { label, .. } | Pattern::Phrase { label, .. } => label,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Pattern::RegexToken { .. } => "regex-token",
            Pattern::Phrase { .. } => "phrase",
        }
    }
}

/// Lê `path` e devolve a lista de padrões.
///
/// Arquivo ausente resulta em lista vazia.
pub fn load_patterns(pack: &str, path: &Path) -> Result<Vec<Pattern>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| NerError::io(path, e))?;
    parse_patterns(pack, path, &raw)
}

/// Interpreta o conteúdo de um `patterns.yaml`.
pub fn parse_patterns(pack: &str, path: &Path, raw: &str) -> Result<Vec<Pattern>> {
    let doc: Value =
        serde_yaml::from_str(raw).map_err(|e| NerError::config(pack, path, e.to_string()))?;

    let entities = match &doc {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(root) => match root.get("entities") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Sequence(entries)) => entries,
            Some(_) => return Err(NerError::config(pack, path, "'entities' must be a list")),
        },
        _ => return Err(NerError::config(pack, path, "document root must be a mapping")),
    };

    let mut patterns = Vec::with_capacity(entities.len());
    for (position, entry) in entities.iter().enumerate() {
        let Some(entry) = entry.as_mapping() else {
            warn!(pack, position, "skipping pattern entry that is not a mapping");
            continue;
        };
        if let Some(pattern) = parse_entry(pack, path, position, entry)? {
            patterns.push(pattern);
        }
    }
    Ok(patterns)
}

/// `Ok(None)` quando a entrada deve ser ignorada.
fn parse_entry(pack: &str, path: &Path, position: usize, entry: &Mapping) -> Result<Option<Pattern>> {
    let label = entry.get("name").and_then(Value::as_str).filter(|s| !s.is_empty());
    let kind = entry.get("kind").and_then(Value::as_str).filter(|s| !s.is_empty());
    let (Some(label), Some(kind)) = (label, kind) else {
        warn!(pack, position, "skipping pattern entry without 'name' or 'kind'");
        return Ok(None);
    };

    match kind {
        "regex-token" => {
            let Some(source) = entry.get("pattern").and_then(Value::as_str) else {
                warn!(pack, position, label, "skipping regex-token entry without 'pattern'");
                return Ok(None);
            };
            let case_insensitive = entry
                .get("case_insensitive")
                .map(|flag| flag_value(pack, position, label, flag))
                .unwrap_or(false);
            let regex = RegexBuilder::new(&format!("^(?:{source})$"))
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|e| NerError::config(pack, path, format!("entity '{label}': {e}")))?;
            Ok(Some(Pattern::RegexToken {
                label: label.to_string(),
                regex,
            }))
        }
        "phrase" => {
            let phrases: Vec<Vec<String>> = entry
                .get("phrases")
                .and_then(Value::as_sequence)
                .map(|seq| {
                    seq.iter()
                        .filter_map(Value::as_str)
                        .map(|p| p.split_whitespace().map(str::to_string).collect::<Vec<_>>())
                        // frase vazia geraria spans de comprimento zero
                        .filter(|tokens| !tokens.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            Ok(Some(Pattern::Phrase {
                label: label.to_string(),
                phrases,
            }))
        }
        other => {
            warn!(pack, position, label, kind = other, "skipping pattern entry with unknown kind");
            Ok(None)
        }
    }
}

/// Interpreta `case_insensitive` com a mesma tolerância das entradas:
/// números diferentes de zero e `yes`/`on`/`true` valem como verdadeiro.
fn flag_value(pack: &str, position: usize, label: &str, flag: &Value) -> bool {
    match flag {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => true,
            "false" | "no" | "n" | "off" | "0" | "" => false,
            _ => {
                warn!(pack, position, label, value = %s, "ignoring unrecognized 'case_insensitive' value");
                false
            }
        },
        other => {
            warn!(pack, position, label, value = ?other, "ignoring non-scalar 'case_insensitive' value");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Vec<Pattern>> {
        parse_patterns("test", Path::new("patterns.yaml"), raw)
    }

    #[test]
    fn test_parses_both_kinds() {
        let patterns = parse(
            r#"
entities:
  - name: TICKER
    kind: regex-token
    pattern: "[A-Z]{2,5}"
  - name: ORG
    kind: phrase
    phrases: ["Federal Reserve", "the Fed"]
"#,
        )
        .unwrap();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].label(), "TICKER");
        assert_eq!(patterns[0].kind(), "regex-token");
        match &patterns[1] {
            Pattern::Phrase { phrases, .. } => {
                assert_eq!(phrases[0], vec!["Federal", "Reserve"]);
                assert_eq!(phrases[1], vec!["the", "Fed"]);
            }
            other => panic!("expected phrase, got {other:?}"),
        }
    }

    #[test]
    fn test_regex_is_anchored_and_case_flag_applies() {
        let patterns = parse(
            r#"
entities:
  - { name: Q, kind: regex-token, pattern: "q[1-4]", case_insensitive: true }
  - { name: T, kind: regex-token, pattern: "[A-Z]+" }
"#,
        )
        .unwrap();
        let Pattern::RegexToken { regex, .. } = &patterns[0] else {
            panic!("expected regex-token");
        };
        assert!(regex.is_match("Q2"));
        assert!(!regex.is_match("Q22"));
        let Pattern::RegexToken { regex, .. } = &patterns[1] else {
            panic!("expected regex-token");
        };
        assert!(!regex.is_match("AAPl"));
    }

    #[test]
    fn test_case_flag_accepts_truthy_forms() {
        let patterns = parse(
            r#"
entities:
  - { name: A, kind: regex-token, pattern: "q1", case_insensitive: yes }
  - { name: B, kind: regex-token, pattern: "q1", case_insensitive: 1 }
  - { name: C, kind: regex-token, pattern: "q1", case_insensitive: "On" }
  - { name: D, kind: regex-token, pattern: "q1", case_insensitive: no }
  - { name: E, kind: regex-token, pattern: "q1", case_insensitive: 0 }
  - { name: F, kind: regex-token, pattern: "q1", case_insensitive: maybe }
  - { name: G, kind: regex-token, pattern: "q1", case_insensitive: [true] }
"#,
        )
        .unwrap();
        let matches: Vec<bool> = patterns
            .iter()
            .map(|p| match p {
                Pattern::RegexToken { regex, .. } => regex.is_match("Q1"),
                other => panic!("expected regex-token, got {other:?}"),
            })
            .collect();
        assert_eq!(matches, vec![true, true, true, false, false, false, false]);
    }

    #[test]
    fn test_incomplete_entries_are_skipped() {
        let patterns = parse(
            r#"
entities:
  - kind: regex-token
    pattern: "x"
  - name: NO_KIND
  - name: NO_PATTERN
    kind: regex-token
  - name: ODD
    kind: gazetteer
  - just a string
  - name: OK
    kind: phrase
    phrases: ["", "a b"]
"#,
        )
        .unwrap();
        assert_eq!(patterns.len(), 1);
        let Pattern::Phrase { phrases, .. } = &patterns[0] else {
            panic!("expected phrase");
        };
        assert_eq!(phrases.len(), 1);
    }

    #[test]
    fn test_empty_documents() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("entities:").unwrap().is_empty());
        assert!(parse("other: 1").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_documents_are_invalid() {
        for raw in ["entities: [", "entities: 3", "- a\n- b", "entities:\n  - {name: X, kind: regex-token, pattern: \"(\"}"] {
            let err = parse(raw).unwrap_err();
            assert_eq!(err.kind(), "PackConfigInvalid", "input: {raw}");
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let patterns = load_patterns("test", &dir.path().join(PATTERN_FILE)).unwrap();
        assert!(patterns.is_empty());
    }
}
