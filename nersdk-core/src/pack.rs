//! # Pacotes de Domínio
//!
//! Um pacote agrupa padrões declarativos, um hook opcional e uma prioridade.
//! É construído uma vez por chamada pelo [`crate::loader::PackLoader`], nunca
//! é mutado e não é mantido em cache entre chamadas.
//!
//! [`apply_pack`] é o aplicador: percorre os padrões na ordem da lista, depois
//! invoca o hook (se houver) uma única vez, carimbando em todos os spans a
//! prioridade do pacote.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::hooks::{Hook, HookStatus};
use crate::pattern::Pattern;
use crate::span::Span;

/// Um pacote de domínio carregado.
#[derive(Debug, Clone)]
pub struct DomainPack {
    pub name: String,
    /// Diretório onde `patterns.yaml` e `hooks.yaml` são procurados.
    pub base: PathBuf,
    /// Texto livre do manifesto `pack.yaml`, se existir.
    pub description: Option<String>,
    pub patterns: Vec<Pattern>,
    pub hook: Option<Hook>,
    /// Como o `hooks.yaml` foi interpretado (usado pelo diagnóstico).
    pub hook_status: HookStatus,
    pub priority: i32,
}

/// Resumo de um pacote para listagens e diagnóstico.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    pub name: String,
    pub base: PathBuf,
    pub description: Option<String>,
    pub pattern_count: usize,
    pub labels: Vec<String>,
    /// Nome do matcher ativo, se houver.
    pub hook: Option<String>,
    pub priority: i32,
}

impl DomainPack {
    pub fn info(&self) -> PackInfo {
        PackInfo {
            name: self.name.clone(),
            base: self.base.clone(),
            description: self.description.clone(),
            pattern_count: self.patterns.len(),
            labels: self.labels(),
            hook: self.hook.as_ref().map(|h| h.name().to_string()),
            priority: self.priority,
        }
    }

    /// Rótulos dos padrões, na ordem do arquivo.
    pub fn labels(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.label().to_string()).collect()
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }
}

/// Aplica o pacote aos tokens e devolve os spans candidatos.
pub fn apply_pack(pack: &DomainPack, tokens: &[&str]) -> Vec<Span> {
    let mut spans = Vec::new();

    // Padrões declarativos
    for pattern in &pack.patterns {
        match pattern {
            Pattern::RegexToken { label, regex } => {
                for (i, tok) in tokens.iter().enumerate() {
                    if regex.is_match(tok) {
                        spans.push(Span::new(i, i + 1, label.as_str(), pack.priority));
                    }
                }
            }
            Pattern::Phrase { label, phrases } => {
                for phrase in phrases {
                    let n = phrase.len();
                    if n == 0 {
                        continue;
                    }
                    // Cada posição inicial é testada de forma independente
                    for (i, window) in tokens.windows(n).enumerate() {
                        if window.iter().zip(phrase).all(|(tok, lit)| *tok == lit.as_str()) {
                            spans.push(Span::new(i, i + n, label.as_str(), pack.priority));
                        }
                    }
                }
            }
        }
    }

    // Hook opcional
    if let Some(hook) = &pack.hook {
        for raw in hook.find(tokens) {
            if raw.start < raw.end && raw.end <= tokens.len() {
                spans.push(raw.stamp(pack.priority));
            } else {
                warn!(
                    pack = %pack.name,
                    hook = hook.name(),
                    start = raw.start,
                    end = raw.end,
                    "dropping hook span outside token range"
                );
            }
        }
    }

    debug!(pack = %pack.name, candidates = spans.len(), "pack applied");
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookRegistry;
    use crate::span::{HookSpan, DEFAULT_PACK_PRIORITY};
    use regex::Regex;

    fn pack(patterns: Vec<Pattern>, hook: Option<Hook>) -> DomainPack {
        DomainPack {
            name: "test".into(),
            base: PathBuf::from("."),
            description: None,
            patterns,
            hook,
            hook_status: HookStatus::Absent,
            priority: DEFAULT_PACK_PRIORITY,
        }
    }

    fn regex_token(label: &str, source: &str) -> Pattern {
        Pattern::RegexToken {
            label: label.into(),
            regex: Regex::new(&format!("^(?:{source})$")).unwrap(),
        }
    }

    fn phrase(label: &str, phrases: &[&str]) -> Pattern {
        Pattern::Phrase {
            label: label.into(),
            phrases: phrases
                .iter()
                .map(|p| p.split_whitespace().map(str::to_string).collect())
                .collect(),
        }
    }

    #[test]
    fn test_regex_token_full_match() {
        let pack = pack(vec![regex_token("TICKER", "[A-Z]{2,5}")], None);
        let spans = apply_pack(&pack, &["AAPL", "rose", "AAPLX1", "MSFT"]);
        assert_eq!(
            spans,
            vec![
                Span::new(0, 1, "TICKER", DEFAULT_PACK_PRIORITY),
                Span::new(3, 4, "TICKER", DEFAULT_PACK_PRIORITY),
            ]
        );
    }

    #[test]
    fn test_phrase_matches_every_offset() {
        let pack = pack(vec![phrase("REP", &["ha ha"])], None);
        let spans = apply_pack(&pack, &["ha", "ha", "ha"]);
        // sobreposições com a própria frase são emitidas; o resolvedor decide
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (0, 2));
        assert_eq!((spans[1].start, spans[1].end), (1, 3));
    }

    #[test]
    fn test_phrase_is_case_sensitive() {
        let pack = pack(vec![phrase("ORG", &["Federal Reserve"])], None);
        assert!(apply_pack(&pack, &["federal", "reserve"]).is_empty());
        assert_eq!(apply_pack(&pack, &["the", "Federal", "Reserve"]).len(), 1);
    }

    #[test]
    fn test_phrase_longer_than_tokens() {
        let pack = pack(vec![phrase("LONG", &["a b c"])], None);
        assert!(apply_pack(&pack, &["a", "b"]).is_empty());
    }

    #[test]
    fn test_hook_spans_are_stamped_and_validated() {
        let mut registry = HookRegistry::new();
        registry.register("bad", |_tokens: &[&str]| {
            vec![
                HookSpan::new(0, 2, "GOOD"),
                HookSpan::new(1, 1, "EMPTY"),
                HookSpan::new(1, 9, "OUT"),
            ]
        });
        let mut pack = pack(vec![regex_token("X", "x")], registry.get("bad"));
        pack.priority = 70;
        let spans = apply_pack(&pack, &["x", "y"]);
        assert_eq!(spans, vec![Span::new(0, 1, "X", 70), Span::new(0, 2, "GOOD", 70)]);
    }

    #[test]
    fn test_info() {
        let registry = HookRegistry::builtin();
        let pack = pack(
            vec![regex_token("A", "a"), phrase("B", &["b c"])],
            registry.get("finance.percent_range"),
        );
        let info = pack.info();
        assert_eq!(info.pattern_count, 2);
        assert_eq!(info.labels, vec!["A", "B"]);
        assert_eq!(info.hook.as_deref(), Some("finance.percent_range"));
        assert!(pack.has_hook());
    }
}
