//! # Esquema de Tags BIO
//!
//! Converte o conjunto final de spans em uma tag por token:
//!
//! - `B-LABEL`: Begin, primeiro token de uma entidade
//! - `I-LABEL`: Inside, tokens subsequentes da mesma entidade
//! - `O`: Outside, não é parte de nenhuma entidade
//!
//! Diferente de um esquema com categorias fixas, os rótulos aqui são abertos:
//! qualquer pacote de domínio pode introduzir novos (`TICKER`, `DOSAGE`...).
//!
//! # Exemplo
//! `"top 10 trends"` com o span `TOPK [0,2)` → `B-TOPK I-TOPK O`

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: Marca o INÍCIO de uma entidade. Ex: **last** (B-DATE) quarter.
    Begin(String),
    /// **Inside**: Marca a CONTINUAÇÃO de uma entidade. Ex: last **quarter** (I-DATE).
    Inside(String),
    /// **Outside**: O token não faz parte de nenhuma entidade.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-YEAR", "I-DATE", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(label) => format!("B-{label}"),
            Tag::Inside(label) => format!("I-{label}"),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Rótulo da entidade (se for B- ou I-)
    pub fn entity(&self) -> Option<&str> {
        match self {
            Tag::Begin(label) | Tag::Inside(label) => Some(label),
            Tag::Outside => None,
        }
    }

    /// Parseia uma tag a partir de string (ex: "B-TOPK" → Begin("TOPK"))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, label) = s.split_once('-')?;
        if label.is_empty() {
            return None;
        }
        match prefix {
            "B" => Some(Tag::Begin(label.to_string())),
            "I" => Some(Tag::Inside(label.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Span reconstruído a partir de tags (sem prioridade).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// Codifica os spans finais em uma tag por token.
///
/// Os spans finais são disjuntos, então a ordem de escrita não importa.
/// Spans fora do intervalo `[0, n_tokens)` são recortados.
pub fn encode(n_tokens: usize, spans: &[Span]) -> Vec<Tag> {
    let mut tags = vec![Tag::Outside; n_tokens];
    for span in spans {
        let end = span.end.min(n_tokens);
        if span.start >= end {
            continue;
        }
        tags[span.start] = Tag::Begin(span.label.clone());
        for tag in &mut tags[span.start + 1..end] {
            *tag = Tag::Inside(span.label.clone());
        }
    }
    tags
}

/// Junta as tags com um espaço (formato do campo `labels` dos registros).
pub fn tags_to_string(tags: &[Tag]) -> String {
    tags.iter().map(Tag::label).collect::<Vec<_>>().join(" ")
}

/// Reconstrói os spans a partir das fronteiras B-/I-.
///
/// Implementa a máquina de estados do esquema BIO:
/// - `B-X` fecha o span aberto e inicia outro.
/// - `I-X` continua um span aberto de mesmo rótulo; sem span aberto, ou com
///   rótulo diferente, inicia um novo span.
/// - `O` fecha o span aberto.
pub fn decode(tags: &[Tag]) -> Vec<TagSpan> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, &str)> = None;

    for (i, tag) in tags.iter().enumerate() {
        match tag {
            Tag::Inside(label) if open.is_some_and(|(_, current)| current == label.as_str()) => {}
            Tag::Begin(label) | Tag::Inside(label) => {
                close(&mut spans, open.take(), i);
                open = Some((i, label.as_str()));
            }
            Tag::Outside => close(&mut spans, open.take(), i),
        }
    }
    close(&mut spans, open, tags.len());

    spans
}

fn close(spans: &mut Vec<TagSpan>, open: Option<(usize, &str)>, end: usize) {
    if let Some((start, label)) = open {
        spans.push(TagSpan {
            start,
            end,
            label: label.to_string(),
        });
    }
}
