//! # Spans de Entidade
//!
//! Um span é um intervalo semiaberto `[start, end)` de **índices de token** com
//! um rótulo e uma prioridade. É a unidade comum a todos os matchers (regras
//! nativas, padrões declarativos e hooks) e a entrada do resolvedor de
//! sobreposições.
//!
//! O comprimento não é armazenado: [`Span::len`] é sempre derivado de
//! `end - start`, de modo que a chave primária de ordenação do resolvedor nunca
//! diverge do intervalo.
//!
//! # Exemplo
//! Em `"growth at least 4% expected"`, o trecho "at least 4%":
//! `Span { start: 1, end: 4, label: "PERCENT_RANGE", priority: 50 }`

use serde::{Deserialize, Serialize};

/// Prioridade fixa dos spans produzidos pelas regras nativas.
///
/// Maior que a prioridade padrão dos pacotes, então uma entidade nativa só é
/// deslocada por um pacote de mesmo comprimento se este declarar prioridade
/// explícita acima deste valor.
pub const CORE_PRIORITY: i32 = 100;

/// Prioridade atribuída aos pacotes de domínio quando nenhuma é informada.
pub const DEFAULT_PACK_PRIORITY: i32 = 50;

/// Span candidato ou final.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Índice do token inicial (inclusivo)
    pub start: usize,
    /// Índice do token final (exclusivo)
    pub end: usize,
    /// Rótulo da entidade (ex: "YEAR", "TICKER")
    pub label: String,
    /// Maior vence em empates de comprimento
    pub priority: i32,
}

impl Span {
    pub fn new(start: usize, end: usize, label: impl Into<String>, priority: i32) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            priority,
        }
    }

    /// Comprimento em tokens (`end - start`).
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` se `0 <= start < end <= n_tokens`.
    pub fn is_valid_for(&self, n_tokens: usize) -> bool {
        self.start < self.end && self.end <= n_tokens
    }

    /// `true` se os dois spans compartilham ao menos um índice de token.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Span devolvido por um hook customizado: sem prioridade, que é carimbada
/// pelo aplicador de pacotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl HookSpan {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Converte em [`Span`] com a prioridade do pacote.
    pub fn stamp(self, priority: i32) -> Span {
        Span {
            start: self.start,
            end: self.end,
            label: self.label,
            priority,
        }
    }
}
