//! # Motor de Regras Nativas
//!
//! Regras fixas, baseadas em expressões regulares, que produzem spans
//! candidatos para as entidades embutidas no sistema:
//!
//! | Rótulo  | Padrão                                                     | Tamanho |
//! |---------|------------------------------------------------------------|---------|
//! | `MONTH` | nome de mês (completo ou abreviado), sem caixa             | 1       |
//! | `MONTH` | continuação `"<Mês> to <Mês>"`: conectivo + segundo mês   | 2       |
//! | `YEAR`  | `19xx` ou `20xx`                                           | 1       |
//! | `DATE`  | `(this\|last\|next) (month\|year\|quarter)`                | 2       |
//! | `TOPK`  | `top <n>` / `top-<n>`                                      | 2 / 1   |
//! | `SCORE` | inteiro isolado, ou `<n> or (above\|more\|higher\|greater)` | 1 / 3   |
//! | `SCORE` | o número em `score <n>` e `<n> score`                      | 1       |
//!
//! Todas as regras são puras e nunca falham: ausência de padrão é apenas
//! ausência de span. Os candidatos podem se sobrepor (ex: o mês isolado e a
//! continuação); quem escolhe entre eles é o [`crate::resolve`].
//!
//! A ordem de emissão (MONTH, YEAR, DATE, TOPK, SCORE) participa do desempate
//! estável do resolvedor e não deve ser alterada.

use regex::Regex;

use crate::span::{Span, CORE_PRIORITY};

const MONTHS: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t)?|sept(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";
const YEAR: &str = r"19\d{2}|20\d{2}";
const NUMBER: &str = r"\d+";
const TOPK_HYPHEN: &str = r"top-\d+";

/// Motor de regras nativas com as expressões já compiladas.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    month: Regex,
    year: Regex,
    number: Regex,
    topk_hyphen: Regex,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            month: full_match(MONTHS, true),
            year: full_match(YEAR, false),
            number: full_match(NUMBER, false),
            topk_hyphen: full_match(TOPK_HYPHEN, true),
        }
    }

    /// Aplica todas as regras à sequência de tokens.
    ///
    /// Retorna os spans candidatos com prioridade [`CORE_PRIORITY`].
    pub fn apply(&self, tokens: &[&str]) -> Vec<Span> {
        let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let mut spans = Vec::new();

        self.match_months(&lower, &mut spans);
        self.match_years(tokens, &mut spans);
        match_relative_dates(&lower, &mut spans);
        self.match_top_k(tokens, &lower, &mut spans);
        self.match_scores(tokens, &lower, &mut spans);

        spans
    }

    fn match_months(&self, lower: &[String], spans: &mut Vec<Span>) {
        for (i, tok) in lower.iter().enumerate() {
            if !self.month.is_match(tok) {
                continue;
            }
            spans.push(core_span(i, i + 1, "MONTH"));
            // "<Mês> to <Mês>": o conectivo e o segundo mês viram a continuação
            if lower.get(i + 2).is_some_and(|next| self.month.is_match(next)) {
                spans.push(core_span(i + 1, i + 3, "MONTH"));
            }
        }
    }

    fn match_years(&self, tokens: &[&str], spans: &mut Vec<Span>) {
        for (i, tok) in tokens.iter().enumerate() {
            if self.year.is_match(tok) {
                spans.push(core_span(i, i + 1, "YEAR"));
            }
        }
    }

    fn match_top_k(&self, tokens: &[&str], lower: &[String], spans: &mut Vec<Span>) {
        for i in 0..tokens.len().saturating_sub(1) {
            if lower[i] == "top" && self.number.is_match(tokens[i + 1]) {
                spans.push(core_span(i, i + 2, "TOPK"));
            }
        }
        for (i, tok) in lower.iter().enumerate() {
            if self.topk_hyphen.is_match(tok) {
                spans.push(core_span(i, i + 1, "TOPK"));
            }
        }
    }

    fn match_scores(&self, tokens: &[&str], lower: &[String], spans: &mut Vec<Span>) {
        let is_number = |i: usize| tokens.get(i).is_some_and(|t| self.number.is_match(t));

        for i in 0..tokens.len() {
            if is_number(i) {
                if is_score_range_tail(lower, i) {
                    spans.push(core_span(i, i + 3, "SCORE"));
                } else {
                    spans.push(core_span(i, i + 1, "SCORE"));
                }
            }

            // "score <n>"
            if lower[i] == "score" && is_number(i + 1) {
                spans.push(core_span(i + 1, i + 2, "SCORE"));
            }

            // "<n> score"
            if is_number(i) && lower.get(i + 1).is_some_and(|next| next == "score") {
                spans.push(core_span(i, i + 1, "SCORE"));
            }
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `"this|last|next"` seguido de `"month|year|quarter"`.
fn match_relative_dates(lower: &[String], spans: &mut Vec<Span>) {
    for (i, pair) in lower.windows(2).enumerate() {
        let anchor = matches!(pair[0].as_str(), "this" | "last" | "next");
        let unit = matches!(pair[1].as_str(), "month" | "year" | "quarter");
        if anchor && unit {
            spans.push(core_span(i, i + 2, "DATE"));
        }
    }
}

/// `true` se após o número em `i` vier `or (above|more|higher|greater)`.
fn is_score_range_tail(lower: &[String], i: usize) -> bool {
    match (lower.get(i + 1), lower.get(i + 2)) {
        (Some(or), Some(cmp)) => {
            or == "or" && matches!(cmp.as_str(), "above" | "more" | "higher" | "greater")
        }
        _ => false,
    }
}

fn core_span(start: usize, end: usize, label: &str) -> Span {
    Span::new(start, end, label, CORE_PRIORITY)
}

/// Compila `pattern` ancorado para casar o token inteiro.
fn full_match(pattern: &str, case_insensitive: bool) -> Regex {
    let flags = if case_insensitive { "(?i)" } else { "" };
    Regex::new(&format!("^{flags}(?:{pattern})$")).expect("built-in rule pattern must compile")
}
