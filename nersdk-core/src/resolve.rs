//! # Resolução de Sobreposições
//!
//! Recebe todos os spans candidatos (regras nativas + pacotes) e escolhe um
//! conjunto final sem sobreposição, de forma determinística.
//!
//! ## Algoritmo (escalonamento de intervalos guloso)
//!
//! 1. Ordena os candidatos por:
//!    - comprimento decrescente (o mais específico primeiro),
//!    - prioridade decrescente (o mais confiável primeiro),
//!    - início crescente (o mais à esquerda primeiro).
//! 2. Percorre a lista ordenada aceitando um span somente se nenhum de seus
//!    tokens já foi reivindicado; ao aceitar, marca todos eles.
//! 3. Devolve os aceitos ordenados por início.
//!
//! A ordenação é **estável**: candidatos empatados nas três chaves mantêm a
//! ordem de concatenação (regras nativas antes dos pacotes, pacotes na ordem
//! pedida). Esse desempate faz parte do contrato.
//!
//! O guloso não maximiza o número de spans; ele privilegia matches longos,
//! confiáveis e precoces. Ex: candidatos `[0,3)` e `[0,1)`, `[1,2)`, `[2,3)`
//! resultam apenas em `[0,3)`.

use std::cmp::Ordering;

use crate::span::Span;

/// Ordem de preferência do resolvedor.
fn preference(a: &Span, b: &Span) -> Ordering {
    b.len()
        .cmp(&a.len())
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.start.cmp(&b.start))
}

/// Seleciona o conjunto final, disjunto e ordenado por início.
pub fn resolve_overlaps(candidates: &[Span]) -> Vec<Span> {
    let mut ordered: Vec<&Span> = candidates.iter().collect();
    ordered.sort_by(|a, b| preference(a, b));

    let width = candidates.iter().map(|s| s.end).max().unwrap_or(0);
    let mut claimed = vec![false; width];
    let mut kept: Vec<Span> = Vec::new();

    for span in ordered {
        if span.is_empty() {
            continue;
        }
        let range = span.start..span.end;
        if claimed[range.clone()].iter().any(|&used| used) {
            continue;
        }
        claimed[range].iter_mut().for_each(|used| *used = true);
        kept.push(span.clone());
    }

    kept.sort_by_key(|s| s.start);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, label: &str, priority: i32) -> Span {
        Span::new(start, end, label, priority)
    }

    fn assert_disjoint(spans: &[Span]) {
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_overlaps(&[]).is_empty());
    }

    #[test]
    fn test_longer_span_wins() {
        let out = resolve_overlaps(&[
            span(1, 2, "SCORE", 100),
            span(0, 3, "PERCENT_RANGE", 50),
        ]);
        assert_eq!(out, vec![span(0, 3, "PERCENT_RANGE", 50)]);
    }

    #[test]
    fn test_priority_breaks_length_ties() {
        let out = resolve_overlaps(&[span(0, 1, "PACK", 50), span(0, 1, "CORE", 100)]);
        assert_eq!(out, vec![span(0, 1, "CORE", 100)]);

        let out = resolve_overlaps(&[span(0, 1, "CORE", 100), span(0, 1, "PACK", 150)]);
        assert_eq!(out, vec![span(0, 1, "PACK", 150)]);
    }

    #[test]
    fn test_earlier_start_breaks_remaining_ties() {
        let out = resolve_overlaps(&[span(1, 3, "B", 50), span(0, 2, "A", 50)]);
        assert_eq!(out, vec![span(0, 2, "A", 50)]);
    }

    #[test]
    fn test_full_ties_keep_concatenation_order() {
        let core = span(2, 3, "SCORE", 100);
        let pack = span(2, 3, "AMOUNT", 100);
        assert_eq!(resolve_overlaps(&[core.clone(), pack.clone()]), vec![core.clone()]);
        assert_eq!(resolve_overlaps(&[pack.clone(), core]), vec![pack]);
    }

    #[test]
    fn test_output_sorted_and_disjoint() {
        let candidates = vec![
            span(5, 6, "YEAR", 100),
            span(0, 2, "TOPK", 100),
            span(1, 2, "SCORE", 100),
            span(3, 5, "DATE", 100),
            span(4, 5, "X", 50),
            span(8, 11, "SCORE", 100),
            span(8, 9, "SCORE", 100),
        ];
        let out = resolve_overlaps(&candidates);
        assert_disjoint(&out);
        let starts: Vec<usize> = out.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 3, 5, 8]);
        assert_eq!(out[3].len(), 3);
    }

    #[test]
    fn test_input_order_does_not_matter_for_distinct_keys() {
        let mut candidates = vec![
            span(0, 1, "MONTH", 100),
            span(1, 3, "MONTH", 100),
            span(2, 3, "MONTH", 100),
            span(3, 4, "YEAR", 100),
            span(2, 4, "X", 50),
        ];
        let expected = resolve_overlaps(&candidates);
        candidates.reverse();
        assert_eq!(resolve_overlaps(&candidates), expected);
        candidates.rotate_left(2);
        assert_eq!(resolve_overlaps(&candidates), expected);
    }

    #[test]
    fn test_greedy_prefers_long_over_count() {
        let out = resolve_overlaps(&[
            span(0, 1, "A", 100),
            span(1, 2, "B", 100),
            span(2, 3, "C", 100),
            span(0, 3, "LONG", 10),
        ]);
        assert_eq!(out, vec![span(0, 3, "LONG", 10)]);
    }
}
