//! # Pipeline de Rotulagem
//!
//! Orquestra os estágios para um texto:
//!
//! 1. Tokenização por espaços ([`crate::tokenizer`]).
//! 2. Regras nativas ([`crate::rules`]).
//! 3. Para cada pacote pedido: carregamento ([`crate::loader`]) e aplicação
//!    ([`crate::pack::apply_pack`]).
//! 4. Concatenação dos candidatos e resolução ([`crate::resolve`]).
//! 5. Codificação BIO ([`crate::tagger`]).
//!
//! Falha ao carregar qualquer pacote aborta a chamada inteira; não há
//! degradação parcial. Pacotes são recarregados a cada chamada.
//!
//! O processamento em lote ([`Labeler::bulk_tag`]) roda em paralelo com Rayon,
//! preservando a ordem dos textos na saída e do erro reportado.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::loader::PackLoader;
use crate::pack::apply_pack;
use crate::records::Record;
use crate::resolve::resolve_overlaps;
use crate::rules::RuleEngine;
use crate::span::Span;
use crate::tagger::{encode, tags_to_string, Tag};
use crate::tokenizer::{token_texts, tokenize, Token};

/// Resultado completo da análise de um texto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    /// Spans finais, disjuntos e ordenados por início.
    pub spans: Vec<Span>,
    /// Uma tag por token.
    pub tags: Vec<Tag>,
}

impl Analysis {
    /// Tags separadas por espaço (campo `labels`).
    pub fn labels(&self) -> String {
        tags_to_string(&self.tags)
    }
}

/// O rotulador principal: regras nativas + carregador de pacotes.
#[derive(Debug, Clone, Default)]
pub struct Labeler {
    rules: RuleEngine,
    loader: PackLoader,
}

impl Labeler {
    pub fn new(loader: PackLoader) -> Self {
        Self {
            rules: RuleEngine::new(),
            loader,
        }
    }

    pub fn loader(&self) -> &PackLoader {
        &self.loader
    }

    /// Todos os spans candidatos, na ordem de concatenação usada no desempate:
    /// regras nativas primeiro, depois cada pacote na ordem pedida.
    pub fn candidates<S: AsRef<str>>(&self, tokens: &[&str], domains: &[S]) -> Result<Vec<Span>> {
        let mut spans = self.rules.apply(tokens);
        for domain in domains {
            let pack = self.loader.load(domain.as_ref())?;
            spans.extend(apply_pack(&pack, tokens));
        }
        Ok(spans)
    }

    /// Executa o pipeline completo para um texto.
    pub fn analyze<S: AsRef<str>>(&self, text: &str, domains: &[S]) -> Result<Analysis> {
        let tokens = tokenize(text);
        let texts = token_texts(&tokens);

        let candidates = self.candidates(&texts, domains)?;
        let spans = resolve_overlaps(&candidates);
        let tags = encode(tokens.len(), &spans);

        debug!(
            tokens = tokens.len(),
            candidates = candidates.len(),
            resolved = spans.len(),
            "text labeled"
        );

        Ok(Analysis { tokens, spans, tags })
    }

    /// Tags BIO do texto, separadas por espaço.
    pub fn generate_labels<S: AsRef<str>>(&self, text: &str, domains: &[S]) -> Result<String> {
        Ok(self.analyze(text, domains)?.labels())
    }

    pub fn tag_text<S: AsRef<str>>(&self, text: &str, domains: &[S]) -> Result<Record> {
        Ok(Record {
            text: text.to_string(),
            labels: self.generate_labels(text, domains)?,
        })
    }

    /// Rotula vários textos em paralelo.
    ///
    /// Qualquer falha descarta o lote; o erro devolvido é o do texto de menor
    /// índice que falhou, independente da ordem de execução das threads.
    pub fn bulk_tag<T, S>(&self, texts: &[T], domains: &[S]) -> Result<Vec<Record>>
    where
        T: AsRef<str> + Sync,
        S: AsRef<str> + Sync,
    {
        let results: Vec<Result<Record>> = texts
            .par_iter()
            .map(|text| self.tag_text(text.as_ref(), domains))
            .collect();
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use crate::hooks::HookRegistry;
    use crate::span::HookSpan;

    const NO_PACKS: &[&str] = &[];

    #[test]
    fn test_core_only_labels() {
        let labeler = Labeler::default();
        let labels = labeler.generate_labels("top 10 in 2019", NO_PACKS).unwrap();
        assert_eq!(labels, "B-TOPK I-TOPK O B-YEAR");
    }

    #[test]
    fn test_empty_text() {
        let labeler = Labeler::default();
        let analysis = labeler.analyze("   ", NO_PACKS).unwrap();
        assert!(analysis.tokens.is_empty());
        assert_eq!(analysis.labels(), "");
    }

    #[test]
    fn test_tags_align_with_tokens() {
        let labeler = Labeler::default();
        let text = "analyze reviews from sept 2012 to dec 2013";
        let analysis = labeler.analyze(text, NO_PACKS).unwrap();
        assert_eq!(analysis.tags.len(), text.split_whitespace().count());
    }

    #[test]
    fn test_missing_pack_aborts_call() {
        let labeler = Labeler::default();
        let err = labeler
            .generate_labels("sales in 2019", &["nersdk.domains.finance", "nersdk.domains.nope"])
            .unwrap_err();
        assert_eq!(err.kind(), "PackNotFound");
    }

    #[test]
    fn test_custom_hook_through_folder_pack() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hooks.yaml"), "custom_match: test.shout\n").unwrap();

        let mut hooks = HookRegistry::builtin();
        hooks.register("test.shout", |tokens: &[&str]| {
            tokens
                .iter()
                .enumerate()
                .filter(|(_, t)| t.ends_with('!'))
                .map(|(i, _)| HookSpan::new(i, i + 1, "SHOUT"))
                .collect()
        });
        let labeler = Labeler::new(PackLoader::new(LoaderConfig::default(), hooks));
        let pack_id = dir.path().to_str().unwrap();
        let labels = labeler.generate_labels("stop now!", &[pack_id]).unwrap();
        assert_eq!(labels, "O B-SHOUT");
    }

    #[test]
    fn test_bulk_tag_reports_pack_error() {
        let labeler = Labeler::default();
        let texts: Vec<String> = (0..20).map(|i| format!("top {i}")).collect();
        let err = labeler
            .bulk_tag(&texts, &["nersdk.domains.finance", "nersdk.domains.missing"])
            .unwrap_err();
        assert_eq!(err.kind(), "PackNotFound");
        assert!(err.to_string().contains("nersdk.domains.missing"));

        let empty: Vec<String> = Vec::new();
        assert!(labeler.bulk_tag(&empty, &["nersdk.domains.missing"]).unwrap().is_empty());
    }

    #[test]
    fn test_bulk_tag_preserves_order() {
        let labeler = Labeler::default();
        let texts: Vec<String> = (0..50).map(|i| format!("item {i} of 2020")).collect();
        let records = labeler.bulk_tag(&texts, NO_PACKS).unwrap();
        assert_eq!(records.len(), texts.len());
        for (record, text) in records.iter().zip(&texts) {
            assert_eq!(&record.text, text);
            assert_eq!(record.labels, "O B-SCORE O B-YEAR");
        }
    }
}
