//! # Diagnóstico de Pacotes
//!
//! Verifica um ou mais pacotes de domínio sem interromper o lote na primeira
//! falha: cada identificador gera um [`PackReport`] independente, distinguindo
//! "não encontrado" de "encontrado mas quebrado" e "hook sem matcher".

use serde::{Deserialize, Serialize};

use crate::hooks::HookStatus;
use crate::loader::PackLoader;
use crate::pack::PackInfo;
use crate::pattern::PATTERN_FILE;

/// Estado do `patterns.yaml` de um pacote carregado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatternFileStatus {
    Found { count: usize },
    Missing,
}

/// Resultado da verificação de um identificador.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PackCheck {
    /// O carregamento falhou; `kind` é o nome da variante de `NerError`.
    Failed { kind: String, message: String },
    Loaded {
        info: PackInfo,
        patterns: PatternFileStatus,
        hook: HookStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackReport {
    pub identifier: String,
    pub outcome: PackCheck,
}

impl PackReport {
    /// Falso se o pacote não carregou, não tem `patterns.yaml`, ou tem um
    /// `hooks.yaml` sem matcher utilizável.
    pub fn is_healthy(&self) -> bool {
        match &self.outcome {
            PackCheck::Failed { .. } => false,
            PackCheck::Loaded { patterns, hook, .. } => {
                matches!(patterns, PatternFileStatus::Found { .. })
                    && !matches!(hook, HookStatus::MissingCallable { .. })
            }
        }
    }
}

/// Verifica um pacote.
pub fn check_pack(loader: &PackLoader, identifier: &str) -> PackReport {
    let outcome = match loader.load(identifier) {
        Err(err) => PackCheck::Failed {
            kind: err.kind().to_string(),
            message: err.to_string(),
        },
        Ok(pack) => {
            let patterns = if pack.base.join(PATTERN_FILE).is_file() {
                PatternFileStatus::Found {
                    count: pack.patterns.len(),
                }
            } else {
                PatternFileStatus::Missing
            };
            PackCheck::Loaded {
                info: pack.info(),
                patterns,
                hook: pack.hook_status.clone(),
            }
        }
    };
    PackReport {
        identifier: identifier.to_string(),
        outcome,
    }
}

/// Verifica vários pacotes, um relatório por identificador, na ordem pedida.
pub fn check_packs<S: AsRef<str>>(loader: &PackLoader, identifiers: &[S]) -> Vec<PackReport> {
    identifiers
        .iter()
        .map(|id| check_pack(loader, id.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HOOK_FILE;
    use std::fs;

    #[test]
    fn test_builtin_packs_are_healthy() {
        let loader = PackLoader::default();
        let reports = check_packs(&loader, &["nersdk.domains.finance", "nersdk.domains.medical"]);
        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert!(report.is_healthy(), "{report:?}");
        }
    }

    #[test]
    fn test_batch_continues_after_failures() {
        let broken = tempfile::tempdir().unwrap();
        fs::write(broken.path().join(PATTERN_FILE), "entities: {").unwrap();
        let broken_id = broken.path().to_str().unwrap().to_string();

        let loader = PackLoader::default();
        let reports = check_packs(
            &loader,
            &[
                "nersdk.domains.missing".to_string(),
                broken_id,
                "nersdk.domains.finance".to_string(),
            ],
        );
        let kinds: Vec<Option<&str>> = reports
            .iter()
            .map(|r| match &r.outcome {
                PackCheck::Failed { kind, .. } => Some(kind.as_str()),
                PackCheck::Loaded { .. } => None,
            })
            .collect();
        assert_eq!(kinds, vec![Some("PackNotFound"), Some("PackConfigInvalid"), None]);
        assert!(reports[2].is_healthy());
    }

    #[test]
    fn test_missing_patterns_and_unbound_hook_are_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PackLoader::default();
        let id = dir.path().to_str().unwrap();

        let report = check_pack(&loader, id);
        assert!(matches!(
            report.outcome,
            PackCheck::Loaded {
                patterns: PatternFileStatus::Missing,
                hook: HookStatus::Absent,
                ..
            }
        ));
        assert!(!report.is_healthy());

        fs::write(dir.path().join(PATTERN_FILE), "entities: []\n").unwrap();
        fs::write(dir.path().join(HOOK_FILE), "# sem matcher\n").unwrap();
        let report = check_pack(&loader, id);
        let PackCheck::Loaded { patterns, hook, .. } = &report.outcome else {
            panic!("expected loaded pack");
        };
        assert_eq!(*patterns, PatternFileStatus::Found { count: 0 });
        assert!(matches!(hook, HookStatus::MissingCallable { .. }));
        assert!(!report.is_healthy());
    }
}
