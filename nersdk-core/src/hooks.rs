//! # Hooks de Correspondência Customizada
//!
//! Quando uma entidade não pode ser expressa por `regex-token` ou `phrase`, o
//! pacote de domínio aponta para um **matcher customizado**. Como não há forma
//! segura de executar código a partir de um arquivo de dados, os matchers são
//! implementações compiladas do trait [`CustomMatcher`], registradas por nome
//! em um [`HookRegistry`]. O arquivo `hooks.yaml` do pacote apenas escolhe qual
//! deles usar:
//!
//! ```yaml
//! custom_match: finance.percent_range
//! ```
//!
//! ## Estados possíveis
//! - Sem `hooks.yaml`: [`HookStatus::Absent`].
//! - `hooks.yaml` sem `custom_match`, ou nomeando um matcher não registrado:
//!   o pacote roda sem hook, mas o diagnóstico reporta
//!   [`HookStatus::MissingCallable`].
//! - `hooks.yaml` que não é YAML válido: [`NerError::PackConfigInvalid`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{NerError, Result};
use crate::span::HookSpan;

/// Nome do arquivo de hook dentro do diretório base do pacote.
pub const HOOK_FILE: &str = "hooks.yaml";

/// Chave que nomeia o matcher dentro de `hooks.yaml`.
pub const HOOK_KEY: &str = "custom_match";

/// Capacidade de correspondência customizada de um pacote de domínio.
///
/// Recebe a sequência completa de tokens e devolve spans sem prioridade; o
/// aplicador de pacotes carimba a prioridade do pacote antes da resolução.
pub trait CustomMatcher: Send + Sync {
    fn find(&self, tokens: &[&str]) -> Vec<HookSpan>;
}

impl<F> CustomMatcher for F
where
    F: Fn(&[&str]) -> Vec<HookSpan> + Send + Sync,
{
    fn find(&self, tokens: &[&str]) -> Vec<HookSpan> {
        self(tokens)
    }
}

/// Matcher registrado, com o nome pelo qual foi encontrado.
#[derive(Clone)]
pub struct Hook {
    name: String,
    matcher: Arc<dyn CustomMatcher>,
}

impl Hook {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn find(&self, tokens: &[&str]) -> Vec<HookSpan> {
        self.matcher.find(tokens)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("name", &self.name).finish()
    }
}

/// Resultado da leitura do `hooks.yaml` de um pacote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HookStatus {
    /// Não há arquivo de hook.
    Absent,
    /// Arquivo existe e aponta para um matcher registrado.
    Loaded { matcher: String },
    /// Arquivo existe, mas não define um matcher utilizável.
    MissingCallable { reason: String },
}

/// Registro de matchers customizados, indexado por nome.
#[derive(Clone, Default)]
pub struct HookRegistry {
    matchers: BTreeMap<String, Arc<dyn CustomMatcher>>,
}

impl HookRegistry {
    /// Registro vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registro com os matchers dos pacotes embutidos.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("finance.percent_range", percent_range);
        registry.register("medical.frequency", frequency);
        registry
    }

    /// Registra (ou substitui) um matcher.
    pub fn register(&mut self, name: impl Into<String>, matcher: impl CustomMatcher + 'static) {
        self.matchers.insert(name.into(), Arc::new(matcher));
    }

    pub fn get(&self, name: &str) -> Option<Hook> {
        self.matchers.get(name).map(|matcher| Hook {
            name: name.to_string(),
            matcher: Arc::clone(matcher),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matchers.keys().map(String::as_str)
    }

    /// Lê o arquivo de hook em `path` e tenta vinculá-lo a um matcher.
    pub fn bind(&self, pack: &str, path: &Path) -> Result<(Option<Hook>, HookStatus)> {
        if !path.is_file() {
            return Ok((None, HookStatus::Absent));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| NerError::io(path, e))?;
        let doc: Value =
            serde_yaml::from_str(&raw).map_err(|e| NerError::config(pack, path, e.to_string()))?;

        let Some(name) = doc.get(HOOK_KEY).and_then(Value::as_str) else {
            let reason = format!("no '{HOOK_KEY}' entry");
            return Ok((None, HookStatus::MissingCallable { reason }));
        };
        match self.get(name) {
            Some(hook) => {
                let status = HookStatus::Loaded {
                    matcher: name.to_string(),
                };
                Ok((Some(hook), status))
            }
            None => {
                let reason = format!("matcher '{name}' is not registered");
                Ok((None, HookStatus::MissingCallable { reason }))
            }
        }
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.matchers.keys()).finish()
    }
}

/// `"at least <x>%"` → PERCENT_RANGE sobre os três tokens.
pub fn percent_range(tokens: &[&str]) -> Vec<HookSpan> {
    tokens
        .windows(3)
        .enumerate()
        .filter(|(_, w)| {
            w[0].eq_ignore_ascii_case("at") && w[1].eq_ignore_ascii_case("least") && w[2].ends_with('%')
        })
        .map(|(i, _)| HookSpan::new(i, i + 3, "PERCENT_RANGE"))
        .collect()
}

/// `"three times"` → FREQUENCY.
pub fn frequency(tokens: &[&str]) -> Vec<HookSpan> {
    tokens
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0].eq_ignore_ascii_case("three") && w[1].eq_ignore_ascii_case("times"))
        .map(|(i, _)| HookSpan::new(i, i + 2, "FREQUENCY"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_range() {
        let tokens = ["growth", "At", "least", "4%", "expected", "at", "least"];
        assert_eq!(percent_range(&tokens), vec![HookSpan::new(1, 4, "PERCENT_RANGE")]);
    }

    #[test]
    fn test_frequency() {
        let tokens = ["take", "THREE", "times", "daily"];
        assert_eq!(frequency(&tokens), vec![HookSpan::new(1, 3, "FREQUENCY")]);
        assert!(frequency(&["three"]).is_empty());
    }

    #[test]
    fn test_closures_are_matchers() {
        let mut registry = HookRegistry::new();
        registry.register("custom.first", |tokens: &[&str]| {
            if tokens.is_empty() {
                vec![]
            } else {
                vec![HookSpan::new(0, 1, "FIRST")]
            }
        });
        let hook = registry.get("custom.first").unwrap();
        assert_eq!(hook.name(), "custom.first");
        assert_eq!(hook.find(&["a", "b"]).len(), 1);
    }

    #[test]
    fn test_bind_states() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HOOK_FILE);
        let registry = HookRegistry::builtin();

        let (hook, status) = registry.bind("p", &path).unwrap();
        assert!(hook.is_none());
        assert_eq!(status, HookStatus::Absent);

        std::fs::write(&path, "custom_match: finance.percent_range\n").unwrap();
        let (hook, status) = registry.bind("p", &path).unwrap();
        assert_eq!(hook.unwrap().name(), "finance.percent_range");
        assert!(matches!(status, HookStatus::Loaded { .. }));

        std::fs::write(&path, "something_else: 1\n").unwrap();
        let (hook, status) = registry.bind("p", &path).unwrap();
        assert!(hook.is_none());
        assert!(matches!(status, HookStatus::MissingCallable { .. }));

        std::fs::write(&path, "custom_match: nowhere.to_be_found\n").unwrap();
        let (hook, status) = registry.bind("p", &path).unwrap();
        assert!(hook.is_none());
        assert!(matches!(status, HookStatus::MissingCallable { .. }));

        std::fs::write(&path, "custom_match: [").unwrap();
        let err = registry.bind("p", &path).unwrap_err();
        assert_eq!(err.kind(), "PackConfigInvalid");
    }
}
