//! # Configuração do Carregador de Pacotes
//!
//! Define onde nomes lógicos de módulo (ex: `nersdk.domains.finance`) são
//! procurados e qual prioridade os pacotes recebem por padrão.
//!
//! - [`LoaderConfig::default`]: apenas a raiz embutida (`packs/` deste crate).
//! - [`LoaderConfig::from_env`]: as entradas de `NERSDK_PACK_PATH` (sintaxe de
//!   lista de caminhos da plataforma) vêm antes da raiz embutida.

use std::path::PathBuf;

use crate::span::DEFAULT_PACK_PRIORITY;

/// Variável de ambiente com raízes adicionais de busca.
pub const PACK_PATH_ENV: &str = "NERSDK_PACK_PATH";

/// Raiz com os pacotes distribuídos junto com o crate.
pub fn builtin_pack_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("packs")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Raízes onde módulos são resolvidos, em ordem de precedência.
    pub search_roots: Vec<PathBuf>,
    /// Prioridade usada por `PackLoader::load`.
    pub default_priority: i32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            search_roots: vec![builtin_pack_root()],
            default_priority: DEFAULT_PACK_PRIORITY,
        }
    }
}

impl LoaderConfig {
    /// Configuração padrão acrescida das raízes de `NERSDK_PACK_PATH`.
    pub fn from_env() -> Self {
        let extra = std::env::var_os(PACK_PATH_ENV)
            .map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();
        Self::default().with_roots(extra)
    }

    /// Acrescenta raízes à frente das já configuradas; entradas vazias são ignoradas.
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut merged: Vec<PathBuf> = roots
            .into_iter()
            .filter(|root| !root.as_os_str().is_empty())
            .collect();
        merged.append(&mut self.search_roots);
        self.search_roots = merged;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }
}
