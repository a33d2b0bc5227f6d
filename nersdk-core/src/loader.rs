//! # Carregador de Pacotes de Domínio
//!
//! Resolve um identificador de pacote para um [`DomainPack`]:
//!
//! 1. **Diretório**: se o identificador é um diretório existente, é um pacote
//!    de pasta. `patterns.yaml` e `hooks.yaml` são lidos dali; a ausência de
//!    qualquer um deles não é erro.
//! 2. **Módulo**: caso contrário, o identificador é um nome pontuado
//!    (`nersdk.domains.finance`) procurado em cada raiz de busca como
//!    `<raiz>/nersdk/domains/finance`. Um diretório com manifesto `pack.yaml`
//!    é um *pacote convencional* e vence mesmo que apareça numa raiz posterior;
//!    só quando nenhuma raiz tem manifesto o módulo é *namespace*, com porções
//!    em várias raízes e base na primeira porção. O
//!    submódulo `<nome>.hooks` corresponde ao `hooks.yaml` dentro da base.
//!
//! Identificador que não é diretório nem módulo resolvível resulta em
//! [`NerError::PackNotFound`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::config::LoaderConfig;
use crate::error::{NerError, Result};
use crate::hooks::{HookRegistry, HOOK_FILE};
use crate::pack::DomainPack;
use crate::pattern::{load_patterns, PATTERN_FILE};

/// Manifesto opcional de um pacote convencional.
pub const MANIFEST_FILE: &str = "pack.yaml";

/// Namespace dos pacotes distribuídos com o crate.
pub const BUILTIN_NAMESPACE: &str = "nersdk.domains";

/// Onde um módulo foi encontrado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleLocation {
    /// Diretório com `pack.yaml`.
    Package { manifest: PathBuf },
    /// Diretórios sem manifesto, um por raiz em que o módulo aparece.
    Namespace { portions: Vec<PathBuf> },
}

impl ModuleLocation {
    /// Diretório base do módulo.
    pub fn base(&self) -> &Path {
        match self {
            ModuleLocation::Package { manifest } => manifest.parent().unwrap_or(manifest),
            ModuleLocation::Namespace { portions } => portions
                .first()
                .map(PathBuf::as_path)
                .unwrap_or_else(|| Path::new(".")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackManifest {
    #[serde(default)]
    description: Option<String>,
}

/// Carregador configurado com raízes de busca e registro de hooks.
#[derive(Debug, Clone)]
pub struct PackLoader {
    config: LoaderConfig,
    hooks: HookRegistry,
}

impl Default for PackLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default(), HookRegistry::builtin())
    }
}

impl PackLoader {
    pub fn new(config: LoaderConfig, hooks: HookRegistry) -> Self {
        Self { config, hooks }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Carrega o pacote com a prioridade padrão da configuração.
    pub fn load(&self, identifier: &str) -> Result<DomainPack> {
        self.load_with_priority(identifier, self.config.default_priority)
    }

    pub fn load_with_priority(&self, identifier: &str, priority: i32) -> Result<DomainPack> {
        let (name, base) = self.locate(identifier)?;

        let description = read_manifest(&name, &base.join(MANIFEST_FILE))?.description;
        let patterns = load_patterns(&name, &base.join(PATTERN_FILE))?;
        let (hook, hook_status) = self.hooks.bind(&name, &base.join(HOOK_FILE))?;

        debug!(
            pack = %name,
            base = %base.display(),
            patterns = patterns.len(),
            hook = ?hook.as_ref().map(|h| h.name()),
            priority,
            "domain pack loaded"
        );

        Ok(DomainPack {
            name,
            base,
            description,
            patterns,
            hook,
            hook_status,
            priority,
        })
    }

    /// Nome do pacote e diretório base para `identifier`.
    pub fn locate(&self, identifier: &str) -> Result<(String, PathBuf)> {
        let path = Path::new(identifier);
        if path.is_dir() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| identifier.to_string());
            return Ok((name, path.to_path_buf()));
        }

        let location = self
            .resolve_module(identifier)
            .ok_or_else(|| NerError::PackNotFound {
                identifier: identifier.to_string(),
            })?;
        let name = identifier.rsplit('.').next().unwrap_or(identifier).to_string();
        Ok((name, location.base().to_path_buf()))
    }

    /// Procura o módulo pontuado `name` nas raízes de busca.
    pub fn resolve_module(&self, name: &str) -> Option<ModuleLocation> {
        let segments: Vec<&str> = name.split('.').collect();
        if !segments.iter().all(|s| is_identifier(s)) {
            return None;
        }

        let mut portions = Vec::new();
        for root in &self.config.search_roots {
            let dir = segments.iter().fold(root.clone(), |acc, s| acc.join(s));
            if !dir.is_dir() {
                continue;
            }
            let manifest = dir.join(MANIFEST_FILE);
            // pacote convencional em qualquer raiz vence porções namespace
            if manifest.is_file() {
                return Some(ModuleLocation::Package { manifest });
            }
            portions.push(dir);
        }

        if portions.is_empty() {
            None
        } else {
            Some(ModuleLocation::Namespace { portions })
        }
    }

    /// Lista os pacotes sob `nersdk.domains` em todas as raízes (ordenado, sem repetição).
    pub fn discover_builtin(&self) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for root in &self.config.search_roots {
            let dir = BUILTIN_NAMESPACE.split('.').fold(root.clone(), |acc, s| acc.join(s));
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if path.is_dir() && is_identifier(file_name) {
                    found.push(format!("{BUILTIN_NAMESPACE}.{file_name}"));
                }
            }
        }
        found.sort();
        found.dedup();
        found
    }
}

fn read_manifest(pack: &str, path: &Path) -> Result<PackManifest> {
    if !path.is_file() {
        return Ok(PackManifest::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| NerError::io(path, e))?;
    if raw.trim().is_empty() {
        return Ok(PackManifest::default());
    }
    serde_yaml::from_str(&raw).map_err(|e| NerError::config(pack, path, e.to_string()))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
