//! # Erros do nersdk
//!
//! Taxonomia de falhas expostas pelo núcleo. Cada variante carrega contexto
//! suficiente para que ferramentas de diagnóstico em lote possam atribuir a
//! falha a um pacote ou registro específico e continuar verificando os demais.
//!
//! | Variante              | Quando ocorre                                              |
//! |-----------------------|------------------------------------------------------------|
//! | `PackNotFound`        | Identificador não é diretório nem módulo resolvível         |
//! | `PackConfigInvalid`   | Pacote encontrado, mas `patterns.yaml`/`hooks.yaml` quebrado |
//! | `RecordFormatInvalid` | Registro sem `text`/`labels` ao carregar JSON/JSONL         |

use std::path::PathBuf;

use thiserror::Error;

/// Erros produzidos pelas operações do núcleo.
#[derive(Debug, Error)]
pub enum NerError {
    /// O identificador não corresponde a um diretório existente nem a um
    /// módulo encontrado nas raízes de busca.
    #[error("domain pack '{identifier}' not found (not a directory nor a resolvable module)")]
    PackNotFound { identifier: String },

    /// O pacote existe, mas um de seus arquivos declarativos está malformado.
    #[error("domain pack '{pack}' has an invalid config file {}: {message}", path.display())]
    PackConfigInvalid {
        pack: String,
        path: PathBuf,
        message: String,
    },

    /// Um registro armazenado não possui os campos obrigatórios.
    ///
    /// `position` é o índice do elemento (JSON, base 0) ou o número da linha
    /// (JSONL, base 1), conforme descrito em `message`.
    #[error("invalid record in {} at {position}: {message}", path.display())]
    RecordFormatInvalid {
        path: PathBuf,
        position: usize,
        message: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl NerError {
    /// Nome estável da variante, usado em relatórios serializados.
    pub fn kind(&self) -> &'static str {
        match self {
            NerError::PackNotFound { .. } => "PackNotFound",
            NerError::PackConfigInvalid { .. } => "PackConfigInvalid",
            NerError::RecordFormatInvalid { .. } => "RecordFormatInvalid",
            NerError::Io { .. } => "Io",
            NerError::Json { .. } => "Json",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NerError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(pack: &str, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        NerError::PackConfigInvalid {
            pack: pack.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Alias de `Result` usado em todo o crate.
pub type Result<T> = std::result::Result<T, NerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_distinct() {
        let not_found = NerError::PackNotFound {
            identifier: "x.y".into(),
        };
        let invalid = NerError::config("x", "x/patterns.yaml", "bad");
        assert_eq!(not_found.kind(), "PackNotFound");
        assert_eq!(invalid.kind(), "PackConfigInvalid");
        assert!(invalid.to_string().contains("x/patterns.yaml"));
    }
}
