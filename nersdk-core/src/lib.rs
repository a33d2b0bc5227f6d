//! # nersdk-core: Rotulagem BIO por Regras e Pacotes de Domínio
//!
//! Este crate gera rótulos BIO (uma tag por token) para textos de consulta,
//! combinando regras nativas de alta precisão com **pacotes de domínio**
//! plugáveis. Não há modelo estatístico: toda decisão é determinística.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Tokenização** ([`tokenizer`]): divisão por espaços, preservando offsets.
//! 2.  **Regras nativas** ([`rules`]): MONTH, YEAR, DATE, TOPK e SCORE.
//! 3.  **Pacotes de domínio** ([`loader`], [`pack`]): padrões declarativos
//!     ([`pattern`]) e um matcher customizado opcional ([`hooks`]).
//! 4.  **Resolução** ([`resolve`]): escolha gulosa de spans sem sobreposição.
//! 5.  **Codificação** ([`tagger`]): spans finais → `B-X` / `I-X` / `O`.
//!
//! O orquestrador é o [`pipeline::Labeler`]. Registros rotulados são lidos e
//! gravados por [`records`]; a saúde dos pacotes é verificada por
//! [`diagnostics`].
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use nersdk_core::Labeler;
//!
//! let labeler = Labeler::default();
//! let labels = labeler
//!     .generate_labels("top 10 brands in 2019", &["nersdk.domains.finance"])
//!     .unwrap();
//! assert_eq!(labels, "B-TOPK I-TOPK O O B-YEAR");
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod pack;
pub mod pattern;
pub mod pipeline;
pub mod records;
pub mod resolve;
pub mod rules;
pub mod span;
pub mod tagger;
pub mod tokenizer;

pub use config::LoaderConfig;
pub use error::{NerError, Result};
pub use hooks::{CustomMatcher, HookRegistry, HookStatus};
pub use loader::PackLoader;
pub use pack::{DomainPack, PackInfo};
pub use pipeline::{Analysis, Labeler};
pub use records::{Record, RecordFormat};
pub use span::{HookSpan, Span, CORE_PRIORITY, DEFAULT_PACK_PRIORITY};
pub use tagger::{Tag, TagSpan};
pub use tokenizer::Token;
