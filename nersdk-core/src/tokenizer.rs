//! # Tokenizador por Espaços em Branco
//!
//! O texto bruto é dividido apenas em espaços em branco (mesma semântica de
//! `str::split_whitespace`). Não há separação de pontuação: `"5%"`, `"$150"` e
//! `"top-10"` continuam sendo um único token, e é exatamente isso que as regras
//! nativas e os pacotes de domínio esperam.
//!
//! Os spans são sempre endereçados por **índice de token**, nunca por offset de
//! caractere. Ainda assim cada [`Token`] guarda sua posição de byte no texto
//! original para que o servidor web consiga destacar as entidades.
//!
//! ```rust
//! use nersdk_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("AAPL rose 5%");
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[2].text, "5%");
//! ```

use serde::{Deserialize, Serialize};

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "AAPL", "5%", "top-10").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Tokeniza um texto separando em espaços em branco.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current_start: Option<usize> = None;

    for (byte_pos, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(start) = current_start.take() {
                push_token(&mut tokens, text, start, byte_pos);
            }
        } else if current_start.is_none() {
            current_start = Some(byte_pos);
        }
    }

    if let Some(start) = current_start {
        push_token(&mut tokens, text, start, text.len());
    }

    tokens
}

/// Visão apenas textual dos tokens, no formato consumido pelos matchers.
pub fn token_texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

fn push_token(tokens: &mut Vec<Token>, text: &str, start: usize, end: usize) {
    let index = tokens.len();
    tokens.push(Token {
        text: text[start..end].to_string(),
        start,
        end,
        index,
    });
}
