//! # Erros do Motor de Padrões
//!
//! Três níveis: [`PatternError`] para a sintaxe de um segmento isolado,
//! [`LoadError`] para a leitura de dicionários (com o contexto de arquivo e linha)
//! e [`Error`], o tipo de erro público do crate.

use std::path::PathBuf;

/// Erro de sintaxe em um segmento de padrão.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("malformed quantifier `{0}`: expected `*`, or `*{{m,n}}` with decimal bounds")]
    Quantifier(String),
    #[error("inverted quantifier bounds in `{raw}`: min {min} > max {max}")]
    InvertedQuantifier { raw: String, min: usize, max: usize },
}

/// Erro ao carregar um dicionário. Sempre fatal para a inicialização.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("dictionary location not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{origin}:{line}: invalid entry `{text}`: {source}")]
    Pattern {
        origin: String,
        line: usize,
        text: String,
        #[source]
        source: PatternError,
    },
}

/// Erro público do crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("invalid matcher configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
