//! # Entradas de Dicionário e Anotações
//!
//! [`DictionaryEntry`] é o payload guardado nos nós terminais da trie; [`Annotation`]
//! é o que o annotator devolve para cada ocorrência encontrada no texto.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Significado de uma entrada: rótulo de superfície, tipo e tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Texto cru da linha de dicionário (antes do TAB).
    pub surface: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub tags: Vec<String>,
}

impl DictionaryEntry {
    pub fn new(surface: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            entry_type: entry_type.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn first_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl fmt::Display for DictionaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.entry_type, self.surface)?;
        if !self.tags.is_empty() {
            write!(f, " [{}]", self.tags.join(", "))?;
        }
        Ok(())
    }
}

/// Um passo do match: superfície do token e chave de padrão que o aceitou.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStep {
    pub surface: String,
    pub pattern: String,
}

/// Uma ocorrência de entrada de dicionário no texto.
///
/// Anotações podem se sobrepor ("New York" e "New York City"); resolver
/// sobreposições é tarefa de quem consome a lista.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Trecho do texto original coberto (ex: "New York City")
    pub text: String,
    /// Posição de byte inicial no texto original
    pub start: usize,
    /// Posição de byte final no texto original (exclusiva)
    pub end: usize,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do último token (inclusivo)
    pub end_token: usize,
    pub entry: DictionaryEntry,
    /// Pares (superfície, padrão) que produziram o match. Vazio na variante whitelist.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<MatchStep>,
}

impl Annotation {
    pub fn entry_type(&self) -> &str {
        &self.entry.entry_type
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}] '{}' {}", self.start, self.end, self.text, self.entry)
    }
}
