//! # Matchers de Segmento
//!
//! Decide se um token aceita a aresta de um nó da trie. Há duas variantes,
//! escolhidas pelo parâmetro genérico do annotator:
//!
//! - [`WhitelistMatcher`]: arestas são strings exatas; procurar o próximo nó é um
//!   único acesso ao índice do nó.
//! - [`PatternMatcher`]: arestas são [`Segment`]s da mini-linguagem de padrões
//!   (superfície, raiz, classe gramatical, morfologia, wildcards).
//!
//! Os wildcards de comprimento variável (`*`, `*{m,n}`) não são decididos aqui:
//! eles mudam *quantos* tokens são consumidos, então o scanner os trata.

use std::borrow::Cow;

use crate::config::{MatcherConfig, MorphologyConfig};
use crate::error::PatternError;
use crate::segment::{PatternKey, Segment, ValuePattern, FIELD_DIVIDER};
use crate::tokenizer::Token;
use crate::trie::{Edge, Node};

/// Estratégia de comparação token × aresta.
pub trait SegmentMatcher: Send + Sync {
    fn from_config(config: &MatcherConfig) -> Self
    where
        Self: Sized;

    /// Forma da chave guardada na trie para o texto `raw` do dicionário.
    fn normalize_key(&self, raw: &str) -> String;

    /// Compila a chave de uma aresta. Chamado na carga, onde erros são fatais.
    fn compile(&self, raw: &str) -> Result<Segment, PatternError>;

    /// O token aceita este segmento? Gaps são tratados pelo scanner.
    fn matches(&self, token: &Token, segment: &Segment) -> bool;

    /// Arestas de `node` que podem aceitar `token`.
    fn candidate_edges<'t, T>(&self, node: &'t Node<T>, _token: &Token) -> Vec<&'t Edge> {
        node.edges().iter().collect()
    }

    /// Registrar os pares (superfície, padrão) de cada match?
    fn records_provenance(&self) -> bool {
        true
    }
}

/// Igualdade exata de superfície.
#[derive(Debug, Clone)]
pub struct WhitelistMatcher {
    ignore_case: bool,
}

impl WhitelistMatcher {
    pub fn new(ignore_case: bool) -> Self {
        Self { ignore_case }
    }

    fn normalize<'s>(&self, s: &'s str) -> Cow<'s, str> {
        if self.ignore_case {
            Cow::Owned(s.to_lowercase())
        } else {
            Cow::Borrowed(s)
        }
    }
}

impl SegmentMatcher for WhitelistMatcher {
    fn from_config(config: &MatcherConfig) -> Self {
        Self::new(config.ignore_case)
    }

    fn normalize_key(&self, raw: &str) -> String {
        self.normalize(raw).into_owned()
    }

    fn compile(&self, raw: &str) -> Result<Segment, PatternError> {
        Ok(Segment::Literal(self.normalize_key(raw)))
    }

    fn matches(&self, token: &Token, segment: &Segment) -> bool {
        match segment {
            Segment::Literal(key) => self.normalize(&token.surface) == key.as_str(),
            _ => false,
        }
    }

    fn candidate_edges<'t, T>(&self, node: &'t Node<T>, token: &Token) -> Vec<&'t Edge> {
        node.edge(&self.normalize(&token.surface)).into_iter().collect()
    }

    fn records_provenance(&self) -> bool {
        false
    }
}

/// Matcher da mini-linguagem de padrões.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    ignore_case: bool,
    divider_escape: char,
    morphology: MorphologyConfig,
}

impl PatternMatcher {
    pub fn new(ignore_case: bool, divider_escape: char, morphology: MorphologyConfig) -> Self {
        Self {
            ignore_case,
            divider_escape,
            morphology,
        }
    }

    /// `.` no valor do token vira o caractere de escape, já que separa campos no padrão.
    fn escape<'s>(&self, value: &'s str) -> Cow<'s, str> {
        if value.contains(FIELD_DIVIDER) {
            Cow::Owned(value.replace(FIELD_DIVIDER, self.divider_escape.encode_utf8(&mut [0; 4])))
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Compara um valor pontual com um campo de padrão.
    pub fn segment_matches(&self, value: &str, pattern: &ValuePattern, ignore_case: bool) -> bool {
        pattern.matches(&self.escape(value), ignore_case, &self.morphology)
    }

    /// Os quatro campos da chave: superfície, raiz, classe gramatical, morfologia.
    pub fn key_matches(&self, token: &Token, key: &PatternKey) -> bool {
        if let Some(surface) = &key.surface {
            if !self.segment_matches(&token.surface, surface, self.ignore_case) {
                return false;
            }
        }
        if let Some(root) = &key.root {
            if !self.optional_matches(token.root.as_deref(), root, self.ignore_case) {
                return false;
            }
        }
        if let Some(pos) = &key.pos {
            if !self.optional_matches(token.pos.as_deref(), pos, true) {
                return false;
            }
        }
        if let Some(morph) = &key.morph {
            match token.morph.as_deref() {
                Some(features) if morph.matches(features) => {}
                _ => return false,
            }
        }
        true
    }

    /// Campo vazio aceita atributo ausente; campo preenchido exige o atributo.
    fn optional_matches(&self, value: Option<&str>, pattern: &ValuePattern, ignore_case: bool) -> bool {
        match value {
            Some(value) => self.segment_matches(value, pattern, ignore_case),
            None => pattern.raw.is_empty(),
        }
    }
}

impl SegmentMatcher for PatternMatcher {
    fn from_config(config: &MatcherConfig) -> Self {
        Self::new(config.ignore_case, config.divider_escape, config.morphology)
    }

    fn normalize_key(&self, raw: &str) -> String {
        raw.to_string()
    }

    fn compile(&self, raw: &str) -> Result<Segment, PatternError> {
        Segment::parse(raw, &self.morphology)
    }

    fn matches(&self, token: &Token, segment: &Segment) -> bool {
        match segment {
            Segment::Any => true,
            Segment::Key(key) => self.key_matches(token, key),
            // `compile` nunca produz `Literal`; gaps são do scanner
            Segment::Literal(_) | Segment::Gap(_) => false,
        }
    }
}
