//! # Mini-linguagem de Segmentos
//!
//! Cada posição de uma entrada de dicionário é um segmento. O segmento é compilado
//! uma única vez, na carga do dicionário, para um [`Segment`]:
//!
//! | Forma          | Significado                                               |
//! |----------------|-----------------------------------------------------------|
//! | `+`            | exatamente um token qualquer                              |
//! | `*`            | zero ou mais tokens (equivale a `*{0,∞}`)                 |
//! | `*{m,n}`       | entre `m` e `n` tokens (inclusive)                        |
//! | `sup.raiz.pos.morph` | chave de padrão com até quatro campos               |
//!
//! Os campos 0 a 2 (superfície, raiz, classe gramatical) aceitam:
//! `""` (qualquer valor), literal, `(a|b|c)`, `/sufixo`, `prefixo/` e `base~`.
//! O campo 3 (morfologia) é um conjunto de traços separados por `|` que precisam
//! estar **todos** presentes no token (semântica E, não OU).
//!
//! ## Exemplo
//!
//! ```rust
//! use patmatch_core::config::MorphologyConfig;
//! use patmatch_core::segment::{Quantifier, Segment};
//!
//! let seg = Segment::parse("*{1,3}", &MorphologyConfig::default()).unwrap();
//! assert_eq!(seg, Segment::Gap(Quantifier { min: 1, max: Some(3) }));
//!
//! assert!(Segment::parse("*{3,1}", &MorphologyConfig::default()).is_err());
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::config::MorphologyConfig;
use crate::error::PatternError;

/// Separador dos campos de uma chave de padrão.
pub const FIELD_DIVIDER: char = '.';

/// Segmento compilado, rótulo de uma aresta da trie.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Igualdade exata de string (variante whitelist).
    Literal(String),
    /// Chave de padrão multi-campo.
    Key(PatternKey),
    /// `+`: consome exatamente um token.
    Any,
    /// `*` / `*{m,n}`: consome um número variável de tokens.
    Gap(Quantifier),
}

impl Segment {
    /// Compila o texto de um segmento de padrão.
    pub fn parse(raw: &str, morphology: &MorphologyConfig) -> Result<Self, PatternError> {
        if raw == "+" {
            return Ok(Segment::Any);
        }
        if raw.starts_with('*') {
            return Quantifier::parse(raw).map(Segment::Gap);
        }
        Ok(Segment::Key(PatternKey::parse(raw, morphology)))
    }

    /// Arestas de gap com mínimo zero podem ser atravessadas sem consumir token.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Segment::Gap(q) if q.min == 0)
    }
}

/// Limites de um wildcard de comprimento variável.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub min: usize,
    /// `None` para `*` sem limite superior.
    pub max: Option<usize>,
}

impl Quantifier {
    pub const UNBOUNDED: Quantifier = Quantifier { min: 0, max: None };

    fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw == "*" {
            return Ok(Self::UNBOUNDED);
        }
        let caps = quantifier_regex()
            .captures(raw)
            .ok_or_else(|| PatternError::Quantifier(raw.to_string()))?;
        let bound = |i: usize| -> Result<usize, PatternError> {
            caps[i]
                .parse()
                .map_err(|_| PatternError::Quantifier(raw.to_string()))
        };
        let (min, max) = (bound(1)?, bound(2)?);
        if min > max {
            return Err(PatternError::InvertedQuantifier {
                raw: raw.to_string(),
                min,
                max,
            });
        }
        Ok(Self {
            min,
            max: Some(max),
        })
    }

    /// O gap ainda pode consumir o `taken`-ésimo token?
    pub fn allows(&self, taken: usize) -> bool {
        self.max.map_or(true, |max| taken <= max)
    }

    /// Com `taken` tokens consumidos o padrão já pode continuar?
    pub fn satisfied(&self, taken: usize) -> bool {
        taken >= self.min
    }
}

fn quantifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\{\s*(\d+)\s*,\s*(\d+)\s*\}$").expect("quantifier regex"))
}

/// Chave de padrão: até quatro campos separados por `.`.
///
/// Um campo ausente (chave mais curta) não é verificado.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternKey {
    pub surface: Option<ValuePattern>,
    pub root: Option<ValuePattern>,
    pub pos: Option<ValuePattern>,
    pub morph: Option<MorphPattern>,
}

impl PatternKey {
    pub fn parse(raw: &str, morphology: &MorphologyConfig) -> Self {
        let mut fields: Vec<&str> = raw.split(FIELD_DIVIDER).collect();
        // `haus.` equivale a `haus`
        while fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
        let value = |i: usize| fields.get(i).map(|f| ValuePattern::parse(f, morphology, true));
        Self {
            surface: value(0),
            root: value(1),
            pos: value(2),
            morph: fields.get(3).map(|f| MorphPattern::parse(f)),
        }
    }
}

/// Padrão de um campo de valor (superfície, raiz ou classe gramatical).
#[derive(Debug, Clone, PartialEq)]
pub struct ValuePattern {
    /// Texto do campo como escrito no dicionário.
    pub raw: String,
    pub form: ValueForm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueForm {
    /// Campo vazio: aceita qualquer valor.
    Empty,
    /// Somente igualdade com `raw`.
    Literal,
    /// `/sufixo` (armazenado em minúsculas).
    Suffix(String),
    /// `prefixo/` (armazenado em minúsculas).
    Prefix(String),
    /// `base~`. `stem` é `None` quando a base é curta demais para o `strip` configurado.
    Tilde { stem: Option<String> },
    /// `(a|b|c)`, um único nível.
    Alternation(Vec<ValuePattern>),
}

impl ValuePattern {
    fn parse(raw: &str, morphology: &MorphologyConfig, allow_alternation: bool) -> Self {
        let form = if raw.is_empty() {
            ValueForm::Empty
        } else if let Some(suffix) = raw.strip_prefix('/') {
            ValueForm::Suffix(suffix.to_lowercase())
        } else if let Some(prefix) = raw.strip_suffix('/') {
            ValueForm::Prefix(prefix.to_lowercase())
        } else if raw.ends_with('~') {
            ValueForm::Tilde {
                stem: tilde_stem(raw, morphology),
            }
        } else if allow_alternation && raw.len() >= 2 && raw.starts_with('(') && raw.ends_with(')') {
            let inner = &raw[1..raw.len() - 1];
            ValueForm::Alternation(
                inner
                    .split('|')
                    .map(|alt| ValuePattern::parse(alt, morphology, false))
                    .collect(),
            )
        } else {
            ValueForm::Literal
        };
        Self {
            raw: raw.to_string(),
            form,
        }
    }

    /// Compara um valor do token com este padrão.
    ///
    /// A igualdade exata respeita `ignore_case`; sufixo, prefixo e `~` sempre
    /// comparam sem diferenciar maiúsculas.
    pub fn matches(&self, value: &str, ignore_case: bool, morphology: &MorphologyConfig) -> bool {
        if let ValueForm::Empty = self.form {
            return true;
        }
        let equal = if ignore_case {
            value.to_lowercase() == self.raw.to_lowercase()
        } else {
            value == self.raw
        };
        if equal {
            return true;
        }
        match &self.form {
            ValueForm::Empty => true,
            ValueForm::Literal => false,
            ValueForm::Suffix(suffix) => value.to_lowercase().ends_with(suffix.as_str()),
            ValueForm::Prefix(prefix) => value.to_lowercase().starts_with(prefix.as_str()),
            ValueForm::Tilde { stem } => stem
                .as_deref()
                .is_some_and(|stem| tilde_matches(stem, value, morphology)),
            ValueForm::Alternation(alternatives) => alternatives
                .iter()
                .any(|alt| alt.matches(value, ignore_case, morphology)),
        }
    }
}

/// Conjunto de traços morfológicos exigidos (campo 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphPattern {
    pub required: Vec<String>,
}

impl MorphPattern {
    fn parse(raw: &str) -> Self {
        Self {
            required: raw
                .to_lowercase()
                .split('|')
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Todo traço exigido precisa constar nos traços do token.
    pub fn matches(&self, morph: &str) -> bool {
        let morph = morph.to_lowercase();
        let features: Vec<&str> = morph.split('|').collect();
        self.required.iter().all(|r| features.contains(&r.as_str()))
    }
}

/// `stem = base[0 .. len(base) - 1 - strip]`, com `base` incluindo o `~`.
fn tilde_stem(raw: &str, morphology: &MorphologyConfig) -> Option<String> {
    let pattern = normalize_morph(raw, morphology);
    let len = pattern.chars().count();
    if len <= morphology.strip {
        return None;
    }
    let keep = len.saturating_sub(1 + morphology.strip);
    Some(pattern.chars().take(keep).collect())
}

fn tilde_matches(stem: &str, value: &str, morphology: &MorphologyConfig) -> bool {
    let value = normalize_morph(value, morphology);
    if !value.starts_with(stem) {
        return false;
    }
    let extra = value.chars().count() - stem.chars().count();
    extra < 1 + morphology.strip + morphology.slack
}

fn normalize_morph(s: &str, morphology: &MorphologyConfig) -> String {
    let lower = s.to_lowercase();
    if !morphology.fold_umlauts {
        return lower;
    }
    lower
        .chars()
        .map(|c| match c {
            'ä' => 'a',
            'ö' => 'o',
            'ü' => 'u',
            other => other,
        })
        .collect()
}
