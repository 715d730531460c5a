//! # Configuração do Matcher
//!
//! Toda a configuração é por instância: dois annotators com configurações
//! diferentes coexistem sem interferência. Todos os campos têm default, então um
//! JSON parcial (ou `{}`) é válido.
//!
//! ```rust
//! use patmatch_core::config::MatcherConfig;
//!
//! let config = MatcherConfig::from_json(r#"{ "ignore_case": false, "morphology": { "slack": 2 } }"#).unwrap();
//! assert!(!config.ignore_case);
//! assert_eq!(config.morphology.slack, 2);
//! assert_eq!(config.morphology.strip, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuração completa de um annotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Comparação literal sem diferenciar maiúsculas/minúsculas.
    pub ignore_case: bool,
    /// Caractere que substitui `.` dentro do valor do token antes da comparação,
    /// já que `.` separa os campos de uma chave de padrão.
    pub divider_escape: char,
    pub morphology: MorphologyConfig,
    pub scan: ScanOptions,
    pub format: DictionaryFormat,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            ignore_case: true,
            divider_escape: '§',
            morphology: MorphologyConfig::default(),
            scan: ScanOptions::default(),
            format: DictionaryFormat::default(),
        }
    }
}

impl MatcherConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }
}

/// Parâmetros do operador `~` (sufixo aproximado).
///
/// - `strip`: caracteres removidos do fim da base do padrão antes de comparar.
/// - `slack`: caracteres extras tolerados no fim da palavra.
/// - `fold_umlauts`: compara `ä/ö/ü` como `a/o/u` (plurais alemães como "Dörfer").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyConfig {
    pub strip: usize,
    pub slack: usize,
    pub fold_umlauts: bool,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            strip: 1,
            slack: 3,
            fold_umlauts: true,
        }
    }
}

/// Controle de recursos do scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Limite de partial matches vivos por token. `None` desliga o limite.
    ///
    /// Dicionários com muitos wildcards sobrepostos podem crescer quase
    /// quadraticamente; o excedente é descartado (os candidatos mais novos).
    pub max_active: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_active: Some(4096),
        }
    }
}

/// Convenções do formato textual de dicionário.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryFormat {
    pub comment_marker: String,
    pub type_directive: String,
    pub tag_directive: String,
    pub new_tag_directive: String,
    pub clear_tags_directive: String,
    /// Tipo atribuído às entradas antes de qualquer `#type:`.
    pub default_type: String,
}

impl Default for DictionaryFormat {
    fn default() -> Self {
        Self {
            comment_marker: "//".to_string(),
            type_directive: "#type:".to_string(),
            tag_directive: "#tag:".to_string(),
            new_tag_directive: "#newtag:".to_string(),
            clear_tags_directive: "#cleartags".to_string(),
            default_type: "NULL_TYPE".to_string(),
        }
    }
}
