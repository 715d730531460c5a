//! # Tokens de Entrada
//!
//! O scanner consome uma sequência de [`Token`]s já segmentados e, opcionalmente,
//! anotados por um tagger externo (lema, classe gramatical, morfologia). Cada token
//! preserva sua posição original no texto (offset) para que as anotações possam
//! ser recortadas do texto sem alterar sua formatação.
//!
//! A tokenização propriamente dita é responsabilidade de um componente externo.
//! Para demonstrações e testes oferecemos [`tokenize`], que apenas divide o texto
//! nas fronteiras de palavra Unicode (UAX #29) e descarta os espaços.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use patmatch_core::tokenizer::{tokenize, Token};
//!
//! let tokens = tokenize("Im Dorf, in größeren Dörfern.");
//! assert_eq!(tokens[1].surface, "Dorf");
//!
//! // Tokens vindos de um tagger podem ser montados diretamente
//! let tagged = Token::new("Dörfern", 21, 29).with_pos("NN").with_morph("Dat|Pl");
//! assert_eq!(tagged.pos.as_deref(), Some("NN"));
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
///
/// Somente `surface` participa da comparação com as arestas literais; `root`, `pos`
/// e `morph` são consultados pelos campos 1 a 3 de uma chave de padrão. Os offsets
/// são metadados usados para montar o span da anotação.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// Forma de superfície (ex: "Dörfern", ",", "Berlin").
    pub surface: String,
    /// Lema/raiz, quando o tagger fornece (ex: "Dorf").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Classe gramatical (ex: "NN", "ADJA").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    /// Traços morfológicos separados por `|` (ex: "Dat|Pl|Neut").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph: Option<String>,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

impl Token {
    pub fn new(surface: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            surface: surface.into(),
            root: None,
            pos: None,
            morph: None,
            start,
            end,
            index: 0,
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    pub fn with_morph(mut self, morph: impl Into<String>) -> Self {
        self.morph = Some(morph.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Tokens vazios ou só com espaços são ignorados pelo scanner.
    pub fn is_blank(&self) -> bool {
        self.surface.trim().is_empty()
    }
}

/// Tokeniza um texto nas fronteiras de palavra Unicode.
///
/// Pontuação vira token próprio, espaços são descartados e os tokens são
/// re-indexados sequencialmente.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = text
        .split_word_bound_indices()
        .filter(|(_, piece)| !piece.trim().is_empty())
        .map(|(start, piece)| Token::new(piece, start, start + piece.len()))
        .collect();

    // Re-indexa os tokens
    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

/// Monta tokens a partir de superfícies já separadas, juntando-as com um espaço.
///
/// Útil quando o texto original não está disponível: retorna o texto reconstruído
/// e os tokens com offsets coerentes com ele.
pub fn tokens_from_words(words: &[&str]) -> (String, Vec<Token>) {
    let mut text = String::new();
    let mut tokens = Vec::with_capacity(words.len());
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        let start = text.len();
        text.push_str(word);
        tokens.push(Token::new(*word, start, text.len()).with_index(i));
    }
    (text, tokens)
}
