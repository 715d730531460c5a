//! # patmatch-core: Anotação de Textos por Dicionários Multi-token
//!
//! Este crate encontra, em uma sequência de tokens, todas as ocorrências de entradas
//! de dicionário com um ou mais tokens. Cada entrada é um nome próprio exato
//! ("New York City") ou uma regra de uma pequena linguagem de padrões
//! (`(der|die) *{0,2} /ung`, `dorf~`, `..NN`).
//!
//! ## Arquitetura
//!
//! 1.  **Carga** ([`loader`]): arquivos de dicionário com diretivas `#type:` e `#tag:`
//!     viram entradas de uma [`trie`] de prefixos.
//! 2.  **Compilação** ([`segment`]): cada chave é compilada uma vez em um `Segment`
//!     e a trie é congelada (somente leitura, compartilhável entre threads).
//! 3.  **Scan** ([`scanner`]): uma passada da esquerda para a direita mantendo uma
//!     fronteira de matches parciais; o [`matcher`] decide se um token aceita uma aresta.
//! 4.  **Saída** ([`annotator`]): uma [`Annotation`] por ocorrência, sobreposições incluídas.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use patmatch_core::{AnnotatorBuilder, MatcherConfig, PosPatternAnnotator, tokenize};
//!
//! // 1. Carrega as regras
//! let mut builder = AnnotatorBuilder::new(MatcherConfig::default());
//! builder.load_str("regras", "#type: SETTLEMENT\ndorf~\n").unwrap();
//! let annotator: PosPatternAnnotator = builder.build().unwrap();
//!
//! // 2. Anota o texto
//! let text = "Im Dorf, in größeren Dörfern.";
//! let annotations = annotator.annotate(text, &tokenize(text));
//!
//! // 3. "Dorf" e "Dörfern" casam com `dorf~`
//! assert_eq!(annotations.len(), 2);
//! for a in &annotations {
//!     println!("{a}");
//! }
//! ```
//!
//! ## Módulos Principais
//!
//! - [`annotator`]: API principal (builder + annotator congelado).
//! - [`pipeline`]: texto → tokens → anotações, com eventos observáveis.
//! - [`config`]: parâmetros de comparação, do operador `~` e do formato de arquivo.

pub mod annotator;
pub mod config;
pub mod entry;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod pipeline;
pub mod scanner;
pub mod segment;
pub mod tokenizer;
pub mod trie;

pub use annotator::{AnnotatorBuilder, DictionaryAnnotator, PosPatternAnnotator, WhitelistAnnotator};
pub use config::{DictionaryFormat, MatcherConfig, MorphologyConfig, ScanOptions};
pub use entry::{Annotation, DictionaryEntry, MatchStep};
pub use error::{Error, LoadError, PatternError, Result};
pub use matcher::{PatternMatcher, SegmentMatcher, WhitelistMatcher};
pub use pipeline::{MatchPipeline, PipelineEvent};
pub use tokenizer::{tokenize, Token};
