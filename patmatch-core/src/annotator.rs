//! # Annotator de Dicionário
//!
//! Junta a trie congelada, o matcher e o scanner. É a API principal do crate:
//! carregue dicionários com um [`AnnotatorBuilder`], congele com
//! [`AnnotatorBuilder::build`] e anote quantas sentenças quiser.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use patmatch_core::annotator::{AnnotatorBuilder, WhitelistAnnotator};
//! use patmatch_core::config::MatcherConfig;
//! use patmatch_core::tokenizer::tokenize;
//!
//! let mut builder = AnnotatorBuilder::new(MatcherConfig::default());
//! builder.load_str("inline", "#type: LOCATION\nnew york\nnew york city\n").unwrap();
//! let annotator: WhitelistAnnotator = builder.build().unwrap();
//!
//! let text = "Ich war in New York City.";
//! let annotations = annotator.annotate(text, &tokenize(text));
//! assert_eq!(annotations.len(), 2);
//! assert_eq!(annotations[1].text, "New York City");
//! ```

use std::path::Path;

use rayon::prelude::*;
use tracing::info;

use crate::config::MatcherConfig;
use crate::entry::{Annotation, DictionaryEntry};
use crate::error::Result;
use crate::loader::DictionaryLoader;
use crate::matcher::{PatternMatcher, SegmentMatcher, WhitelistMatcher};
use crate::scanner::Scanner;
use crate::tokenizer::Token;
use crate::trie::{PatternTrie, TrieBuilder};

/// Listas de superfícies exatas.
pub type WhitelistAnnotator = DictionaryAnnotator<WhitelistMatcher>;

/// Regras da mini-linguagem de padrões (raiz, classe gramatical, wildcards...).
pub type PosPatternAnnotator = DictionaryAnnotator<PatternMatcher>;

/// Fase de carga: acumula entradas antes de congelar a trie.
pub struct AnnotatorBuilder<M> {
    builder: TrieBuilder<DictionaryEntry>,
    matcher: M,
    config: MatcherConfig,
}

impl<M: SegmentMatcher> AnnotatorBuilder<M> {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            builder: TrieBuilder::new(),
            matcher: M::from_config(&config),
            config,
        }
    }

    /// Carrega um arquivo ou diretório de dicionários. Retorna as entradas novas.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let loader = DictionaryLoader::new(&self.matcher, &self.config.format);
        Ok(loader.load_path(path, &mut self.builder)?)
    }

    /// Carrega um dicionário a partir de texto.
    pub fn load_str(&mut self, origin: &str, content: &str) -> Result<usize> {
        let loader = DictionaryLoader::new(&self.matcher, &self.config.format);
        Ok(loader.load_str(origin, content, &mut self.builder)?)
    }

    /// Insere uma entrada programaticamente, uma palavra (ou segmento) por token.
    pub fn add_entry(&mut self, words: &[&str], entry_type: &str, tag: Option<&str>) -> Result<bool> {
        let mut keys = Vec::with_capacity(words.len());
        for word in words {
            let key = self.matcher.normalize_key(word);
            self.matcher.compile(&key)?;
            keys.push(key);
        }
        let entry = DictionaryEntry::new(words.join(" "), entry_type).with_tags(tag);
        Ok(self.builder.insert(&keys, entry))
    }

    pub fn len(&self) -> usize {
        self.builder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    /// Congela a trie. Depois disso o annotator é somente leitura.
    pub fn build(self) -> Result<DictionaryAnnotator<M>> {
        let matcher = self.matcher;
        let trie = self.builder.freeze(|key| matcher.compile(key))?;
        info!(
            entries = trie.len(),
            nodes = trie.node_count(),
            ignore_case = self.config.ignore_case,
            "annotator ready"
        );
        Ok(DictionaryAnnotator {
            trie,
            matcher,
            config: self.config,
        })
    }
}

/// Annotator pronto para uso, compartilhável entre threads.
pub struct DictionaryAnnotator<M> {
    trie: PatternTrie<DictionaryEntry>,
    matcher: M,
    config: MatcherConfig,
}

impl<M: SegmentMatcher> DictionaryAnnotator<M> {
    /// Atalho para carregar um único arquivo ou diretório e congelar.
    pub fn from_path(path: impl AsRef<Path>, config: MatcherConfig) -> Result<Self> {
        let mut builder = AnnotatorBuilder::new(config);
        builder.load_path(path)?;
        builder.build()
    }

    /// Anota uma sentença.
    ///
    /// `text` é o texto de onde os tokens vieram; os offsets de cada anotação são
    /// `tokens[start].start .. tokens[end].end`. Se os offsets não couberem em
    /// `text`, o trecho é reconstruído com as superfícies dos tokens.
    pub fn annotate(&self, text: &str, tokens: &[Token]) -> Vec<Annotation> {
        let scanner = Scanner::new(&self.trie, &self.matcher, self.config.scan);
        scanner
            .scan(tokens)
            .into_iter()
            .map(|c| {
                let start = tokens[c.start].start;
                let end = tokens[c.end].end;
                let covered = text.get(start..end).map(str::to_string).unwrap_or_else(|| {
                    tokens[c.start..=c.end]
                        .iter()
                        .filter(|t| !t.is_blank())
                        .map(|t| t.surface.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                });
                Annotation {
                    text: covered,
                    start,
                    end,
                    start_token: c.start,
                    end_token: c.end,
                    entry: c.meaning.clone(),
                    matches: c.steps,
                }
            })
            .collect()
    }

    /// Anota várias sentenças em paralelo.
    pub fn annotate_all(&self, batch: &[(&str, &[Token])]) -> Vec<Vec<Annotation>> {
        batch
            .par_iter()
            .map(|(text, tokens)| self.annotate(text, tokens))
            .collect()
    }

    pub fn trie(&self) -> &PatternTrie<DictionaryEntry> {
        &self.trie
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, LoadError};
    use crate::tokenizer::{tokenize, tokens_from_words};

    fn whitelist(content: &str) -> WhitelistAnnotator {
        let mut builder = AnnotatorBuilder::new(MatcherConfig::default());
        builder.load_str("test", content).unwrap();
        builder.build().unwrap()
    }

    fn patterns(content: &str) -> PosPatternAnnotator {
        let mut builder = AnnotatorBuilder::new(MatcherConfig::default());
        builder.load_str("test", content).unwrap();
        builder.build().unwrap()
    }

    fn texts(annotations: &[Annotation]) -> Vec<&str> {
        annotations.iter().map(|a| a.text.as_str()).collect()
    }

    #[test]
    fn test_berlin_case_insensitive() {
        let annotator = whitelist("#type: LOCATION\nberlin\n");
        let text = "In München und Köln leben mehr Menschen als in Schwerin. \
                    Berlin, BERLIN und berlin.";
        let tokens = tokenize(text);
        let annotations = annotator.annotate(text, &tokens);

        assert_eq!(texts(&annotations), vec!["Berlin", "BERLIN", "berlin"]);
        assert!(annotations.iter().all(|a| a.entry_type() == "LOCATION"));
        assert!(annotations.iter().all(|a| a.matches.is_empty()));
    }

    #[test]
    fn test_case_sensitive_whitelist() {
        let mut builder = AnnotatorBuilder::new(MatcherConfig::default().case_sensitive());
        builder.load_str("test", "Berlin\n").unwrap();
        let annotator: WhitelistAnnotator = builder.build().unwrap();
        let text = "Berlin und berlin";
        assert_eq!(texts(&annotator.annotate(text, &tokenize(text))), vec!["Berlin"]);
    }

    #[test]
    fn test_span_correctness() {
        let annotator = whitelist("new york\nnew york city\nköln\n");
        let text = "Von Köln nach New York City, dann zurück nach Köln.";
        let tokens = tokenize(text);
        let annotations = annotator.annotate(text, &tokens);

        assert_eq!(annotations.len(), 4);
        for a in &annotations {
            assert_eq!(a.start, tokens[a.start_token].start);
            assert_eq!(a.end, tokens[a.end_token].end);
            assert_eq!(&text[a.start..a.end], a.text);
        }
    }

    #[test]
    fn test_overlap_is_preserved() {
        let annotator = whitelist("#type: LOCATION\nnew york\nnew york city\n");
        let text = "Ich war in New York City gestern.";
        let annotations = annotator.annotate(text, &tokenize(text));
        assert_eq!(texts(&annotations), vec!["New York", "New York City"]);
        assert_eq!(annotations[0].end_token - annotations[0].start_token, 1);
        assert_eq!(annotations[1].end_token - annotations[1].start_token, 2);
    }

    #[test]
    fn test_quantifier_boundary() {
        let annotator = patterns("#type: GAP\na *{1,3} b\n");
        let count = |words: &[&str]| {
            let (text, tokens) = tokens_from_words(words);
            annotator.annotate(&text, &tokens).len()
        };
        assert_eq!(count(&["a", "x", "b"]), 1);
        assert_eq!(count(&["a", "x", "y", "z", "b"]), 1);
        assert_eq!(count(&["a", "w", "x", "y", "z", "b"]), 0);
    }

    #[test]
    fn test_tilde_rules_on_german_sentence() {
        let annotator = patterns(
            "#type: SETTLEMENT\n\
             dorf~\n\
             stadt~\n\
             #type: CREATURE\n\
             troll~\n",
        );
        let text = "Im Dorf, in größeren Dörfern und auf den Städten wird von Trollen, \
                    die sich trollen am Städtetag viel getrunken.";
        let annotations = annotator.annotate(text, &tokenize(text));

        assert_eq!(
            texts(&annotations),
            vec!["Dorf", "Dörfern", "Städten", "Trollen", "trollen"]
        );
        assert_eq!(annotations[1].entry.surface, "dorf~");
        assert_eq!(annotations[3].entry_type(), "CREATURE");
        assert_eq!(annotations[1].matches[0].surface, "Dörfern");
        assert_eq!(annotations[1].matches[0].pattern, "dorf~");
    }

    #[test]
    fn test_tilde_without_umlaut_folding() {
        let mut config = MatcherConfig::default();
        config.morphology.fold_umlauts = false;
        let mut builder = AnnotatorBuilder::new(config);
        builder.load_str("test", "dorf~\n").unwrap();
        let annotator: PosPatternAnnotator = builder.build().unwrap();
        let text = "Dorf und Dörfern";
        assert_eq!(texts(&annotator.annotate(text, &tokenize(text))), vec!["Dorf"]);
    }

    #[test]
    fn test_idempotent_insertion() {
        let annotator = whitelist("berlin\nberlin\n");
        assert_eq!(annotator.trie().len(), 1);
        let text = "Berlin ist Berlin";
        assert_eq!(annotator.annotate(text, &tokenize(text)).len(), 2);
    }

    #[test]
    fn test_pos_and_root_fields() {
        let annotator = patterns("#type: NP\n(der|die|das) .alt.ADJA ..NN\n");
        let tokens = vec![
            Token::new("die", 0, 3).with_root("die").with_pos("ART"),
            Token::new("alten", 4, 9).with_root("alt").with_pos("ADJA"),
            Token::new("Häuser", 10, 17).with_root("Haus").with_pos("NN"),
        ];
        let annotations = annotator.annotate("die alten Häuser", &tokens);
        assert_eq!(texts(&annotations), vec!["die alten Häuser"]);

        // sem classe gramatical, `..NN` não casa
        let bare = vec![
            Token::new("die", 0, 3),
            Token::new("alten", 4, 9).with_root("alt").with_pos("ADJA"),
            Token::new("Häuser", 10, 17),
        ];
        assert!(annotator.annotate("die alten Häuser", &bare).is_empty());
    }

    #[test]
    fn test_text_fallback_when_offsets_do_not_fit() {
        let annotator = whitelist("new york\n");
        let tokens = vec![Token::new("New", 100, 103), Token::new("York", 104, 108)];
        let annotations = annotator.annotate("", &tokens);
        assert_eq!(annotations[0].text, "New York");
        assert_eq!((annotations[0].start, annotations[0].end), (100, 108));
    }

    #[test]
    fn test_add_entry() {
        let mut builder: AnnotatorBuilder<PatternMatcher> = AnnotatorBuilder::new(MatcherConfig::default());
        assert!(builder.add_entry(&["new", "+", "city"], "LOCATION", Some("pattern")).unwrap());
        assert!(!builder.add_entry(&["new", "+", "city"], "LOCATION", Some("pattern")).unwrap());
        assert!(matches!(
            builder.add_entry(&["a", "*{2,1}"], "X", None),
            Err(Error::Pattern(_))
        ));
        let annotator = builder.build().unwrap();
        let text = "new jersey city";
        let annotations = annotator.annotate(text, &tokenize(text));
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].entry.surface, "new + city");
        assert!(annotations[0].entry.has_tag("pattern"));
    }

    #[test]
    fn test_malformed_quantifier_is_load_error() {
        let mut builder: AnnotatorBuilder<PatternMatcher> = AnnotatorBuilder::new(MatcherConfig::default());
        let err = builder.load_str("rules.txt", "a *{1,} b\n").unwrap_err();
        assert!(matches!(err, Error::Load(LoadError::Pattern { line: 1, .. })));
    }

    #[test]
    fn test_from_path_with_sample_dictionaries() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/dictionaries/examples");
        let annotator = WhitelistAnnotator::from_path(dir.join("cities_DE.txt"), MatcherConfig::default()).unwrap();
        let text = "Von Schwerin nach München.";
        let annotations = annotator.annotate(text, &tokenize(text));
        assert_eq!(texts(&annotations), vec!["Schwerin", "München"]);
        assert!(annotations[0].entry.has_tag("capital"));

        let missing = WhitelistAnnotator::from_path(dir.join("nope.txt"), MatcherConfig::default());
        assert!(matches!(missing, Err(Error::Load(LoadError::NotFound(_)))));
    }

    #[test]
    fn test_german_rule_file() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("data/dictionaries/examples/germanRules_DE.txt");
        let annotator = PosPatternAnnotator::from_path(path, MatcherConfig::default()).unwrap();
        let text = "Im Dorf, in größeren Dörfern und auf den Städten wird von Trollen, \
                    die sich trollen am Städtetag viel getrunken.";
        let annotations = annotator.annotate(text, &tokenize(text));

        assert_eq!(
            texts(&annotations),
            vec!["Dorf", "Dörfern", "auf den Städten", "Städten", "Trollen", "trollen", "Städtetag"]
        );
        assert_eq!(annotations[0].entry.tags, vec!["stem"]);
        assert_eq!(annotations[2].entry_type(), "PHRASE");
        assert!(annotations[2].entry.tags.is_empty());
        assert_eq!(annotations[6].entry.tags, vec!["compound"]);
    }

    #[test]
    fn test_annotate_all_matches_sequential() {
        let annotator = whitelist("berlin\nköln\n");
        let sentences = ["Berlin und Köln.", "Nichts hier.", "Köln, Köln, Berlin"];
        let tokenized: Vec<Vec<Token>> = sentences.iter().map(|s| tokenize(s)).collect();
        let batch: Vec<(&str, &[Token])> = sentences
            .iter()
            .zip(&tokenized)
            .map(|(s, t)| (*s, t.as_slice()))
            .collect();

        let parallel = annotator.annotate_all(&batch);
        let sequential: Vec<Vec<Annotation>> =
            batch.iter().map(|(s, t)| annotator.annotate(s, t)).collect();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 0, 3]);
    }
}
