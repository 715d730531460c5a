//! # Carregador de Dicionários
//!
//! Lê arquivos de dicionário linha a linha e insere cada entrada na trie.
//!
//! ## Formato
//!
//! ```text
//! // comentário
//! #type: LOCATION
//! #tag: city, de
//! berlin
//! new york city	us          <- TAB + tag extra só para esta entrada
//! #newtag: village            <- substitui as tags ativas
//! (dorf~|weiler~)
//! #cleartags
//! a *{1,3} b
//! ```
//!
//! Diretivas valem para as linhas seguintes do **mesmo arquivo**; cada arquivo
//! começa com o tipo padrão e sem tags. Um diretório é lido recursivamente, em
//! ordem alfabética.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::DictionaryFormat;
use crate::entry::DictionaryEntry;
use crate::error::LoadError;
use crate::matcher::SegmentMatcher;
use crate::trie::TrieBuilder;

/// Estado ambiente de um arquivo: tipo e tags ativos.
#[derive(Debug, Clone)]
struct FileState {
    entry_type: String,
    tags: Vec<String>,
}

/// Linha de dicionário já classificada.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'l> {
    Skip,
    Type(&'l str),
    Tags(&'l str),
    NewTags(&'l str),
    ClearTags,
    Entry { text: &'l str, extra_tag: Option<&'l str> },
}

/// Carregador ligado a um matcher (que valida e normaliza as chaves) e a um formato.
pub struct DictionaryLoader<'c, M> {
    matcher: &'c M,
    format: &'c DictionaryFormat,
}

impl<'c, M: SegmentMatcher> DictionaryLoader<'c, M> {
    pub fn new(matcher: &'c M, format: &'c DictionaryFormat) -> Self {
        Self { matcher, format }
    }

    /// Carrega um arquivo ou, recursivamente, todos os arquivos de um diretório.
    ///
    /// Retorna o número de entradas novas inseridas.
    pub fn load_path(
        &self,
        path: impl AsRef<Path>,
        builder: &mut TrieBuilder<DictionaryEntry>,
    ) -> Result<usize, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            let mut children: Vec<_> = fs::read_dir(path)
                .and_then(|entries| entries.map(|e| e.map(|e| e.path())).collect::<Result<_, _>>())
                .map_err(|source| LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            children.sort();
            let mut inserted = 0;
            for child in children {
                inserted += self.load_path(&child, builder)?;
            }
            return Ok(inserted);
        }
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&path.display().to_string(), &content, builder)
    }

    /// Carrega um dicionário em memória. `origin` identifica a fonte nas mensagens de erro.
    pub fn load_str(
        &self,
        origin: &str,
        content: &str,
        builder: &mut TrieBuilder<DictionaryEntry>,
    ) -> Result<usize, LoadError> {
        let mut state = FileState {
            entry_type: self.format.default_type.clone(),
            tags: Vec::new(),
        };
        let mut inserted = 0;
        let mut seen = 0;

        for (n, raw) in content.lines().enumerate() {
            match self.classify(raw) {
                Line::Skip => {}
                Line::Type(t) => state.entry_type = t.to_string(),
                Line::Tags(list) => state.tags.extend(split_tags(list)),
                Line::NewTags(list) => state.tags = split_tags(list).collect(),
                Line::ClearTags => state.tags.clear(),
                Line::Entry { text, extra_tag } => {
                    seen += 1;
                    let mut keys = Vec::new();
                    for segment in text.split_whitespace() {
                        let key = self.matcher.normalize_key(segment);
                        self.matcher
                            .compile(&key)
                            .map_err(|source| LoadError::Pattern {
                                origin: origin.to_string(),
                                line: n + 1,
                                text: text.to_string(),
                                source,
                            })?;
                        keys.push(key);
                    }
                    let mut entry = DictionaryEntry::new(text, state.entry_type.as_str())
                        .with_tags(state.tags.iter().cloned());
                    entry.tags.extend(extra_tag.map(str::to_string));
                    if builder.insert(&keys, entry) {
                        inserted += 1;
                    }
                }
            }
        }

        debug!(origin, entries = seen, inserted, "dictionary loaded");
        Ok(inserted)
    }

    fn classify<'l>(&self, raw: &'l str) -> Line<'l> {
        let marker = self.format.comment_marker.as_str();
        let mut line = raw.trim();
        if line.is_empty() || (!marker.is_empty() && line.starts_with(marker)) {
            return Line::Skip;
        }
        if line.len() >= 2 && line.starts_with('"') && line.ends_with('"') {
            line = &line[1..line.len() - 1];
        }
        if !marker.is_empty() {
            if let Some(cut) = line.find(marker) {
                line = line[..cut].trim();
            }
        }

        let (line, extra_tag) = match line.split_once('\t') {
            Some((head, tail)) => {
                let tail = tail.split('\t').next().unwrap_or("").trim();
                (head.trim(), Some(tail).filter(|t| !t.is_empty()))
            }
            None => (line, None),
        };

        let format = self.format;
        if let Some(rest) = line.strip_prefix(format.type_directive.as_str()) {
            Line::Type(rest.trim())
        } else if let Some(rest) = line.strip_prefix(format.tag_directive.as_str()) {
            Line::Tags(rest)
        } else if line.starts_with(format.clear_tags_directive.as_str()) {
            Line::ClearTags
        } else if let Some(rest) = line.strip_prefix(format.new_tag_directive.as_str()) {
            Line::NewTags(rest)
        } else if line.is_empty() {
            Line::Skip
        } else {
            Line::Entry {
                text: line,
                extra_tag,
            }
        }
    }
}

fn split_tags(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatcherConfig;
    use crate::error::PatternError;
    use crate::matcher::{PatternMatcher, WhitelistMatcher};
    use crate::segment::Segment;
    use crate::trie::PatternTrie;

    fn data_dir() -> std::path::PathBuf {
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    fn load_whitelist(content: &str) -> PatternTrie<DictionaryEntry> {
        let matcher = WhitelistMatcher::new(true);
        let format = DictionaryFormat::default();
        let mut builder = TrieBuilder::new();
        DictionaryLoader::new(&matcher, &format)
            .load_str("test", content, &mut builder)
            .unwrap();
        builder.freeze(|k| matcher.compile(k)).unwrap()
    }

    fn entry_at(trie: &PatternTrie<DictionaryEntry>, words: &[&str]) -> Vec<DictionaryEntry> {
        let mut node = trie.root();
        for word in words {
            node = trie.edge(node, word).unwrap().target();
        }
        trie.meanings(node).to_vec()
    }

    #[test]
    fn test_directives() {
        let trie = load_whitelist(
            "// cidades\n\
             berlin\n\
             #type: LOCATION\n\
             #tag: city, de\n\
             köln\n\
             #tag: rhein\n\
             bonn\n\
             #newtag: us\n\
             new york\tbig apple\n\
             #cleartags\n\
             paris\n",
        );

        assert_eq!(entry_at(&trie, &["berlin"]), vec![DictionaryEntry::new("berlin", "NULL_TYPE")]);
        assert_eq!(entry_at(&trie, &["köln"])[0].tags, vec!["city", "de"]);
        assert_eq!(entry_at(&trie, &["bonn"])[0].tags, vec!["city", "de", "rhein"]);
        let ny = &entry_at(&trie, &["new", "york"])[0];
        assert_eq!(ny.surface, "new york");
        assert_eq!(ny.entry_type, "LOCATION");
        assert_eq!(ny.tags, vec!["us", "big apple"]);
        assert!(entry_at(&trie, &["paris"])[0].tags.is_empty());
    }

    #[test]
    fn test_comments_and_quotes() {
        let trie = load_whitelist(
            "  \n\
             \"hamburg\"\n\
             münchen // bayern\n\
             //köln\n",
        );
        assert_eq!(trie.len(), 2);
        assert_eq!(entry_at(&trie, &["hamburg"])[0].surface, "hamburg");
        assert_eq!(entry_at(&trie, &["münchen"])[0].surface, "münchen");
    }

    #[test]
    fn test_whitelist_keys_are_lowercased() {
        let trie = load_whitelist("Berlin\n");
        assert_eq!(entry_at(&trie, &["berlin"])[0].surface, "Berlin");
    }

    #[test]
    fn test_normalized_key_is_compiled_and_inserted() {
        let matcher = WhitelistMatcher::new(true);
        let format = DictionaryFormat::default();
        let mut builder = TrieBuilder::new();
        DictionaryLoader::new(&matcher, &format)
            .load_str("test", "New York\n", &mut builder)
            .unwrap();
        let trie = builder.freeze(|k| matcher.compile(k)).unwrap();
        let new = trie.edge(trie.root(), "new").unwrap();
        assert_eq!(new.segment(), &Segment::Literal("new".to_string()));
        assert!(trie.edge(trie.root(), "New").is_none());
    }

    #[test]
    fn test_reinsertion_is_idempotent() {
        let trie = load_whitelist("berlin\nberlin\n");
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_malformed_quantifier_fails_with_context() {
        let matcher = PatternMatcher::from_config(&MatcherConfig::default());
        let format = DictionaryFormat::default();
        let mut builder = TrieBuilder::new();
        let err = DictionaryLoader::new(&matcher, &format)
            .load_str("rules.txt", "#type: X\nok\na *{1,x} b\n", &mut builder)
            .unwrap_err();
        match err {
            LoadError::Pattern {
                origin,
                line,
                text,
                source,
            } => {
                assert_eq!(origin, "rules.txt");
                assert_eq!(line, 3);
                assert_eq!(text, "a *{1,x} b");
                assert_eq!(source, PatternError::Quantifier("*{1,x}".to_string()));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_missing_location_is_fatal() {
        let matcher = WhitelistMatcher::new(true);
        let format = DictionaryFormat::default();
        let mut builder = TrieBuilder::new();
        let err = DictionaryLoader::new(&matcher, &format)
            .load_path(data_dir().join("does-not-exist"), &mut builder)
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_directory_state_does_not_leak() {
        let matcher = WhitelistMatcher::new(true);
        let format = DictionaryFormat::default();
        let mut builder = TrieBuilder::new();
        let inserted = DictionaryLoader::new(&matcher, &format)
            .load_path(data_dir().join("dictionaries/nested"), &mut builder)
            .unwrap();
        assert_eq!(inserted, 3);
        let trie = builder.freeze(|k| matcher.compile(k)).unwrap();

        let first = &entry_at(&trie, &["berlin"])[0];
        assert_eq!(first.entry_type, "LOCATION");
        assert_eq!(first.tags, vec!["capital"]);
        // segundo arquivo começa sem tipo nem tags
        let second = &entry_at(&trie, &["angela", "merkel"])[0];
        assert_eq!(second.entry_type, "NULL_TYPE");
        assert!(second.tags.is_empty());
        // arquivo em subdiretório
        assert_eq!(entry_at(&trie, &["rhein"])[0].entry_type, "RIVER");
    }

    #[test]
    fn test_pattern_keys_compile() {
        let matcher = PatternMatcher::from_config(&MatcherConfig::default());
        let format = DictionaryFormat::default();
        let mut builder = TrieBuilder::new();
        DictionaryLoader::new(&matcher, &format)
            .load_str("inline", "#type: GAP\na *{1,3} b\n", &mut builder)
            .unwrap();
        let trie = builder.freeze(|k| matcher.compile(k)).unwrap();
        let a = trie.edge(trie.root(), "a").unwrap().target();
        assert!(matches!(trie.edge(a, "*{1,3}").unwrap().segment(), Segment::Gap(_)));
    }

    #[test]
    fn test_custom_format() {
        let matcher = WhitelistMatcher::new(true);
        let format = DictionaryFormat {
            comment_marker: "%".to_string(),
            type_directive: "@type ".to_string(),
            default_type: "NONE".to_string(),
            ..DictionaryFormat::default()
        };
        let mut builder = TrieBuilder::new();
        DictionaryLoader::new(&matcher, &format)
            .load_str("custom", "% comment\nfoo\n@type CITY\nbar % trailing\n", &mut builder)
            .unwrap();
        let trie = builder.freeze(|k| matcher.compile(k)).unwrap();
        assert_eq!(entry_at(&trie, &["foo"])[0].entry_type, "NONE");
        assert_eq!(entry_at(&trie, &["bar"])[0].entry_type, "CITY");
    }
}
