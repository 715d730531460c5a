//! # Scanner em Fluxo
//!
//! Percorre os tokens da esquerda para a direita mantendo uma **fronteira** de
//! matches parciais (cada um ancorado em um token inicial diferente), no estilo
//! Aho-Corasick:
//!
//! 1. Cada match parcial vivo tenta avançar com o token atual.
//! 2. Independentemente, um novo match tenta começar na raiz com o token atual.
//! 3. Sempre que um match chega a um nó com payloads, uma [`Completion`] é emitida.
//!
//! ## Wildcards com quantificador
//!
//! `*{m,n}` é um contador: entrar no gap consome o primeiro token (`taken = 1`);
//! enquanto `taken + 1 ≤ n` o gap pode consumir mais um; quando `taken ≥ m` o
//! padrão pode retomar nas arestas do nó de destino. Gaps com `m = 0` também
//! podem ser pulados sem consumir token (fecho-ε pré-calculado pela trie).
//! Nada na trie é alterado durante o scan.
//!
//! ## Limite da fronteira e spans repetidos
//!
//! [`ScanOptions::max_active`] limita os partial matches vivos após cada token; o
//! excedente (os candidatos mais novos) é descartado com um único `warn!` por scan.
//!
//! Não há deduplicação: dois gaps puláveis seguidos (`a * * b`) reportam o mesmo
//! span uma vez para cada forma de dividir os tokens entre eles.

use tracing::{debug, warn};

use crate::config::ScanOptions;
use crate::entry::MatchStep;
use crate::matcher::SegmentMatcher;
use crate::segment::{Quantifier, Segment};
use crate::tokenizer::Token;
use crate::trie::{Edge, NodeId, PatternTrie};

/// Uma entrada do dicionário encontrada sobre os tokens `start..=end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<'a, T> {
    pub start: usize,
    pub end: usize,
    pub meaning: &'a T,
    pub steps: Vec<MatchStep>,
}

#[derive(Debug, Clone, Copy)]
struct GapState<'a> {
    edge: &'a Edge,
    quantifier: Quantifier,
    taken: usize,
}

/// Candidato vivo: nó atual (ou gap em andamento), token inicial e procedência.
#[derive(Debug, Clone)]
struct PartialMatch<'a> {
    node: NodeId,
    gap: Option<GapState<'a>>,
    start: usize,
    steps: Vec<MatchStep>,
}

/// Scanner sobre uma trie congelada.
pub struct Scanner<'a, T, M> {
    trie: &'a PatternTrie<T>,
    matcher: &'a M,
    options: ScanOptions,
}

impl<'a, T, M: SegmentMatcher> Scanner<'a, T, M> {
    pub fn new(trie: &'a PatternTrie<T>, matcher: &'a M, options: ScanOptions) -> Self {
        Self {
            trie,
            matcher,
            options,
        }
    }

    /// Executa o scan completo e devolve as completions em ordem de término.
    pub fn scan(&self, tokens: &[Token]) -> Vec<Completion<'a, T>> {
        let mut completions = Vec::new();
        let mut active: Vec<PartialMatch<'a>> = Vec::new();
        let mut capped = false;

        for (i, token) in tokens.iter().enumerate() {
            if token.is_blank() {
                continue;
            }
            let mut extended = Vec::new();
            for pm in &active {
                self.extend(pm, token, i, &mut extended, &mut completions);
            }
            let seed = PartialMatch {
                node: self.trie.root(),
                gap: None,
                start: i,
                steps: Vec::new(),
            };
            self.extend(&seed, token, i, &mut extended, &mut completions);

            if let Some(cap) = self.options.max_active {
                if extended.len() > cap {
                    if !capped {
                        warn!(
                            token_index = i,
                            frontier = extended.len(),
                            cap,
                            "frontier cap reached, dropping newest partial matches"
                        );
                        capped = true;
                    }
                    extended.truncate(cap);
                }
            }
            active = extended;
        }

        debug!(
            tokens = tokens.len(),
            completions = completions.len(),
            "scan finished"
        );
        completions
    }

    fn extend(
        &self,
        pm: &PartialMatch<'a>,
        token: &Token,
        i: usize,
        out: &mut Vec<PartialMatch<'a>>,
        completions: &mut Vec<Completion<'a, T>>,
    ) {
        match pm.gap {
            Some(gap) => {
                if gap.quantifier.allows(gap.taken + 1) {
                    self.enter_gap(pm, gap.edge, gap.quantifier, gap.taken + 1, token, i, out, completions);
                }
                if gap.quantifier.satisfied(gap.taken) {
                    self.advance(pm, gap.edge.target(), token, i, out, completions);
                }
            }
            None => self.advance(pm, pm.node, token, i, out, completions),
        }
    }

    /// Tenta as arestas de `from` (e de seu fecho-ε) com o token atual.
    fn advance(
        &self,
        pm: &PartialMatch<'a>,
        from: NodeId,
        token: &Token,
        i: usize,
        out: &mut Vec<PartialMatch<'a>>,
        completions: &mut Vec<Completion<'a, T>>,
    ) {
        let trie: &'a PatternTrie<T> = self.trie;
        for &node_id in trie.node(from).closure() {
            for edge in self.matcher.candidate_edges(trie.node(node_id), token) {
                match edge.segment() {
                    Segment::Gap(q) => {
                        if q.allows(1) {
                            self.enter_gap(pm, edge, *q, 1, token, i, out, completions);
                        }
                    }
                    segment => {
                        if self.matcher.matches(token, segment) {
                            let next = self.step(pm, edge.target(), None, token, edge.key());
                            self.emit(&next, edge.target(), i, completions);
                            out.push(next);
                        }
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn enter_gap(
        &self,
        pm: &PartialMatch<'a>,
        edge: &'a Edge,
        quantifier: Quantifier,
        taken: usize,
        token: &Token,
        i: usize,
        out: &mut Vec<PartialMatch<'a>>,
        completions: &mut Vec<Completion<'a, T>>,
    ) {
        let gap = GapState {
            edge,
            quantifier,
            taken,
        };
        let next = self.step(pm, edge.target(), Some(gap), token, edge.key());
        if quantifier.satisfied(taken) {
            self.emit(&next, edge.target(), i, completions);
        }
        out.push(next);
    }

    fn step(
        &self,
        pm: &PartialMatch<'a>,
        node: NodeId,
        gap: Option<GapState<'a>>,
        token: &Token,
        pattern: &str,
    ) -> PartialMatch<'a> {
        let mut steps = pm.steps.clone();
        if self.matcher.records_provenance() {
            steps.push(MatchStep {
                surface: token.surface.clone(),
                pattern: pattern.to_string(),
            });
        }
        PartialMatch {
            node,
            gap,
            start: pm.start,
            steps,
        }
    }

    /// Um completion por payload de cada nó do fecho-ε de `node`.
    fn emit(&self, pm: &PartialMatch<'a>, node: NodeId, end: usize, completions: &mut Vec<Completion<'a, T>>) {
        let trie: &'a PatternTrie<T> = self.trie;
        for &reached in trie.node(node).closure() {
            for meaning in trie.meanings(reached) {
                completions.push(Completion {
                    start: pm.start,
                    end,
                    meaning,
                    steps: pm.steps.clone(),
                });
            }
        }
    }
}
