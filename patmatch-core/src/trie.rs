//! # Trie de Padrões
//!
//! Árvore de prefixos em que cada nível corresponde a uma posição de token de uma
//! entrada multi-token. Os nós vivem em uma arena (`Vec`) e se referem uns aos
//! outros por [`NodeId`], inclusive o pai, então não há ciclos de referência.
//!
//! O ciclo de vida tem dois estados (typestate):
//!
//! 1. [`TrieBuilder`]: recebe inserções durante a carga dos dicionários.
//! 2. [`PatternTrie`]: produzido por [`TrieBuilder::freeze`], somente leitura.
//!    As chaves já estão compiladas em [`Segment`]s e o fecho-ε de cada nó
//!    (arestas `*{0,n}` atravessáveis sem consumir token) está pré-calculado.
//!
//! Como `PatternTrie` não expõe mutação, vários scans (inclusive em threads
//! diferentes) podem compartilhá-la sem locks.

use std::collections::HashMap;
use std::fmt;

use crate::segment::Segment;

/// Índice de um nó na arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct BuilderNode<T> {
    children: Vec<(String, NodeId)>,
    index: HashMap<String, usize>,
    meanings: Vec<T>,
    parent: Option<NodeId>,
}

impl<T> BuilderNode<T> {
    fn new(parent: Option<NodeId>) -> Self {
        Self {
            children: Vec::new(),
            index: HashMap::new(),
            meanings: Vec::new(),
            parent,
        }
    }
}

/// Trie em construção.
#[derive(Debug)]
pub struct TrieBuilder<T> {
    nodes: Vec<BuilderNode<T>>,
    payloads: usize,
}

impl<T: PartialEq> TrieBuilder<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![BuilderNode::new(None)],
            payloads: 0,
        }
    }

    /// Insere uma entrada, um segmento por nível.
    ///
    /// Segmentos vazios são ignorados. Um payload igual a outro já presente no nó
    /// terminal não é duplicado. Retorna `true` se o payload foi adicionado.
    pub fn insert<S: AsRef<str>>(&mut self, keys: &[S], payload: T) -> bool {
        let mut current = NodeId::ROOT;
        let mut walked = false;
        for key in keys.iter().map(AsRef::as_ref).filter(|k| !k.is_empty()) {
            current = self.child_or_insert(current, key);
            walked = true;
        }
        if !walked {
            return false;
        }
        let node = &mut self.nodes[current.index()];
        if node.meanings.contains(&payload) {
            return false;
        }
        node.meanings.push(payload);
        self.payloads += 1;
        true
    }

    fn child_or_insert(&mut self, parent: NodeId, key: &str) -> NodeId {
        if let Some(&slot) = self.nodes[parent.index()].index.get(key) {
            return self.nodes[parent.index()].children[slot].1;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(BuilderNode::new(Some(parent)));
        let node = &mut self.nodes[parent.index()];
        node.index.insert(key.to_string(), node.children.len());
        node.children.push((key.to_string(), id));
        id
    }

    /// Número de payloads distintos inseridos até agora.
    pub fn len(&self) -> usize {
        self.payloads
    }

    pub fn is_empty(&self) -> bool {
        self.payloads == 0
    }

    /// Congela a trie, compilando cada chave de aresta com `compile`.
    pub fn freeze<E>(
        self,
        mut compile: impl FnMut(&str) -> Result<Segment, E>,
    ) -> Result<PatternTrie<T>, E> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            let mut edges = Vec::with_capacity(node.children.len());
            for (key, target) in node.children {
                let segment = compile(&key)?;
                edges.push(Edge {
                    key,
                    segment,
                    target,
                });
            }
            nodes.push(Node {
                edges,
                index: node.index,
                meanings: node.meanings,
                parent: node.parent,
                closure: Vec::new(),
            });
        }

        // Filhos sempre têm id maior que o pai: basta percorrer de trás para frente
        for i in (0..nodes.len()).rev() {
            let mut closure = vec![NodeId(i as u32)];
            for edge in nodes[i].edges.iter().filter(|e| e.segment.is_epsilon()) {
                for &reachable in &nodes[edge.target.index()].closure {
                    if !closure.contains(&reachable) {
                        closure.push(reachable);
                    }
                }
            }
            nodes[i].closure = closure;
        }

        Ok(PatternTrie {
            nodes,
            payloads: self.payloads,
        })
    }
}

impl<T: PartialEq> Default for TrieBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Aresta compilada: chave original, segmento e nó de destino.
#[derive(Debug, Clone)]
pub struct Edge {
    key: String,
    segment: Segment,
    target: NodeId,
}

impl Edge {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn target(&self) -> NodeId {
        self.target
    }
}

/// Nó somente leitura de uma [`PatternTrie`].
#[derive(Debug)]
pub struct Node<T> {
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
    meanings: Vec<T>,
    parent: Option<NodeId>,
    closure: Vec<NodeId>,
}

impl<T> Node<T> {
    /// Arestas na ordem de inserção.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Aresta cuja chave é exatamente `key`.
    pub fn edge(&self, key: &str) -> Option<&Edge> {
        self.index.get(key).map(|&slot| &self.edges[slot])
    }

    pub fn meanings(&self) -> &[T] {
        &self.meanings
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Este nó seguido dos nós alcançáveis por gaps de mínimo zero.
    pub fn closure(&self) -> &[NodeId] {
        &self.closure
    }
}

/// Trie congelada.
#[derive(Debug)]
pub struct PatternTrie<T> {
    nodes: Vec<Node<T>>,
    payloads: usize,
}

impl<T> PatternTrie<T> {
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    /// Pares `(chave, filho)` de um nó.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.node(id).edges.iter().map(|e| (e.key.as_str(), e.target))
    }

    pub fn edge(&self, id: NodeId, key: &str) -> Option<&Edge> {
        self.node(id).edge(key)
    }

    pub fn meanings(&self, id: NodeId) -> &[T] {
        &self.node(id).meanings
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Número de arestas entre a raiz e o nó.
    pub fn depth(&self, id: NodeId) -> usize {
        std::iter::successors(self.parent(id), |&p| self.parent(p)).count()
    }

    /// Número de payloads distintos.
    pub fn len(&self) -> usize {
        self.payloads
    }

    pub fn is_empty(&self) -> bool {
        self.payloads == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, indent: usize) -> fmt::Result
    where
        T: fmt::Display,
    {
        for edge in &self.node(id).edges {
            write!(f, "{:indent$}{}", "", edge.key, indent = indent)?;
            let meanings = &self.node(edge.target).meanings;
            if !meanings.is_empty() {
                let labels: Vec<String> = meanings.iter().map(ToString::to_string).collect();
                write!(f, " [{}]", labels.join(", "))?;
            }
            writeln!(f)?;
            self.write_node(f, edge.target, indent + 2)?;
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Display for PatternTrie<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, NodeId::ROOT, 0)
    }
}
