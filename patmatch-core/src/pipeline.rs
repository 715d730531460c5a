//! # Pipeline de Anotação com Eventos Observáveis
//!
//! Conecta o tokenizador ao annotator e emite eventos em cada passo via um canal
//! Rust (`mpsc`), para que um consumidor (CLI, UI) acompanhe o progresso.

use std::sync::mpsc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::annotator::DictionaryAnnotator;
use crate::entry::Annotation;
use crate::matcher::SegmentMatcher;
use crate::tokenizer::{tokenize, Token};

/// Eventos emitidos pelo pipeline durante o processamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Tokenização concluída.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 2**: Uma entrada de dicionário foi encontrada.
    AnnotationFound { annotation: Annotation },
    /// **Conclusão**: totais e tempo de processamento.
    Done {
        total_tokens: usize,
        total_annotations: usize,
        processing_ms: u64,
    },
}

/// Pipeline texto → tokens → anotações.
///
/// # Modos de Uso
/// - **Sync**: [`MatchPipeline::analyze`].
/// - **Streaming**: [`MatchPipeline::analyze_streaming`].
pub struct MatchPipeline<M> {
    pub annotator: DictionaryAnnotator<M>,
}

impl<M: SegmentMatcher> MatchPipeline<M> {
    pub fn new(annotator: DictionaryAnnotator<M>) -> Self {
        Self { annotator }
    }

    /// Processa o texto de forma síncrona.
    pub fn analyze(&self, text: &str) -> (Vec<Token>, Vec<Annotation>) {
        let (tx, rx) = mpsc::channel();
        self.analyze_streaming(text, tx);
        let mut tokens = vec![];
        let mut annotations = vec![];

        // Consome todos os eventos até o fim
        while let Ok(event) = rx.recv() {
            match event {
                PipelineEvent::TokenizationDone { tokens: t, .. } => tokens = t,
                PipelineEvent::AnnotationFound { annotation } => annotations.push(annotation),
                PipelineEvent::Done { .. } => {}
            }
        }
        (tokens, annotations)
    }

    /// Executa o pipeline enviando eventos pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenizationDone`
    /// 2. `AnnotationFound` (uma por anotação, em ordem de término)
    /// 3. `Done`
    ///
    /// Se o receptor for descartado no meio do caminho os eventos restantes são perdidos.
    pub fn analyze_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();

        // === Passo 1: Tokenização ===
        let tokens = tokenize(text);
        let total = tokens.len();
        let _ = tx.send(PipelineEvent::TokenizationDone {
            tokens: tokens.clone(),
            total,
        });

        // === Passo 2: Scan ===
        let annotations = self.annotator.annotate(text, &tokens);
        let total_annotations = annotations.len();
        for annotation in annotations {
            let _ = tx.send(PipelineEvent::AnnotationFound { annotation });
        }

        let _ = tx.send(PipelineEvent::Done {
            total_tokens: total,
            total_annotations,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }
}
