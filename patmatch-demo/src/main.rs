//! patmatch-demo: anota texto com dicionários de whitelist ou de padrões.
//!
//! Uso:
//!   patmatch-demo <DICIONÁRIO> [--patterns] [--case-sensitive] [--config ARQUIVO] [TEXTO...]
//!
//! Sem TEXTO, lê uma sentença por linha da entrada padrão. Cada anotação é
//! impressa como uma linha JSON; logs vão para stderr (`RUST_LOG`, padrão `info`).

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use patmatch_core::{
    DictionaryAnnotator, MatchPipeline, MatcherConfig, PatternMatcher, SegmentMatcher,
    WhitelistMatcher,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Options {
    dictionary: Option<PathBuf>,
    patterns: bool,
    case_sensitive: bool,
    config: Option<PathBuf>,
    texts: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--patterns" => options.patterns = true,
            "--case-sensitive" => options.case_sensitive = true,
            "--config" => {
                let path = iter.next().ok_or("--config requires a file argument")?;
                options.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            value if options.dictionary.is_none() => options.dictionary = Some(PathBuf::from(value)),
            value => options.texts.push(value.to_string()),
        }
    }
    Ok(options)
}

fn print_help() {
    println!("patmatch-demo: dictionary-driven multi-token annotation.");
    println!();
    println!("Usage: patmatch-demo <DICTIONARY> [--patterns] [--case-sensitive] [--config FILE] [TEXT...]");
    println!();
    println!("DICTIONARY is a file or a directory of dictionary files.");
    println!("If TEXT arguments are given, annotates each one.");
    println!("Otherwise reads sentences from stdin (one per line).");
    println!();
    println!("Options:");
    println!("  --patterns         Use the pattern language instead of exact whitelists");
    println!("  --case-sensitive   Compare literals case-sensitively");
    println!("  --config FILE      Matcher configuration as JSON");
    println!("  -h, --help         Print this help");
}

fn load_config(options: &Options) -> Result<MatcherConfig, String> {
    let mut config = match &options.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            MatcherConfig::from_json(&json).map_err(|e| e.to_string())?
        }
        None => MatcherConfig::default(),
    };
    if options.case_sensitive {
        config = config.case_sensitive();
    }
    Ok(config)
}

fn run<M: SegmentMatcher>(options: &Options, dictionary: &Path, config: MatcherConfig) -> Result<(), String> {
    let annotator = DictionaryAnnotator::<M>::from_path(dictionary, config).map_err(|e| e.to_string())?;
    info!(dictionary = %dictionary.display(), entries = annotator.trie().len(), "dictionary loaded");
    let pipeline = MatchPipeline::new(annotator);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut annotate = |text: &str| -> Result<(), String> {
        let (_, annotations) = pipeline.analyze(text);
        for annotation in annotations {
            let line = serde_json::to_string(&annotation).map_err(|e| e.to_string())?;
            writeln!(out, "{line}").map_err(|e| e.to_string())?;
        }
        Ok(())
    };

    if options.texts.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.map_err(|e| format!("error reading stdin: {e}"))?;
            if line.trim().is_empty() {
                continue;
            }
            annotate(&line)?;
        }
    } else {
        for text in &options.texts {
            annotate(text)?;
        }
    }
    out.flush().map_err(|e| e.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return;
    }

    let result = parse_args(&args).and_then(|options| {
        let dictionary = options
            .dictionary
            .clone()
            .ok_or_else(|| "missing DICTIONARY argument (see --help)".to_string())?;
        let config = load_config(&options)?;
        if options.patterns {
            run::<PatternMatcher>(&options, &dictionary, config)
        } else {
            run::<WhitelistMatcher>(&options, &dictionary, config)
        }
    });

    if let Err(message) = result {
        error!("{message}");
        process::exit(1);
    }
}
