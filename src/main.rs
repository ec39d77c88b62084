use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use repotrace::cli::{
    Cli, Command, Commands, format_chunk, format_connections, format_location, parse_command,
    resolve_chunk, resolve_symbol,
};
use repotrace::config::Config;
use repotrace::docgen::generate_docs;
use repotrace::graph::{CallGraph, build_call_graph};
use repotrace::indexer::{Chunk, build_index, load_index};
use repotrace::search::{Ranker, find_by_symbol, grep};

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    if !matches!(cli.command, Commands::Init) {
        config.validate()?;
    }
    let index_path = cli
        .index
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.index_path));

    match cli.command {
        Commands::Init => {
            Config::default().save(&cli.config)?;
            println!("Wrote default configuration to {}", cli.config);
        }
        Commands::Index { root } => {
            let stats = build_index(&root, &index_path, &config)?;
            println!(
                "Indexed {} files into {} chunks -> {}",
                stats.files,
                stats.chunks,
                index_path.display()
            );
        }
        Commands::Search { query, top_k } => {
            let chunks = ensure_index(Path::new("."), &index_path, &config)?;
            let top_k = top_k.unwrap_or(config.search.top_k);
            print_ranked(&chunks, &query, top_k, &config);
        }
        Commands::Symbol { name, top_k } => {
            let chunks = ensure_index(Path::new("."), &index_path, &config)?;
            let hits = find_by_symbol(&chunks, &name, top_k.unwrap_or(config.search.top_k));
            if hits.is_empty() {
                println!("No symbol matching '{name}'.");
            }
            for chunk in hits {
                println!("- {} ({})", format_location(chunk), chunk.kind.as_str());
            }
        }
        Commands::Grep { keyword, limit } => {
            let chunks = ensure_index(Path::new("."), &index_path, &config)?;
            print_grep(&chunks, &keyword, limit.unwrap_or(config.search.grep_limit));
        }
        Commands::Trace { symbol, root } => {
            let chunks = ensure_index(&root, &index_path, &config)?;
            let graph = build_call_graph(&root, &config)?;
            println!("{}", format_connections(&resolve_symbol(&chunks, &symbol), &graph));
        }
        Commands::Explain { symbol, root } => {
            let chunks = ensure_index(&root, &index_path, &config)?;
            let graph = build_call_graph(&root, &config)?;
            print_explain(&chunks, &graph, &symbol, &config);
        }
        Commands::Docs { out, root } => {
            let chunks = ensure_index(&root, &index_path, &config)?;
            let graph = build_call_graph(&root, &config)?;
            let out = out.unwrap_or_else(|| PathBuf::from(&config.docs.out_dir));
            let written = generate_docs(&chunks, &graph, &out, &config.docs.include_prefixes)?;
            println!("Generated module docs:");
            for path in written {
                println!(" - {}", path.display());
            }
        }
        Commands::Shell { root } => {
            let chunks = ensure_index(&root, &index_path, &config)?;
            let graph = build_call_graph(&root, &config)?;
            run_shell(&chunks, &graph, &config)?;
        }
    }

    Ok(())
}

/// Load the index, building it first when the file does not exist yet.
fn ensure_index(root: &Path, index_path: &Path, config: &Config) -> Result<Vec<Chunk>> {
    if !index_path.exists() {
        info!("No index at {}, building it", index_path.display());
        build_index(root, index_path, config)?;
    }
    load_index(index_path).with_context(|| format!("failed to load {}", index_path.display()))
}

fn print_ranked(chunks: &[Chunk], query: &str, top_k: usize, config: &Config) {
    let ranked = Ranker::from_config(&config.search).rank(chunks, query, top_k);
    if ranked.is_empty() {
        println!("No strong matches. Try a different keyword (e.g., function name).");
        return;
    }
    println!("Top matches:");
    for (score, chunk) in &ranked {
        println!(
            "- score={score}  {}::{}  ({})",
            chunk.path,
            chunk.symbol,
            chunk.kind.as_str()
        );
    }
    println!("\nBest match details:\n{}", format_chunk(ranked[0].1));
}

fn print_grep(chunks: &[Chunk], keyword: &str, limit: usize) {
    let hits = grep(chunks, keyword, limit);
    if hits.is_empty() {
        println!("No matches for '{keyword}'.");
        return;
    }
    println!("Where '{keyword}' appears (top {}):", hits.len());
    for chunk in hits {
        println!("- {}", format_location(chunk));
    }
}

fn print_explain(chunks: &[Chunk], graph: &CallGraph, symbol: &str, config: &Config) {
    match resolve_chunk(chunks, symbol, &config.search) {
        Some(chunk) => {
            println!("Best match details:\n{}", format_chunk(chunk));
            println!("{}", format_connections(&chunk.symbol, graph));
        }
        None => println!("Couldn't find symbol '{symbol}'. Try `where {symbol}`."),
    }
}

fn run_shell(chunks: &[Chunk], graph: &CallGraph, config: &Config) -> Result<()> {
    println!("Commands:");
    println!("  explain <symbol>   - show and explain a function/class");
    println!("  trace <symbol>     - show caller/callee connections");
    println!("  where <keyword>    - show where a keyword appears");
    println!("  Anything else is a ranked search. Type 'exit' to quit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match parse_command(&line?) {
            Command::Exit => break,
            Command::Explain(symbol) => print_explain(chunks, graph, &symbol, config),
            Command::Trace(symbol) => {
                println!("{}", format_connections(&resolve_symbol(chunks, &symbol), graph))
            }
            Command::Where(keyword) => print_grep(chunks, &keyword, config.search.grep_limit),
            Command::Ask(query) if query.is_empty() => continue,
            Command::Ask(query) => print_ranked(chunks, &query, config.search.top_k, config),
        }
        println!();
    }

    Ok(())
}
