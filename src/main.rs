use anyhow::{Context, Result, bail};
use clap::Parser;
use doxidx::cli::{Cli, Commands, expand_tilde};
use doxidx::config::Config;
use doxidx::corpus::Corpus;
use doxidx::generate;
use doxidx::parse::parse_shard;
use doxidx::search::{self, QueryEngine, QueryOptions, QueryOutcome};
use doxidx::sections::Section;
use doxidx::validate;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    doxidx::tracing::init();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref(), Path::new("."))?;

    match cli.command {
        Commands::Check { path, json } => run_check(&resolve(&path), json).await,
        Commands::Search {
            dir,
            query,
            section,
            limit,
            ranked,
        } => {
            let section = Section::from_id(&section)
                .with_context(|| format!("unknown section '{}'", section))?;
            let limit = limit.unwrap_or(config.search.limit);
            run_search(&resolve(&dir), &query, section, limit, ranked).await
        }
        Commands::Generate { symbols, out } => {
            let symbols = generate::read_symbols(&resolve(&symbols))?;
            let tree = generate::build_tree(&symbols, &config.generate)?;
            generate::write_tree(&tree, &resolve(&out)).await
        }
        Commands::Dump { file, pretty } => run_dump(&resolve(&file), pretty).await,
    }
}

/// Expands `~` in user-supplied paths.
fn resolve(path: &Path) -> PathBuf {
    PathBuf::from(expand_tilde(&path.to_string_lossy()).as_ref())
}

async fn run_check(path: &Path, json: bool) -> Result<()> {
    let report = if path.is_file() {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let shard = parse_shard(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        validate::check_file(&file_name, &shard)
    } else {
        let corpus = Corpus::load(path).await?;
        let report = validate::check_corpus(&corpus);
        if !json {
            println!(
                "Checked {} records in {} shards",
                corpus.record_count(),
                corpus.shards.len()
            );
        }
        report
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for finding in &report.findings {
            println!("{}: {}: {}", finding.file, finding.severity, finding.message);
        }
        println!(
            "{} errors, {} warnings",
            report.error_count(),
            report.warning_count()
        );
    }

    if report.error_count() > 0 {
        bail!("validation failed with {} errors", report.error_count());
    }
    Ok(())
}

async fn run_search(
    dir: &Path,
    query: &str,
    section: Section,
    limit: usize,
    ranked: bool,
) -> Result<()> {
    let corpus = Corpus::load(dir).await?;
    let engine = QueryEngine::new(&corpus);

    if ranked {
        let index = search::load_or_build(&corpus).await?;
        let hits = engine.ranked(&index, query, limit);
        if hits.is_empty() {
            println!("No results found for '{}'", query);
            return Ok(());
        }
        for hit in hits {
            println!(
                "{:>8.3}  {}  {}",
                hit.score,
                qualified(&hit.scope, &hit.label),
                hit.url
            );
        }
        return Ok(());
    }

    match engine.search(query, &QueryOptions { section, limit }) {
        QueryOutcome::Hits(hits) if !hits.is_empty() => {
            for hit in hits {
                println!(
                    "{:>3}  {}  {}",
                    hit.relevance,
                    qualified(&hit.scope, &hit.label),
                    hit.url
                );
            }
        }
        QueryOutcome::Hits(_) => println!("No results found for '{}'", query),
        QueryOutcome::Suggestions(suggestions) if !suggestions.is_empty() => {
            println!("No results found for '{}'. Did you mean:", query);
            for s in suggestions {
                println!("  {}", s.label);
            }
        }
        QueryOutcome::Suggestions(_) => println!("No results found for '{}'", query),
    }
    Ok(())
}

async fn run_dump(file: &Path, pretty: bool) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let shard = parse_shard(&text)
        .with_context(|| format!("failed to parse {}", file.display()))?;

    let rendered = if pretty {
        serde_json::to_string_pretty(&shard)?
    } else {
        serde_json::to_string(&shard)?
    };
    println!("{}", rendered);
    Ok(())
}

fn qualified(scope: &str, label: &str) -> String {
    if scope.is_empty() {
        label.to_string()
    } else {
        format!("{}::{}", scope, label)
    }
}
