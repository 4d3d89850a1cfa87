use anyhow::{Context, Result, bail};
use castgraph_core::analyze::Analyze;
use castgraph_core::crawl::{CrawlConfig, CrawlController, CrawlReport, CrawlState, CrawlStats};
use castgraph_core::data::{Database, RunSummary};
use castgraph_core::graph::GraphStore;
use castgraph_core::model::{EntityKind, Vertex};
use castgraph_core::query::{Query, VertexFilter};
use castgraph_core::snapshot;
use castgraph_core::weight::EdgeWeightPolicy;
use castgraph_scanner::WikiSource;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

pub const DEFAULT_SEED_URL: &str = "https://en.wikipedia.org/wiki/Morgan_Freeman";
pub const DEFAULT_GRAPH_FILE: &str = "castgraph.json";

/// Install the fmt subscriber. `RUST_LOG` wins over the flags.
pub fn init_logging(quiet: bool, verbose: bool) {
    let default = log_level(quiet, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

/// Crawl settings from the `crawl` flags.
pub fn crawl_config_from(
    actors: usize,
    movies: usize,
    min_delay_ms: u64,
    max_delay_ms: u64,
    weight: &str,
) -> Result<CrawlConfig> {
    if min_delay_ms > max_delay_ms {
        bail!(
            "--min-delay-ms ({}) is larger than --max-delay-ms ({})",
            min_delay_ms,
            max_delay_ms
        );
    }
    let policy: EdgeWeightPolicy = weight.parse().map_err(anyhow::Error::msg)?;

    Ok(CrawlConfig::default()
        .with_thresholds(actors, movies)
        .with_delay(
            Duration::from_millis(min_delay_ms),
            Duration::from_millis(max_delay_ms),
        )
        .with_weight_policy(policy))
}

/// Load a graph from the latest run in `database`, or from the JSON
/// snapshot at `input` when no database is given.
pub fn load_graph(input: &Path, database: Option<&Path>) -> Result<GraphStore> {
    match database {
        Some(db_path) => {
            if !Database::exists(db_path) {
                bail!("No database at {}", db_path.display());
            }
            let db = Database::new(db_path)
                .with_context(|| format!("Failed to open database {}", db_path.display()))?;
            let snapshot = db
                .load_latest_snapshot()?
                .with_context(|| format!("No crawl runs recorded in {}", db_path.display()))?;
            Ok(GraphStore::from_snapshot(&snapshot)?)
        }
        None => snapshot::load_graph(input)
            .with_context(|| format!("Failed to load graph from {}", input.display())),
    }
}

fn graph_from_args(args: &ArgMatches) -> Result<GraphStore> {
    let input = args
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or(DEFAULT_GRAPH_FILE);
    let database = args.get_one::<String>("database").map(|p| expand_path(p));
    load_graph(&expand_path(input), database.as_deref())
}

pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

pub fn render_ranking<K: Display>(title: &str, entries: &[(K, i64)]) -> String {
    let mut report = format!("{}\n", title.bright_white().bold());
    if entries.is_empty() {
        report.push_str(&format!("  {}\n", "(none)".dimmed()));
        return report;
    }
    for (rank, (key, value)) in entries.iter().enumerate() {
        report.push_str(&format!(
            "  {:>3}. {} {}\n",
            rank + 1,
            key,
            format_count(*value).cyan()
        ));
    }
    report
}

pub fn render_names(title: &str, names: &[&str]) -> String {
    let mut report = format!("{}\n", title.bright_white().bold());
    if names.is_empty() {
        report.push_str(&format!("  {}\n", "(none)".dimmed()));
    }
    for name in names {
        report.push_str(&format!("  {} {}\n", "•".blue(), name));
    }
    report
}

pub fn render_vertices(title: &str, vertices: &[&Vertex]) -> String {
    let mut report = format!("{}\n", title.bright_white().bold());
    if vertices.is_empty() {
        report.push_str(&format!("  {}\n", "(none)".dimmed()));
    }
    for vertex in vertices {
        let detail = match vertex.kind {
            EntityKind::Actor => format!("age {}", vertex.primary),
            EntityKind::Movie => format!("{}, gross {}", vertex.primary, format_count(vertex.secondary)),
        };
        report.push_str(&format!("  {} {} ({})\n", "•".blue(), vertex.identity, detail));
    }
    report
}

pub fn render_crawl_summary(report: &CrawlReport, graph: &GraphStore) -> String {
    let outcome = match report.state {
        CrawlState::Satisfied => "thresholds reached".green().bold(),
        CrawlState::Drained => "ran out of links".yellow().bold(),
        CrawlState::Running => "interrupted".red().bold(),
    };
    let stats = &report.stats;

    let mut summary = String::new();
    summary.push_str(&format!("Outcome: {}\n", outcome));
    summary.push_str(&format!("  Actors: {}\n", stats.actors_ingested));
    summary.push_str(&format!("  Movies: {}\n", stats.movies_ingested));
    summary.push_str(&format!("  Relations: {}\n", graph.relation_count()));
    summary.push_str(&format!("  Requests: {}\n", stats.requests_issued));
    summary.push_str(&format!("  Links abandoned: {}\n", stats.links_abandoned));
    if stats.relations_skipped > 0 {
        summary.push_str(&format!("  Relations skipped: {}\n", stats.relations_skipped));
    }
    summary.push_str(&format!("  Elapsed: {:.1}s\n", report.elapsed.as_secs_f64()));
    summary
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<()> {
    let url = args.get_one::<Url>("url").context("--url is required")?;
    let kind: EntityKind = args
        .get_one::<String>("kind")
        .map(String::as_str)
        .unwrap_or("actor")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let config = crawl_config_from(
        *args.get_one::<usize>("actors").unwrap_or(&250),
        *args.get_one::<usize>("movies").unwrap_or(&125),
        *args.get_one::<u64>("min-delay-ms").unwrap_or(&1000),
        *args.get_one::<u64>("max-delay-ms").unwrap_or(&2000),
        args.get_one::<String>("weight")
            .map(String::as_str)
            .unwrap_or("gross-per-age"),
    )?;
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&10);
    let output = expand_path(
        args.get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or(DEFAULT_GRAPH_FILE),
    );
    let database = args.get_one::<String>("database").map(|p| expand_path(p));

    if !quiet {
        print_divider();
        println!("{}", "  CASTGRAPH CRAWL".bright_white().bold());
        print_divider();
        println!("{} Seed: {} ({})", "→".blue(), url.as_str().bright_white(), kind);
        println!(
            "{} Wanted: {} actors, {} movies",
            "→".blue(),
            config.actor_threshold,
            config.movie_threshold
        );
        println!("{} Weight policy: {}\n", "→".blue(), config.weight_policy);
    }

    let source = WikiSource::with_timeout(timeout)?;

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Fetching seed page...");

    let bar = spinner.clone();
    let progress = Arc::new(move |stats: &CrawlStats, identity: &str| {
        bar.set_message(format!(
            "{} actors, {} movies | {}",
            stats.actors_ingested, stats.movies_ingested, identity
        ));
    });

    let mut controller = CrawlController::new(source, config).with_progress_callback(progress);
    controller.seed(url.as_str(), kind);
    let report = controller.run().await?;
    spinner.finish_and_clear();

    let graph = controller.into_graph();
    let snapshot = graph.snapshot();
    snapshot::save(&output, &snapshot)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Graph written to {}", output.display());

    let run_id = match database {
        Some(db_path) => {
            let mut db = Database::new(&db_path)
                .with_context(|| format!("Failed to open database {}", db_path.display()))?;
            Some(db.save_snapshot(&snapshot, Some(url.as_str()))?)
        }
        None => None,
    };

    if !quiet {
        println!("{} Crawl complete!\n", "✓".green().bold());
        print!("{}", render_crawl_summary(&report, &graph));
        println!("\n{} Graph: {}", "✓".green().bold(), output.display());
        if let Some(run_id) = run_id {
            println!("{} Run: {}", "✓".green().bold(), run_id);
        }
    }
    Ok(())
}

pub fn handle_query(args: &ArgMatches) -> Result<()> {
    let graph = graph_from_args(args)?;
    let query = Query::new(&graph);

    let output = match args.subcommand() {
        Some(("gross", sub)) => {
            let movie = sub.get_one::<String>("MOVIE").context("MOVIE is required")?;
            match query.gross(movie) {
                Some(gross) => format!("{}: {}\n", movie.bright_white(), format_count(gross).cyan()),
                None => bail!("No movie named '{}'", movie),
            }
        }
        Some(("movies", sub)) => {
            let actor = sub.get_one::<String>("ACTOR").context("ACTOR is required")?;
            let movies = query
                .movies_of(actor)
                .with_context(|| format!("No actor named '{}'", actor))?;
            render_names(&format!("Movies with {}", actor), &movies)
        }
        Some(("actors", sub)) => {
            let movie = sub.get_one::<String>("MOVIE").context("MOVIE is required")?;
            let actors = query
                .actors_in(movie)
                .with_context(|| format!("No movie named '{}'", movie))?;
            render_names(&format!("Cast of {}", movie), &actors)
        }
        Some(("top-actors", sub)) => {
            let num = *sub.get_one::<usize>("num").unwrap_or(&10);
            render_ranking("Top actors by relation weight", &query.top_actors(num))
        }
        Some(("oldest-actors", sub)) => {
            let num = *sub.get_one::<usize>("num").unwrap_or(&10);
            render_ranking("Oldest actors", &query.oldest_actors(num))
        }
        Some(("year", sub)) => {
            let year = *sub.get_one::<i64>("YEAR").context("YEAR is required")?;
            if sub.get_flag("actors") {
                render_names(&format!("Actors in {} movies", year), &query.actors_in_year(year))
            } else {
                render_names(&format!("Movies from {}", year), &query.movies_in_year(year))
            }
        }
        Some(("filter", sub)) => {
            let kind: EntityKind = sub
                .get_one::<String>("kind")
                .map(String::as_str)
                .unwrap_or("actor")
                .parse()
                .map_err(anyhow::Error::msg)?;
            let filter = VertexFilter {
                names: sub
                    .get_many::<String>("name")
                    .map(|v| v.cloned().collect())
                    .unwrap_or_default(),
                primary: sub
                    .get_many::<i64>("primary")
                    .map(|v| v.copied().collect())
                    .unwrap_or_default(),
                secondary: sub
                    .get_many::<i64>("secondary")
                    .map(|v| v.copied().collect())
                    .unwrap_or_default(),
            };
            render_vertices(&format!("Matching {}s", kind), &query.filter(kind, &filter))
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    print!("{}", output);
    Ok(())
}

pub fn handle_analyze(args: &ArgMatches) -> Result<()> {
    let graph = graph_from_args(args)?;
    let analyze = Analyze::new(&graph);

    let output = match args.subcommand() {
        Some(("hubs", sub)) => {
            let num = *sub.get_one::<usize>("num").unwrap_or(&10);
            render_ranking("Actors by distinct co-stars", &analyze.hub_actors(num))
        }
        Some(("gross-by-age", sub)) => {
            let num = *sub.get_one::<usize>("num").unwrap_or(&10);
            render_ranking("Total gross by actor age", &analyze.gross_by_age(num))
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    print!("{}", output);
    Ok(())
}

pub fn render_runs(runs: &[RunSummary]) -> String {
    let mut report = format!("{}\n", "Crawl runs".bright_white().bold());
    if runs.is_empty() {
        report.push_str(&format!("  {}\n", "(none)".dimmed()));
    }
    for run in runs {
        report.push_str(&format!(
            "  {} {} {} vertices, {} relations, seed {}\n",
            run.id.cyan(),
            run.crawled_at.format("%Y-%m-%d %H:%M:%S"),
            run.vertex_count,
            run.relation_count,
            run.seed_link.as_deref().unwrap_or("-")
        ));
    }
    report
}

fn open_existing(db_path: &Path) -> Result<Database> {
    if !Database::exists(db_path) {
        bail!("No database at {}", db_path.display());
    }
    Database::new(db_path).with_context(|| format!("Failed to open database {}", db_path.display()))
}

pub fn handle_runs(args: &ArgMatches) -> Result<()> {
    let db_path = expand_path(args.get_one::<String>("database").context("--database is required")?);
    let db = open_existing(&db_path)?;
    print!("{}", render_runs(&db.list_runs()?));
    Ok(())
}

pub fn handle_export(args: &ArgMatches) -> Result<()> {
    let db_path = expand_path(args.get_one::<String>("database").context("--database is required")?);
    let output = expand_path(
        args.get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or(DEFAULT_GRAPH_FILE),
    );
    let db = open_existing(&db_path)?;

    let snapshot = match args.get_one::<String>("run") {
        Some(run_id) => db
            .load_snapshot(run_id)?
            .with_context(|| format!("No crawl run '{}'", run_id))?,
        None => db
            .load_latest_snapshot()?
            .with_context(|| format!("No crawl runs recorded in {}", db_path.display()))?,
    };

    snapshot::save(&output, &snapshot)?;
    println!(
        "{} Exported {} vertices to {}",
        "✓".green().bold(),
        snapshot.vertices.len(),
        output.display()
    );
    Ok(())
}

fn vertex_of_kind<'a>(graph: &'a GraphStore, kind: EntityKind, identity: &str) -> Result<&'a Vertex> {
    match graph.get_vertex(identity) {
        Some(vertex) if vertex.kind == kind => Ok(vertex),
        Some(vertex) => bail!("'{}' is a {}, not a {}", identity, vertex.kind, kind),
        None => bail!("No {} named '{}'", kind, identity),
    }
}

fn save_graph(path: &Path, graph: &GraphStore) -> Result<()> {
    snapshot::save(path, &graph.snapshot())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Overwrite the attributes of an existing vertex in the snapshot at `path`.
/// `None` keeps the stored value.
pub fn update_vertex_in(
    path: &Path,
    kind: EntityKind,
    identity: &str,
    primary: Option<i64>,
    secondary: Option<i64>,
) -> Result<Vertex> {
    let mut graph = load_graph(path, None)?;
    vertex_of_kind(&graph, kind, identity)?;
    let updated = graph.update_attributes(identity, primary, secondary)?.clone();
    save_graph(path, &graph)?;
    info!("Updated {} '{}'", kind, identity);
    Ok(updated)
}

/// Add an unrelated vertex to the snapshot at `path`, creating the file if
/// it does not exist yet.
pub fn add_vertex_to(
    path: &Path,
    kind: EntityKind,
    identity: &str,
    primary: i64,
    secondary: i64,
) -> Result<Vertex> {
    let mut graph = if path.exists() {
        load_graph(path, None)?
    } else {
        GraphStore::new()
    };
    if graph.contains(identity) {
        bail!("'{}' is already in the graph", identity);
    }
    let added = graph.add_vertex(kind, identity, primary, secondary)?.clone();
    save_graph(path, &graph)?;
    info!("Added {} '{}'", kind, identity);
    Ok(added)
}

/// Remove a vertex and all of its relations from the snapshot at `path`.
pub fn remove_vertex_from(path: &Path, kind: EntityKind, identity: &str) -> Result<Vertex> {
    let mut graph = load_graph(path, None)?;
    vertex_of_kind(&graph, kind, identity)?;
    let removed = graph
        .remove_vertex(identity)
        .with_context(|| format!("No {} named '{}'", kind, identity))?;
    save_graph(path, &graph)?;
    info!("Removed {} '{}'", kind, identity);
    Ok(removed)
}

struct EditArgs<'a> {
    path: PathBuf,
    kind: EntityKind,
    name: &'a str,
}

fn edit_args(args: &ArgMatches) -> Result<EditArgs<'_>> {
    let path = expand_path(
        args.get_one::<String>("input")
            .map(String::as_str)
            .unwrap_or(DEFAULT_GRAPH_FILE),
    );
    let kind: EntityKind = args
        .get_one::<String>("kind")
        .map(String::as_str)
        .unwrap_or("actor")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let name = args.get_one::<String>("NAME").context("NAME is required")?;
    Ok(EditArgs { path, kind, name })
}

pub fn handle_update(args: &ArgMatches) -> Result<()> {
    let edit = edit_args(args)?;
    let primary = args.get_one::<i64>("primary").copied();
    let secondary = args.get_one::<i64>("secondary").copied();
    if primary.is_none() && secondary.is_none() {
        bail!("Nothing to update: pass --primary and/or --secondary");
    }

    let vertex = update_vertex_in(&edit.path, edit.kind, edit.name, primary, secondary)?;
    print!("{}", render_vertices("Updated", &[&vertex]));
    Ok(())
}

pub fn handle_add(args: &ArgMatches) -> Result<()> {
    let edit = edit_args(args)?;
    let primary = *args.get_one::<i64>("primary").unwrap_or(&-1);
    let secondary = *args.get_one::<i64>("secondary").unwrap_or(&0);

    let vertex = add_vertex_to(&edit.path, edit.kind, edit.name, primary, secondary)?;
    print!("{}", render_vertices("Added", &[&vertex]));
    Ok(())
}

pub fn handle_remove(args: &ArgMatches) -> Result<()> {
    let edit = edit_args(args)?;
    let vertex = remove_vertex_from(&edit.path, edit.kind, edit.name)?;
    println!(
        "{} Removed {} '{}' and its relations",
        "✓".green().bold(),
        vertex.kind,
        vertex.identity
    );
    Ok(())
}
