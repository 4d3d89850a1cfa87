use castgraph::handlers::{
    handle_add, handle_analyze, handle_crawl, handle_export, handle_query, handle_remove, handle_runs,
    handle_update, init_logging,
};
use colored::Colorize;
use commands::command_argument_builder;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_logging(quiet, verbose);

    let result = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        Some(("query", primary_command)) => handle_query(primary_command),
        Some(("analyze", primary_command)) => handle_analyze(primary_command),
        Some(("update", primary_command)) => handle_update(primary_command),
        Some(("add", primary_command)) => handle_add(primary_command),
        Some(("remove", primary_command)) => handle_remove(primary_command),
        Some(("runs", primary_command)) => handle_runs(primary_command),
        Some(("export", primary_command)) => handle_export(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
