use crate::CLAP_STYLING;
use castgraph::handlers::{DEFAULT_GRAPH_FILE, DEFAULT_SEED_URL};
use clap::{arg, command};
use url::Url;

fn input_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-i --"input" <PATH>)
            .required(false)
            .global(true)
            .help("Graph snapshot to read")
            .default_value(DEFAULT_GRAPH_FILE),
    )
    .arg(
        arg!(--"database" <PATH>)
            .required(false)
            .global(true)
            .help("Read the latest crawl run from this database instead of --input"),
    )
}

/// Arguments shared by the commands that edit a snapshot in place.
fn edit_args(cmd: clap::Command, attributes: bool) -> clap::Command {
    let cmd = cmd
        .arg(
            arg!(-i --"input" <PATH>)
                .required(false)
                .help("Graph snapshot to edit; it is written back in place")
                .default_value(DEFAULT_GRAPH_FILE),
        )
        .arg(
            arg!(-k --"kind" <KIND>)
                .required(false)
                .value_parser(["actor", "movie"])
                .default_value("actor"),
        )
        .arg(arg!(<NAME>).help("Actor name or movie title"));
    if !attributes {
        return cmd;
    }
    cmd.arg(
        arg!(--"primary" <NUM>)
            .required(false)
            .help("Age for actors, release year for movies")
            .value_parser(clap::value_parser!(i64))
            .allow_negative_numbers(true),
    )
    .arg(
        arg!(--"secondary" <NUM>)
            .required(false)
            .help("Gross")
            .value_parser(clap::value_parser!(i64))
            .allow_negative_numbers(true),
    )
}

fn top_arg() -> clap::Arg {
    arg!(-n --"num" <NUM>)
        .required(false)
        .help("How many entries to show")
        .value_parser(clap::value_parser!(usize))
        .default_value("10")
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("castgraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("castgraph")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress progress and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log every ingestion and relation").required(false))
        .subcommand_required(true)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl actor and movie pages starting from a seed link, building a weighted \
                actor/movie graph.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The seed page to start from")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(DEFAULT_SEED_URL),
                )
                .arg(
                    arg!(-k --"kind" <KIND>)
                        .required(false)
                        .help("What the seed page describes")
                        .value_parser(["actor", "movie"])
                        .default_value("actor"),
                )
                .arg(
                    arg!(--"actors" <NUM>)
                        .required(false)
                        .help("Minimum number of actors to collect before stopping")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("250"),
                )
                .arg(
                    arg!(--"movies" <NUM>)
                        .required(false)
                        .help("Minimum number of movies to collect before stopping")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("125"),
                )
                .arg(
                    arg!(--"min-delay-ms" <MILLIS>)
                        .required(false)
                        .help("Lower bound of the random delay before each request")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("1000"),
                )
                .arg(
                    arg!(--"max-delay-ms" <MILLIS>)
                        .required(false)
                        .help("Upper bound of the random delay before each request")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("2000"),
                )
                .arg(
                    arg!(-w --"weight" <POLICY>)
                        .required(false)
                        .help("How relation weights are computed")
                        .value_parser(["gross-per-age", "unit"])
                        .default_value("gross-per-age"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the graph snapshot")
                        .default_value(DEFAULT_GRAPH_FILE),
                )
                .arg(
                    arg!(--"database" <PATH>)
                        .required(false)
                        .help("Also record the crawl run in this SQLite database"),
                ),
        )
        .subcommand(
            input_args(command!("query"))
                .about("Look things up in a crawled graph")
                .subcommand_required(true)
                .subcommand(
                    command!("gross")
                        .about("Box-office gross of a movie")
                        .arg(arg!(<MOVIE>).help("Movie title")),
                )
                .subcommand(
                    command!("movies")
                        .about("Movies an actor appears in")
                        .arg(arg!(<ACTOR>).help("Actor name")),
                )
                .subcommand(
                    command!("actors")
                        .about("Cast of a movie")
                        .arg(arg!(<MOVIE>).help("Movie title")),
                )
                .subcommand(
                    command!("top-actors")
                        .about("Actors ranked by the total weight of their relations")
                        .arg(top_arg()),
                )
                .subcommand(
                    command!("oldest-actors")
                        .about("Oldest actors in the graph")
                        .arg(top_arg()),
                )
                .subcommand(
                    command!("year")
                        .about("Movies released in a year")
                        .arg(
                            arg!(<YEAR>)
                                .help("Release year")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            arg!(--"actors")
                                .required(false)
                                .help("List the actors in those movies instead")
                                .action(clap::ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    command!("filter")
                        .about("Vertices matching any of the given names or attributes")
                        .arg(
                            arg!(-k --"kind" <KIND>)
                                .required(false)
                                .value_parser(["actor", "movie"])
                                .default_value("actor"),
                        )
                        .arg(
                            arg!(--"name" <TEXT>)
                                .required(false)
                                .help("Substring of the name or title")
                                .action(clap::ArgAction::Append),
                        )
                        .arg(
                            arg!(--"primary" <NUM>)
                                .required(false)
                                .help("Age for actors, release year for movies")
                                .value_parser(clap::value_parser!(i64))
                                .action(clap::ArgAction::Append),
                        )
                        .arg(
                            arg!(--"secondary" <NUM>)
                                .required(false)
                                .help("Gross")
                                .value_parser(clap::value_parser!(i64))
                                .action(clap::ArgAction::Append),
                        ),
                ),
        )
        .subcommand(
            input_args(command!("analyze"))
                .about("Summaries over a crawled graph")
                .subcommand_required(true)
                .subcommand(
                    command!("hubs")
                        .about("Actors with the most distinct co-stars")
                        .arg(top_arg()),
                )
                .subcommand(
                    command!("gross-by-age")
                        .about("Total movie gross grouped by actor age")
                        .arg(top_arg()),
                ),
        )
        .subcommand(edit_args(command!("update"), true).about("Change an actor's or movie's attributes"))
        .subcommand(
            edit_args(command!("add"), true)
                .about("Add an actor or movie with no relations (primary defaults to -1, secondary to 0)"),
        )
        .subcommand(edit_args(command!("remove"), false).about("Remove an actor or movie and all of its relations"))
        .subcommand(
            command!("runs")
                .about("List crawl runs recorded in a database")
                .arg(arg!(--"database" <PATH>).required(true)),
        )
        .subcommand(
            command!("export")
                .about("Write a crawl run from a database out as a JSON snapshot")
                .arg(arg!(--"database" <PATH>).required(true))
                .arg(
                    arg!(--"run" <RUN_ID>)
                        .required(false)
                        .help("Run to export (default: the latest)"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .default_value(DEFAULT_GRAPH_FILE),
                ),
        )
}
