//! # tfprof
//!
//! A CLI tool to profile Terraform runs from their logs.
//!
//! ## Overview
//!
//! tfprof is built on top of tfproflib and reads a Terraform log (a file,
//! or stdin when piped into a live run) to report what happened to every
//! managed resource: when its modification started and finished, how long
//! it took, and how the run ended for it. Resources created in
//! `count`/`for_each` loops are aggregated into one entry.
//!
//! ## Usage
//!
//! ```bash
//! # Profile a saved run
//! tfprof table terraform.log
//!
//! # Profile a live run
//! terraform apply -auto-approve | tfprof table
//!
//! # JSON output
//! tfprof table terraform.log --output json
//!
//! # High-level run statistics
//! tfprof stats terraform.log
//!
//! # Only the log lines for matching resources
//! tfprof filter 'module.*.aws_instance.web[*]' terraform.log
//!
//! # Gantt chart (pipe into gnuplot)
//! tfprof graph terraform.log | gnuplot
//! ```

mod render;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tfproflib::{
    aggregate, all_stats, filter_lines, gnuplot_script, parse, parse_file, repair_unfinished,
    ParsedLog, ProfileTable,
};

fn file_arg() -> Arg {
    Arg::new("file").help("Log file to profile (reads stdin when omitted)")
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("tfprof")
        .version(env!("CARGO_PKG_VERSION"))
        .about("CLI tool to profile Terraform runs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("table")
                .about("Parse a Terraform log and show per-resource metrics")
                .arg(file_arg())
                .arg(
                    Arg::new("sort")
                        .short('s')
                        .long("sort")
                        .default_value("tot_time=desc,resource=asc")
                        .help("Comma-separated list of column=(asc|desc) to control sorting"),
                )
                .arg(
                    Arg::new("no-aggregate")
                        .long("no-aggregate")
                        .action(ArgAction::SetTrue)
                        .help("Keep count/for_each instances as separate rows"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(["table", "json"])
                        .default_value("table")
                        .help("Output format"),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Parse a Terraform log and show general statistics")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("filter")
                .about("Filter a Terraform log to only selected resources")
                .arg(
                    Arg::new("query")
                        .required(true)
                        .help("Resource query, e.g. 'module.*.aws_instance.web[*]'"),
                )
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("graph")
                .about("Render a Terraform run as a gnuplot Gantt chart")
                .arg(file_arg())
                .arg(
                    Arg::new("width")
                        .short('W')
                        .long("width")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("1000")
                        .help("Width of the generated image"),
                )
                .arg(
                    Arg::new("height")
                        .short('H')
                        .long("height")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("600")
                        .help("Height of the generated image"),
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .default_value("tfprof-graph.png")
                        .help("Output file written by gnuplot"),
                ),
        )
}

/// Parse the log named on the command line, or stdin if none was.
fn load_log(matches: &ArgMatches) -> Result<ParsedLog> {
    let log = match matches.get_one::<String>("file") {
        Some(path) => parse_file(Path::new(path))?,
        None => parse(io::stdin().lock())?,
    };
    Ok(log)
}

fn run_table(matches: &ArgMatches) -> Result<()> {
    let mut log = load_log(matches)?;
    if !matches.get_flag("no-aggregate") {
        log = aggregate(&log)?;
    }

    let sort_spec = matches.get_one::<String>("sort").unwrap();
    let table = ProfileTable::from_log(&log, sort_spec)?;

    match matches.get_one::<String>("output").unwrap().as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&table)?),
        _ => render::print_table(&table),
    }
    Ok(())
}

fn run_stats(matches: &ArgMatches) -> Result<()> {
    let log = aggregate(&load_log(matches)?)?;
    render::print_stats(&all_stats(&log));
    Ok(())
}

fn run_filter(matches: &ArgMatches) -> Result<()> {
    let query = matches.get_one::<String>("query").unwrap();
    let lines = match matches.get_one::<String>("file") {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            filter_lines(io::BufReader::new(file), query)?
        }
        None => filter_lines(io::stdin().lock(), query)?,
    };
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn run_graph(matches: &ArgMatches) -> Result<()> {
    let log = repair_unfinished(&aggregate(&load_log(matches)?)?);
    let width = *matches.get_one::<u32>("width").unwrap();
    let height = *matches.get_one::<u32>("height").unwrap();
    let out = matches.get_one::<String>("out").unwrap();

    print!("{}", gnuplot_script(&log, width, height, out));
    Ok(())
}

fn run() -> Result<()> {
    let matches = build_command().get_matches();
    match matches.subcommand() {
        Some(("table", sub)) => run_table(sub),
        Some(("stats", sub)) => run_stats(sub),
        Some(("filter", sub)) => run_filter(sub),
        Some(("graph", sub)) => run_graph(sub),
        _ => unreachable!("subcommand is required"),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
