use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use svg_translate::{
    ExtractOptions, InjectOptions, dictionary_to_json, extract_file, find_nested_tspans,
    inject_files, load_dictionaries, parse_bytes, save_dictionary,
};

fn cli() -> Command {
    Command::new("svg-translate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Copy translations between multilingual SVG files")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Log every step")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("extract")
                .about("Build a translation mapping from an SVG file")
                .arg(
                    Arg::new("svg")
                        .help("Source SVG with translated <switch> blocks")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write the mapping here instead of stdout")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("case-sensitive")
                        .long("case-sensitive")
                        .help("Keep the case of mapping keys")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inject")
                .about("Add translations from mapping files to SVG files")
                .arg(
                    Arg::new("svg")
                        .help("Target SVG files")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("mapping")
                        .long("mapping")
                        .short('m')
                        .help("JSON mapping file (repeatable, later files win)")
                        .required(true)
                        .action(ArgAction::Append)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .short('o')
                        .help("Directory for the translated files")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("overwrite")
                        .long("overwrite")
                        .help("Replace existing translations")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("case-sensitive")
                        .long("case-sensitive")
                        .help("Match mapping keys with their case")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-sort")
                        .long("no-sort")
                        .help("Leave the default <text> where it is")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report nested <tspan> elements that block injection")
                .arg(
                    Arg::new("svg")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    match matches.subcommand() {
        Some(("extract", args)) => run_extract(args),
        Some(("inject", args)) => run_inject(args).await,
        Some(("check", args)) => run_check(args),
        _ => Err("Unknown command".into()),
    }
}

fn paths(args: &ArgMatches, name: &str) -> Vec<PathBuf> {
    args.get_many::<PathBuf>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn run_extract(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let svg = args.get_one::<PathBuf>("svg").ok_or("Missing SVG path")?;
    let options = ExtractOptions {
        case_insensitive: !args.get_flag("case-sensitive"),
    };

    let dictionary = extract_file(svg, &options)?;
    match args.get_one::<PathBuf>("output") {
        Some(output) => {
            save_dictionary(&dictionary, output)?;
            info!("Saved {} entries to {}", dictionary.len(), output.display());
        }
        None => println!("{}", dictionary_to_json(&dictionary)?),
    }
    Ok(())
}

async fn run_inject(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = args
        .get_one::<PathBuf>("output-dir")
        .ok_or("Missing output directory")?
        .clone();
    let options = InjectOptions::default()
        .with_overwrite(args.get_flag("overwrite"))
        .with_case_insensitive(!args.get_flag("case-sensitive"))
        .with_sort_switch_texts(!args.get_flag("no-sort"));

    let dictionary = load_dictionaries(&paths(args, "mapping"));
    if dictionary.is_empty() {
        return Err("No valid mappings found".into());
    }

    let report = inject_files(paths(args, "svg"), Arc::new(dictionary), options, output_dir).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_check(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    for path in paths(args, "svg") {
        let doc = match std::fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| parse_bytes(&bytes).map_err(|e| e.to_string()))
        {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                continue;
            }
        };

        let nested = find_nested_tspans(&doc);
        if nested.is_empty() {
            println!("{}: ok", path.display());
            continue;
        }
        println!("{}: {} nested tspan(s)", path.display(), nested.len());
        for tspan in nested {
            println!("  {} \"{}\"", tspan.id.as_deref().unwrap_or("-"), tspan.text);
        }
    }
    Ok(())
}
