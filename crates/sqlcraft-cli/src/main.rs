mod commands;
mod config;
mod logger;

use std::process::ExitCode;

use clap::Parser;
use commands::{Cli, Commands, CteArgs, FormatArgs, ParseArgs, PresetArg};
use config::Config;
use sqlcraft_cte::CteGraph;
use sqlcraft_printer::{Preset, PrinterOptions};

fn main() -> ExitCode {
    if let Err(err) = logger::init() {
        eprintln!("failed to initialize logging: {err}");
    }
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Parse(args) => run_parse(args),
        Commands::Format(args) => run_format(args),
        Commands::Cte(args) => run_cte(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|err| format!("failed to read {path}: {err}"))
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let text = read_file(&args.file_path)?;
    sqlcraft_api::parse(&text).map_err(|err| format!("parse error: {err}"))?;
    println!("ok");
    Ok(())
}

fn run_format(args: FormatArgs) -> Result<(), String> {
    let text = read_file(&args.file_path)?;
    let query = sqlcraft_api::parse(&text).map_err(|err| format!("parse error: {err}"))?;
    let config = Config::load()?;
    let preset = match config.resolve_preset(args.preset) {
        PresetArg::Generic => Preset::Generic,
        PresetArg::Postgres => Preset::Postgres,
    };
    let options = PrinterOptions::from_preset(preset);
    let printed = sqlcraft_api::format(&query, &options).map_err(|err| format!("format error: {err}"))?;
    println!("{}", printed.text);
    Ok(())
}

fn run_cte(args: CteArgs) -> Result<(), String> {
    let text = read_file(&args.file_path)?;
    let query = sqlcraft_api::parse(&text).map_err(|err| format!("parse error: {err}"))?;
    let graph = CteGraph::build(&query).map_err(|err| format!("graph error: {err}"))?;

    if graph.has_cycle() {
        println!("cycle detected");
        return Ok(());
    }

    let order = graph.execution_order().map_err(|err| format!("graph error: {err}"))?;
    for name in &order {
        if name.as_str() == sqlcraft_cte::MAIN_QUERY {
            println!("{name} (main query)");
            continue;
        }
        let deps = graph.dependencies(name).unwrap_or_default();
        if deps.is_empty() {
            println!("{name}");
        } else {
            println!("{name} depends on {}", deps.join(", "));
        }
    }
    Ok(())
}
