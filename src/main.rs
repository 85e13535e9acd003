//! Gridcalc - evaluate spreadsheet formulas from the command line

mod assign;
mod config;
mod error;
mod logger;

use anyhow::Context;
use gridcalc_core::{EvalMode, Sheet};
use std::env;
use std::io;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: gridcalc [OPTIONS]");
    eprintln!();
    eprintln!("Without -c, reads ID=VALUE lines from stdin and prints each cell's value.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula and print the result");
    eprintln!("  -s, --set <ID=VALUE>      Write a cell before evaluating (can be repeated)");
    eprintln!("  -m, --mode <MODE>         Evaluation mode: tree (default) or rewrite");
    eprintln!("  --max-passes <N>          Pass limit for rewrite mode");
    eprintln!("  --config <FILE>           Load configuration from FILE");
    eprintln!("  --no-config               Ignore the user configuration file");
    eprintln!("  -v, --verbose             Log evaluation steps to stderr (repeat for more)");
    eprintln!("  -h, --help                Print help");
}

struct Args {
    command: Option<String>,
    sets: Vec<String>,
    mode: Option<EvalMode>,
    max_passes: Option<usize>,
    config_file: Option<PathBuf>,
    no_config: bool,
    verbosity: u8,
}

fn next_value(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    if *i >= args.len() {
        eprintln!("Error: {} requires {}", flag, what);
        std::process::exit(1);
    }
    args[*i].to_string()
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        command: None,
        sets: Vec::new(),
        mode: None,
        max_passes: None,
        config_file: None,
        no_config: false,
        verbosity: 0,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-c" | "--command" => {
                parsed.command = Some(next_value(&args, &mut i, "--command", "a formula"));
            }
            "-s" | "--set" => {
                parsed.sets.push(next_value(&args, &mut i, "--set", "ID=VALUE"));
            }
            "-m" | "--mode" => {
                let value = next_value(&args, &mut i, "--mode", "a value");
                match value.parse::<EvalMode>() {
                    Ok(mode) => parsed.mode = Some(mode),
                    Err(err) => {
                        eprintln!("Error: {}", err);
                        std::process::exit(1);
                    }
                }
            }
            "--max-passes" => {
                let value = next_value(&args, &mut i, "--max-passes", "a number");
                match value.parse::<usize>() {
                    Ok(n) if n > 0 => parsed.max_passes = Some(n),
                    _ => {
                        eprintln!("Error: --max-passes must be a positive integer");
                        std::process::exit(1);
                    }
                }
            }
            "--config" => {
                parsed.config_file = Some(PathBuf::from(next_value(
                    &args,
                    &mut i,
                    "--config",
                    "a file path",
                )));
            }
            "--no-config" => parsed.no_config = true,
            "-v" | "--verbose" => parsed.verbosity = parsed.verbosity.saturating_add(1),
            "-vv" => parsed.verbosity = parsed.verbosity.saturating_add(2),
            arg => {
                eprintln!("Error: Unknown argument: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }
    parsed
}

fn build_sheet(args: &Args) -> anyhow::Result<Sheet> {
    let config = if args.no_config {
        config::Config::default()
    } else {
        let (config, warnings) = config::load_config(args.config_file.as_ref());
        for warning in warnings {
            eprintln!("Warning: {}", warning);
        }
        config
    };

    let mut options = config.options;
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    if let Some(n) = args.max_passes {
        options.max_passes = n;
    }

    let sheet = Sheet::new(options);
    for (id, value) in &config.cells {
        sheet
            .update(id, value)
            .with_context(|| format!("config cell {}", id))?;
    }
    for (idx, set) in args.sets.iter().enumerate() {
        let Some((id, value)) = assign::parse_assignment(set, idx + 1)? else {
            continue;
        };
        sheet
            .update(&id, &value)
            .with_context(|| format!("--set {}", set))?;
    }
    Ok(sheet)
}

fn run(args: &Args) -> anyhow::Result<i32> {
    let sheet = build_sheet(args)?;

    if let Some(formula) = &args.command {
        return match sheet.evaluate(formula) {
            Ok(result) => {
                println!("{}", result);
                Ok(0)
            }
            Err(err) => {
                println!("#ERR: {}", err);
                Ok(1)
            }
        };
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let failures = assign::run_assignments(&sheet, stdin.lock(), &mut stdout)
        .context("reading assignments from stdin")?;
    Ok(if failures > 0 { 1 } else { 0 })
}

fn main() {
    let args = parse_args();
    logger::init(args.verbosity);

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
