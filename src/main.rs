use std::path::Path;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};

fn main() -> ExitCode {
    const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

    let matches = Command::new("oprex")
        .version(VERSION)
        .propagate_version(true)
        .about("The oprex readable regular expression compiler.")
        .disable_help_subcommand(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log the compilation stages to stderr."),
        )
        .arg(
            Arg::new("filename")
                .required(true)
                .help("The file containing the oprex source code to compile."),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let filename = match matches.get_one::<String>("filename") {
        Some(filename) => Path::new(filename),
        None => return ExitCode::FAILURE,
    };

    let source = match oprex::parsing::load(filename) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::FAILURE;
        }
    };

    match oprex::compile(&source) {
        Ok(pattern) => {
            println!("{}", pattern);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}
