mod report;

use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, warn};

use lus::completions::{self, Shell};
use lus::config_file::load_lusfile;
use lus::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "lus",
    about = "A simple task runner using KDL for configuration",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print the completion script for a shell
    #[arg(long, value_enum)]
    completions: Option<Shell>,

    /// Subcommands and flags matched against lus.kdl (`-l` lists subcommands)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        println!("{}", completions::script(shell));
        return ExitCode::SUCCESS;
    }

    let settings = Settings::from_env();
    init_logging(&settings);

    if let Err(e) = ctrlc::set_handler(|| std::process::exit(130)) {
        warn!("Unable to install interrupt handler: {e}");
    }

    let invocation_directory = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            report::failure(&format!("Unknown working directory: {e}"));
            return ExitCode::FAILURE;
        }
    };

    let lusfile = match load_lusfile(settings.file.as_deref()) {
        Ok(lusfile) => lusfile,
        Err(e) => {
            report::failure(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    debug!(
        "Loaded {} ({} top-level nodes)",
        lusfile.path.display(),
        lusfile.nodes.len()
    );

    match lus::run(
        &lusfile,
        &cli.args,
        invocation_directory,
        settings.print_commands,
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(unwind) => {
            report::unwind(&unwind);
            ExitCode::from(unwind.exit_code())
        }
    }
}

fn init_logging(settings: &Settings) {
    let Some(path) = &settings.log_file else {
        lus::logger::init(None);
        return;
    };
    match File::create(path) {
        Ok(file) => lus::logger::init(Some(file)),
        Err(e) => {
            lus::logger::init(None);
            warn!("Unable to open log file {}: {e}", path.display());
        }
    }
}
