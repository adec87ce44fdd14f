//! Diagnostics for runs that stopped early

use lus::resolver::MatchError;
use lus::style::{NAME, Palette};
use lus::unwind::{Status, Unwind};

/// Print a one-line `error:` diagnostic on stderr.
pub fn failure(message: &str) {
    eprintln!("{} {message}", Palette::stderr().error_label());
}

/// Report why a run stopped.
///
/// Argument mistakes are printed on stdout next to the listing they refer
/// to; everything else goes to stderr. A plain non-zero status prints nothing
/// since the failing program already spoke for itself.
pub fn unwind(unwind: &Unwind) {
    match unwind {
        Unwind::Terminate(Status::Code(_)) => {}
        Unwind::Terminate(Status::Message(message)) => eprintln!("{message}"),
        Unwind::Match(MatchError::UnknownSubcommand {
            subcommand,
            available,
        }) => {
            let palette = Palette::stdout();
            println!(
                "{} Unknown subcommand {} not one of:",
                palette.error_label(),
                shell_escape::unix::escape(subcommand.as_str().into())
            );
            for name in available {
                println!("    {}", palette.paint(NAME, name));
            }
        }
        Unwind::Match(e @ MatchError::UnexpectedArgument(_)) => {
            println!("{} {e}", Palette::stdout().error_label());
        }
        Unwind::Match(e) => failure(&e.to_string()),
        Unwind::Exec(e) => failure(&e.to_string()),
    }
}
