//! Offer to install a missing program through Homebrew (macOS only)

use crate::runner::Runner;

/// Ask whether to `brew install` the formula providing `program`.
///
/// Only acts on macOS with `brew` on the search path and an interactive stdin.
/// Every failure is logged and otherwise ignored.
#[cfg(target_os = "macos")]
pub(crate) fn offer_install(runner: &Runner<'_>, program: &str) {
    use std::io::IsTerminal;
    use std::process::Command as ProcessCommand;

    use log::{debug, warn};

    use crate::style::NAME;

    if !std::io::stdin().is_terminal() {
        return;
    }
    let Ok(brew) = which::which("brew") else {
        return;
    };
    let output = match ProcessCommand::new(&brew)
        .args(["which-formula", program])
        .output()
    {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!("brew which-formula {program} exited with {}", output.status);
            return;
        }
        Err(e) => {
            warn!("Unable to run brew which-formula: {e}");
            return;
        }
    };
    let formula = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if formula.is_empty() {
        return;
    }

    let palette = runner.palette;
    let question = format!(
        "{} Command '{program}' not found. It is provided by the Homebrew package '{}'. Do you want to install it now?",
        palette.warning_label(),
        palette.paint(NAME, &formula),
    );
    match inquire::Confirm::new(&question).with_default(true).prompt() {
        Ok(true) => {
            let brew_name = brew.to_string_lossy().into_owned();
            runner.print_command(&[brew_name, "install".to_string(), formula.clone()]);
            match ProcessCommand::new(&brew).args(["install", &formula]).status() {
                Ok(status) if status.success() => {}
                Ok(status) => warn!("brew install {formula} exited with {status}"),
                Err(e) => warn!("Unable to run brew install {formula}: {e}"),
            }
        }
        Ok(false) => {}
        Err(e) => warn!("Install prompt failed: {e}"),
    }
}

#[cfg(not(target_os = "macos"))]
pub(crate) fn offer_install(_runner: &Runner<'_>, _program: &str) {}
