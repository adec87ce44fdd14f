//! Shell completion scripts
//!
//! The scripts complete the `-l` and `--completions` options and ask
//! `lus -l` for the subcommands of the task file in scope.

use clap::ValueEnum;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

const BASH: &str = r#"_lus_completions() {
    local cur prev
    cur="${COMP_WORDS[COMP_CWORD]}"
    prev="${COMP_WORDS[COMP_CWORD-1]}"

    if [[ "$cur" == -* ]]; then
        COMPREPLY=($(compgen -W "-l --completions" -- "$cur"))
        return
    fi

    if [[ "$prev" == "--completions" ]]; then
        COMPREPLY=($(compgen -W "bash zsh fish powershell" -- "$cur"))
        return
    fi

    local subcommands
    subcommands=$(lus -l 2>/dev/null | tail -n +2 | awk '{print $1}' | sed 's/\x1b\[[0-9;]*m//g')

    if [[ -n "$subcommands" ]]; then
        COMPREPLY=($(compgen -W "$subcommands" -- "$cur"))
    fi
}

complete -F _lus_completions lus"#;

const ZSH: &str = r#"#compdef lus

_lus() {
    local -a subcommands
    local -a options

    options=(
        '-l[List available subcommands]'
        '--completions[Generate shell completion script]:shell:(bash zsh fish powershell)'
    )

    if [[ -f lus.kdl ]] || _lus_find_kdl; then
        subcommands=(${(f)"$(lus -l 2>/dev/null | tail -n +2 | awk '{print $1}' | sed 's/\x1b\[[0-9;]*m//g')"})
    fi

    _arguments -s \
        $options \
        '*:subcommand:($subcommands)'
}

_lus_find_kdl() {
    local dir="$PWD"
    while [[ "$dir" != "/" ]]; do
        [[ -f "$dir/lus.kdl" ]] && return 0
        dir="${dir:h}"
    done
    return 1
}

_lus "$@""#;

const FISH: &str = r#"# Fish completion for lus

function __lus_subcommands
    lus -l 2>/dev/null | tail -n +2 | awk '{print $1}' | sed 's/\x1b\[[0-9;]*m//g'
end

complete -c lus -f

complete -c lus -s l -d "List available subcommands"
complete -c lus -l completions -xa "bash zsh fish powershell" -d "Generate shell completion script"

complete -c lus -a "(__lus_subcommands)" -d "Subcommand""#;

const POWERSHELL: &str = r#"# PowerShell completion for lus

Register-ArgumentCompleter -Native -CommandName lus -ScriptBlock {
    param($wordToComplete, $commandAst, $cursorPosition)

    $options = @('-l', '--completions')

    if ($wordToComplete -like '-*') {
        $options | Where-Object { $_ -like "$wordToComplete*" } | ForEach-Object {
            [System.Management.Automation.CompletionResult]::new($_, $_, 'ParameterValue', $_)
        }
        return
    }

    $words = $commandAst.CommandElements
    if ($words.Count -ge 2 -and $words[-2].Extent.Text -eq '--completions') {
        @('bash', 'zsh', 'fish', 'powershell') | Where-Object { $_ -like "$wordToComplete*" } | ForEach-Object {
            [System.Management.Automation.CompletionResult]::new($_, $_, 'ParameterValue', $_)
        }
        return
    }

    try {
        $output = lus -l 2>$null
        if ($output) {
            $output | Select-Object -Skip 1 | ForEach-Object {
                $line = $_ -replace '\x1b\[[0-9;]*m', ''
                $subcommand = ($line.Trim() -split '\s+')[0]
                if ($subcommand -and $subcommand -like "$wordToComplete*") {
                    [System.Management.Automation.CompletionResult]::new($subcommand, $subcommand, 'Command', $subcommand)
                }
            }
        }
    } catch {
    }
}"#;

/// Completion script for `shell`.
#[must_use]
pub fn script(shell: Shell) -> &'static str {
    match shell {
        Shell::Bash => BASH,
        Shell::Zsh => ZSH,
        Shell::Fish => FISH,
        Shell::Powershell => POWERSHELL,
    }
}
