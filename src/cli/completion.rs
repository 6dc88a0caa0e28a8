//! Shell completion generation for matchkit
//!
//! Generates completion scripts for bash, zsh, fish and PowerShell. The
//! bash and fish scripts also complete `complete <NEEDLE>` by asking
//! matchkit itself, fed from the candidate file named with `--file`.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};

const BIN_NAME: &str = "matchkit";

/// Generate shell completion script
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish, powershell)
///
/// # Returns
/// * `Result<String>` - The completion script
pub fn generate_completion(shell_name: &str) -> Result<String> {
    let shell = parse_shell(shell_name)?;
    let basic = basic_completion(shell);

    let script = match shell {
        Shell::Bash => format!("{basic}{}", BASH_NEEDLE_COMPLETION),
        Shell::Fish => format!("{basic}{}", FISH_NEEDLE_COMPLETION),
        _ => basic,
    };
    Ok(script)
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "powershell" | "pwsh" => Ok(Shell::PowerShell),
        _ => Err(ConfigError::InvalidValue {
            field: "shell".to_string(),
            value: format!("{shell_name} (supported: bash, zsh, fish, powershell)"),
        }
        .into()),
    }
}

fn basic_completion(shell: Shell) -> String {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

const BASH_NEEDLE_COMPLETION: &str = r#"
# Complete the needle of `matchkit complete` from the candidate file
_matchkit_needle() {
    local cur file i
    cur="${COMP_WORDS[COMP_CWORD]}"
    for ((i = 1; i < COMP_CWORD; i++)); do
        if [[ "${COMP_WORDS[i]}" == "-f" || "${COMP_WORDS[i]}" == "--file" ]]; then
            file="${COMP_WORDS[i + 1]}"
        fi
    done
    if [[ "${COMP_WORDS[1]}" == "complete" && -n "$file" ]]; then
        COMPREPLY=($(matchkit complete --file "$file" -- "$cur" 2>/dev/null | tail -n +2 | cut -f1))
        return 0
    fi
    _matchkit "$@"
}

complete -F _matchkit_needle -o bashdefault -o default matchkit
"#;

const FISH_NEEDLE_COMPLETION: &str = r#"
# Complete the needle of `matchkit complete` from the candidate file
function __matchkit_needle
    set -l tokens (commandline -opc)
    set -l file (string replace -r -- '^.*--file[= ]' '' (string match -r -- '--file[= ]\S+' "$tokens"))
    test -n "$file"; or return
    matchkit complete --file $file -- (commandline -ct) 2>/dev/null | tail -n +2 | cut -f1
end

complete -c matchkit -n "__fish_seen_subcommand_from complete" -f -a "(__matchkit_needle)"
"#;
