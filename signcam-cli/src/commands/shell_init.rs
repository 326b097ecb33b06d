//! Shell wrapper printed for `eval "$(signcam shell-init bash)"`.
//!
//! A child process can't move its parent shell, so the wrapper runs the
//! binary and then performs the `cd "$HOME"` itself. Only launches return
//! home; `signcam config ...` leaves the shell where it is.

use anyhow::Result;
use clap::{Args, ValueEnum};

#[derive(Args)]
pub struct ShellInitArgs {
    /// Shell to generate the wrapper for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

const POSIX_WRAPPER: &str = r#"signcam() {
    command signcam "$@"
    local rc=$?
    if [ $# -eq 0 ] || [ "$1" = "launch" ]; then
        cd "$HOME" || return $rc
    fi
    return $rc
}
"#;

const FISH_WRAPPER: &str = r#"function signcam
    command signcam $argv
    set -l rc $status
    if test (count $argv) -eq 0; or test "$argv[1]" = "launch"
        cd $HOME
    end
    return $rc
end
"#;

pub fn wrapper(shell: Shell) -> &'static str {
    match shell {
        Shell::Bash | Shell::Zsh => POSIX_WRAPPER,
        Shell::Fish => FISH_WRAPPER,
    }
}

pub fn run(args: ShellInitArgs) -> Result<()> {
    print!("{}", wrapper(args.shell));
    Ok(())
}
