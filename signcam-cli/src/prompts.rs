//! Operator-facing output.
//!
//! Every helper has a `*_to` variant taking a writer so output can be
//! asserted in tests.

use dialoguer::console::style;
use std::io::{self, BufRead, Write};

const HEADER_WIDTH: usize = 60;

/// Draws a boxed header with the given title.
pub fn print_header_to<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    let border = "─".repeat(HEADER_WIDTH);
    writeln!(w, "┌{}┐", border)?;
    writeln!(w, "│ {:<width$} │", title, width = HEADER_WIDTH - 2)?;
    writeln!(w, "└{}┘", border)?;
    writeln!(w)?;
    Ok(())
}

/// Explains that nothing done here leaks back into the calling shell.
pub fn print_session_warning_to<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        style("!").yellow().bold(),
        style("Directory and environment changes apply to the recognizer only.").yellow()
    )?;
    writeln!(
        w,
        "  Your shell is left where it is. To be returned to $HOME afterwards, add\n  \
         eval \"$(signcam shell-init bash)\" to your shell rc and run `signcam` through it."
    )?;
    writeln!(w)
}

/// Tells the operator to replug the camera so device rules re-apply.
pub fn print_replug_instruction_to<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        style("→").cyan().bold(),
        style("Unplug the USB camera and plug it back in.").bold()
    )?;
    writeln!(
        w,
        "  The device daemon was just started and only applies its rules to\n  \
         devices it sees connect."
    )
}

/// Prints a step message with a trailing space (no newline).
pub fn print_step_to<W: Write>(w: &mut W, message: &str) -> io::Result<()> {
    write!(w, "{} ", message)?;
    w.flush()
}

/// Prints a success message with a green checkmark.
pub fn print_success_to<W: Write>(w: &mut W, message: &str) -> io::Result<()> {
    writeln!(w, "{} {}", style("✓").green().bold(), style(message).green())
}

/// Prints an error message with a red X.
pub fn print_error_to<W: Write>(w: &mut W, message: &str) -> io::Result<()> {
    writeln!(w, "{} {}", style("✗").red().bold(), style(message).red())
}

/// Block until the operator presses Enter (or input closes).
pub fn wait_for_enter<W: Write, R: BufRead>(w: &mut W, input: &mut R) -> io::Result<()> {
    print_step_to(w, "Press Enter once the camera is reconnected...")?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut output = Vec::new();
        f(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn print_header_draws_box_with_title() {
        let result = render(|w| print_header_to(w, "signcam"));

        assert!(result.contains("┌"), "Missing top-left corner");
        assert!(result.contains("┘"), "Missing bottom-right corner");
        assert!(result.contains("signcam"), "Missing title");

        let border_line = result.lines().next().unwrap();
        assert_eq!(border_line.chars().filter(|&c| c == '─').count(), HEADER_WIDTH);
    }

    #[test]
    fn session_warning_mentions_shell_init() {
        let result = render(|w| print_session_warning_to(w));
        assert!(result.contains("recognizer only"));
        assert!(result.contains("signcam shell-init"));
    }

    #[test]
    fn replug_instruction_mentions_usb_camera() {
        let result = render(|w| print_replug_instruction_to(w));
        assert!(result.contains("Unplug the USB camera"));
    }

    #[test]
    fn print_step_ends_with_space_no_newline() {
        let result = render(|w| print_step_to(w, "Loading"));
        assert!(result.ends_with(' '));
        assert!(!result.ends_with('\n'));
    }

    #[test]
    fn print_success_and_error_include_message() {
        assert!(render(|w| print_success_to(w, "Done")).contains("Done"));
        assert!(render(|w| print_error_to(w, "Broken")).contains("Broken"));
    }

    #[test]
    fn wait_for_enter_consumes_one_line() {
        let mut input = io::Cursor::new(b"\nrest\n".to_vec());
        let result = render(|w| wait_for_enter(w, &mut input));

        assert!(result.contains("Press Enter"));
        assert_eq!(input.position(), 1);
    }

    #[test]
    fn wait_for_enter_returns_on_eof() {
        let mut input = io::Cursor::new(Vec::new());
        let result = render(|w| wait_for_enter(w, &mut input));
        assert!(result.contains("Press Enter"));
    }
}
