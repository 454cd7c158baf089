//! Handles all user-facing output for the CLI.
//!
//! Results go to stdout; stage status and diffs are colourised through `termcolor`.
//! Colour is only used when the target stream is a terminal.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

// ============================================================================
// STATUS REPORTING
// ============================================================================

/// Writes stage progress to stderr when verbose output is enabled.
pub struct StatusReporter {
    verbose: bool,
    stream: StandardStream,
}

impl StatusReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            stream: StandardStream::stderr(color_choice(atty::Stream::Stderr)),
        }
    }

    /// Reports a completed stage, e.g. `Parse succeeded!`.
    pub fn success(&mut self, message: &str) {
        self.emit(Color::Green, message);
    }

    /// Reports supplementary detail for the previous stage.
    pub fn detail(&mut self, message: &str) {
        self.emit(Color::Cyan, message);
    }

    fn emit(&mut self, color: Color, message: &str) {
        if !self.verbose {
            return;
        }
        let _ = self.stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = writeln!(self.stream, "{message}");
        let _ = self.stream.reset();
    }
}

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints a rendered result to stdout.
pub fn print_result(rendered: &str) {
    println!("{rendered}");
}

/// Prints a line diff between two renderings with coloured additions and removals.
pub fn print_diff(before: &str, after: &str) {
    let mut stdout = StandardStream::stdout(color_choice(atty::Stream::Stdout));
    let changeset = Changeset::new(before, after, "\n");
    write_diff(&mut stdout, &changeset.diffs);
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn write_diff(out: &mut impl WriteColor, diffs: &[Difference]) {
    for diff in diffs {
        let (prefix, color, text) = match diff {
            Difference::Same(x) => (' ', None, x),
            Difference::Add(x) => ('+', Some(Color::Green), x),
            Difference::Rem(x) => ('-', Some(Color::Red), x),
        };
        for line in text.split('\n') {
            let _ = out.set_color(ColorSpec::new().set_fg(color));
            let _ = writeln!(out, "{prefix}{line}");
        }
    }
    let _ = out.reset();
}

#[cfg(test)]
mod tests {
    use termcolor::NoColor;

    use super::*;

    #[test]
    fn diff_marks_changed_lines() {
        let changeset = Changeset::new("(def f [x:Int] x)\n(f 1)", "(def f [x:Int] x)\n(f 2)", "\n");
        let mut out = NoColor::new(Vec::new());
        write_diff(&mut out, &changeset.diffs);
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, " (def f [x:Int] x)\n-(f 1)\n+(f 2)\n");
    }
}
