//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, OrchardTheme, OutputMode, UserInterface};

/// Writes styled output to stdout.
pub struct TerminalUI {
    term: Term,
    theme: OrchardTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI, styled unless colors are disabled.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_colors(mode, should_use_colors())
    }

    pub fn with_colors(mode: OutputMode, colors: bool) -> Self {
        let theme = if colors {
            OrchardTheme::new()
        } else {
            OrchardTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn detail(&mut self, msg: &str) {
        if self.mode.shows_details() {
            writeln!(self.term, "  {}", self.theme.dim.apply_to(msg)).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_results() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn pending(&mut self, msg: &str) {
        if self.mode.shows_results() {
            writeln!(self.term, "{}", self.theme.format_pending(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_results() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }
}
