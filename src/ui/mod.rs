//! Command output.
//!
//! - [`UserInterface`] trait so commands can be tested without a terminal
//! - [`TerminalUI`] for real runs
//! - [`MockUI`] capturing everything for assertions
//!
//! # Example
//!
//! ```
//! use orchard_recipes::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("Blog");
//! ui.success("Recipe executed");
//! assert!(ui.has_success("Recipe executed"));
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, OrchardTheme};

/// Output sink used by commands.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Change the output mode.
    fn set_output_mode(&mut self, mode: OutputMode);

    /// A status message.
    fn message(&mut self, msg: &str);

    /// Secondary detail, shown in verbose mode.
    fn detail(&mut self, msg: &str);

    /// Something completed successfully.
    fn success(&mut self, msg: &str);

    /// Something is still waiting to run.
    fn pending(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Errors are always shown.
    fn error(&mut self, msg: &str);

    /// A header/banner.
    fn show_header(&mut self, title: &str);
}
