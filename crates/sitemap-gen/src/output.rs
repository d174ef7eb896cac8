//! Terminal reporting for the generator commands.
//!
//! Everything goes to stderr so the process output stays clean for scripts.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};
use sitemap_core::RunOutcome;

/// Colored stderr reporter.
pub(crate) struct Output {
    term: Term,
    key: Style,
    heading: Style,
    ok: Style,
    failed: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            key: Style::new().cyan(),
            heading: Style::new().bold(),
            ok: Style::new().green(),
            failed: Style::new().red(),
        }
    }

    /// Print a bold section heading.
    pub(crate) fn heading(&self, title: &str) {
        self.write(&self.heading.apply_to(title).to_string());
    }

    /// Print a `key: value` line with the key colored.
    pub(crate) fn setting(&self, key: &str, value: &dyn Display) {
        self.write(&format!("{}: {value}", self.key.apply_to(key)));
    }

    /// Report a successful publication run.
    pub(crate) fn outcome(&self, outcome: &RunOutcome, path: &Path) {
        let line = format!(
            "{} ({} URLs written to {})",
            outcome.message,
            outcome.url_count,
            path.display()
        );
        self.write(&self.ok.apply_to(line).to_string());
    }

    /// Print a failure line (red).
    pub(crate) fn failure(&self, msg: &str) {
        self.write(&self.failed.apply_to(msg).to_string());
    }

    fn write(&self, line: &str) {
        // Nothing sensible to do if stderr is gone.
        let _ = self.term.write_line(line);
    }
}
