//! Report rendering backends for human-readable and machine-readable output.

use crate::report::Report;
use crate::severity::Severity;

/// Trait for rendering a [`Report`] into a formatted output string.
pub trait ReportRenderer {
    /// Renders the whole report.
    fn render(&self, report: &Report) -> String;
}

/// Renders reports as indented `ERR:`/`WARN:` lines grouped by category.
///
/// Produces output like:
/// ```text
/// clocks:
///   ERR: No clock domain defined.
/// Wire:
///   ERR: Wire 'main' has no slave.
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, severity: Severity, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match severity {
            Severity::Error => "31",
            Severity::Warning => "33",
        };
        format!("\x1b[1;{code}m{text}\x1b[0m")
    }
}

impl ReportRenderer for TerminalRenderer {
    fn render(&self, report: &Report) -> String {
        let mut out = String::new();
        for category in report.categories() {
            out.push_str(&format!("{}:\n", category.name));
            for message in &category.messages {
                let tag = self.paint(message.severity, &format!("{}:", message.severity.tag()));
                out.push_str(&format!("  {tag} {}\n", message.text));
            }
        }
        out
    }
}

/// Renders reports as pretty-printed JSON.
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &Report) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!("{{\"error\": \"cannot serialize report: {e}\"}}"))
    }
}
