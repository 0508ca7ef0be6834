//! Ordered category → messages accumulator.

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// A named group of messages, e.g. `clocks`, `Wire` or `Component uart0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The category name.
    pub name: String,
    /// Messages in the order they were recorded.
    pub messages: Vec<Message>,
}

/// The result of a check: messages grouped by category.
///
/// Categories keep the order in which their first message was recorded, and
/// a category only exists once it holds at least one message. Two checks of
/// the same input therefore produce equal reports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    categories: Vec<Category>,
}

impl Report {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message under `category`, creating the category on first use.
    pub fn push(&mut self, category: &str, message: Message) {
        match self.categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.messages.push(message),
            None => self.categories.push(Category {
                name: category.to_string(),
                messages: vec![message],
            }),
        }
    }

    /// Records an error under `category`.
    pub fn error(&mut self, category: &str, text: impl Into<String>) {
        self.push(category, Message::error(text));
    }

    /// Records a warning under `category`.
    pub fn warning(&mut self, category: &str, text: impl Into<String>) {
        self.push(category, Message::warning(text));
    }

    /// Records every message of `messages` under `category`.
    pub fn extend<I>(&mut self, category: &str, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        for message in messages {
            self.push(category, message);
        }
    }

    /// Returns `true` if any category holds an error.
    pub fn has_errors(&self) -> bool {
        self.iter().any(|(_, m)| m.is_error())
    }

    /// Returns `true` if nothing at all was recorded.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Returns the number of error messages across all categories.
    pub fn error_count(&self) -> usize {
        self.iter().filter(|(_, m)| m.is_error()).count()
    }

    /// Returns the number of warning messages across all categories.
    pub fn warning_count(&self) -> usize {
        self.iter().filter(|(_, m)| !m.is_error()).count()
    }

    /// Returns the categories in recording order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Looks up a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Iterates over `(category name, message)` pairs in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.categories
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    /// Returns `true` if some message text in any category contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.iter().any(|(_, m)| m.text.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    #[test]
    fn empty_report() {
        let report = Report::new();
        assert!(report.is_empty());
        assert!(!report.has_errors());
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn categories_keep_first_use_order() {
        let mut report = Report::new();
        report.error("clocks", "No clock domain defined.");
        report.warning("Components", "globals interface 'export' not used.");
        report.error("clocks", "Clock 'sys' has bad frequency value.");

        let names: Vec<_> = report.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["clocks", "Components"]);
        assert_eq!(report.category("clocks").unwrap().messages.len(), 2);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let mut report = Report::new();
        report.warning("Components", "unused parameter OFFSET.");
        assert!(!report.is_empty());
        assert!(!report.has_errors());
    }

    #[test]
    fn extend_with_nothing_creates_no_category() {
        let mut report = Report::new();
        report.extend("IP uart", Vec::new());
        assert!(report.is_empty());
    }

    #[test]
    fn iter_yields_category_names() {
        let mut report = Report::new();
        report.extend(
            "IP uart",
            vec![Message::error("no top file defined"), Message::warning("w")],
        );
        let collected: Vec<_> = report.iter().map(|(c, m)| (c, m.severity)).collect();
        assert_eq!(
            collected,
            vec![("IP uart", Severity::Error), ("IP uart", Severity::Warning)]
        );
        assert!(report.mentions("top file"));
    }
}
