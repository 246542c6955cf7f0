//! Text classifier contract.
//!
//! The classifier model itself is external; the core only consumes a label.

/// Maps free task text to a raw category label.
///
/// Returning `None` means classification failed. Callers must always have a
/// fallback category; a missing label never blocks task creation.
pub trait TaskClassifier {
    fn classify(&self, text: &str) -> Option<String>;
}

impl<F> TaskClassifier for F
where
    F: Fn(&str) -> Option<String>,
{
    fn classify(&self, text: &str) -> Option<String> {
        self(text)
    }
}

/// Classifier used when no model is available. Always yields no label.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClassifier;

impl TaskClassifier for NoopClassifier {
    fn classify(&self, _text: &str) -> Option<String> {
        None
    }
}
