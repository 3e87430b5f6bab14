use std::cell::RefCell;

/// Warning/error sink handed to the writer at construction.
///
/// Messages are forwarded to the `log` crate and also recorded so callers
/// (and tests) can inspect them after a render. One instance per document
/// render; nothing here is shared across writers.
#[derive(Default)]
pub struct Diagnostics {
    warnings: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&self, msg: impl Into<String>) {
        let msg = msg.into();
        log::warn!("{msg}");
        self.warnings.borrow_mut().push(msg);
    }

    /// Warning tagged with the source line it (approximately) came from.
    pub fn warn_at(&self, source_line: Option<u32>, msg: impl Into<String>) {
        match source_line {
            Some(line) => self.warn(format!("{} (around input line {line})", msg.into())),
            None => self.warn(msg),
        }
    }

    pub fn error(&self, msg: impl Into<String>) {
        let msg = msg.into();
        log::error!("{msg}");
        self.errors.borrow_mut().push(msg);
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.borrow().len()
    }
}
