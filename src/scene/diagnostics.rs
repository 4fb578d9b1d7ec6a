use std::cell::RefCell;

/// Sink for errors the user must see, e.g. a refused edit.
pub trait Diagnostics {
    /// Show `message` to the user.
    fn display_error(&self, message: &str);
}

/// Reports user-facing errors through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn display_error(&self, message: &str) {
        tracing::error!(target: "xform_stack::user", "{message}");
    }
}

/// Keeps reported errors in memory, for hosts that show them later.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    messages: RefCell<Vec<String>>,
}

impl CollectingDiagnostics {
    /// Every message reported so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn display_error(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
