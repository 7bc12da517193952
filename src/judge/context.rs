/// Test context capability supplied by the host test framework
///
/// Checks never panic or abort the grading run. They report through this
/// trait and return normally.
pub trait TestContext {
    /// Record a non-fatal failure; the test keeps running
    fn fail(&mut self, message: &str);

    /// Surface informational text (build warnings, diagnostics)
    fn info(&mut self, message: &str) {
        log::info!("{}", message);
    }
}

impl<T: TestContext + ?Sized> TestContext for &mut T {
    fn fail(&mut self, message: &str) {
        (**self).fail(message)
    }

    fn info(&mut self, message: &str) {
        (**self).info(message)
    }
}

/// Context that keeps every message, for embedding and tests
#[derive(Debug, Default, Clone)]
pub struct RecordingContext {
    pub failures: Vec<String>,
    pub notes: Vec<String>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

impl TestContext for RecordingContext {
    fn fail(&mut self, message: &str) {
        log::warn!("check failed: {}", message);
        self.failures.push(message.to_string());
    }

    fn info(&mut self, message: &str) {
        log::info!("{}", message);
        self.notes.push(message.to_string());
    }
}
