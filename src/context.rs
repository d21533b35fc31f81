/// Per-call state handed to a handler: the target it operates on plus
/// bookkeeping the caller reads back once the handler returns.
///
/// Not `Clone`; the call path builds one per call and drops it when the call
/// returns.
#[derive(Debug)]
pub struct OperationContext<R> {
    target: R,
    modified: bool,
    source_path: Option<String>,
    output_path: Option<String>,
}

impl<R> OperationContext<R> {
    pub fn new(target: R) -> Self {
        Self {
            target,
            modified: false,
            source_path: None,
            output_path: None,
        }
    }

    pub fn with_source_path(mut self, path: Option<String>) -> Self {
        self.source_path = path;
        self
    }

    pub fn with_output_path(mut self, path: Option<String>) -> Self {
        self.output_path = path;
        self
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    /// Records that the handler changed the target. There is no way back.
    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    /// Path the response reports: the written file once the target changed,
    /// otherwise the file it was read from.
    pub fn reported_path(&self) -> Option<&str> {
        if self.is_modified() {
            self.output_path()
        } else {
            self.source_path()
        }
    }
}
