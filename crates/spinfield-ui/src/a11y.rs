use std::cell::RefCell;

/// Speaks text through the platform's live region without moving focus.
pub trait Announcer {
    fn announce(&self, msg: &str);
}

/// The text input behind a spin control.
pub trait TextInputFocus {
    /// Selects the whole content, so typing replaces it.
    fn select_all(&self);
}

pub struct NoopAnnouncer;
impl Announcer for NoopAnnouncer {
    fn announce(&self, _msg: &str) {
        // no-op
    }
}

/// Announces into the log, for hosts without an accessibility bridge.
pub struct LogAnnouncer;
impl Announcer for LogAnnouncer {
    fn announce(&self, msg: &str) {
        log::info!("A11y announce: {msg}");
    }
}

/// Keeps every announcement; useful for tests and devtools.
#[derive(Default)]
pub struct RecordingAnnouncer {
    messages: RefCell<Vec<String>>,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, msg: &str) {
        self.messages.borrow_mut().push(msg.to_string());
    }
}
