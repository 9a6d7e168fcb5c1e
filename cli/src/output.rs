use std::io::Write;
use std::sync::Mutex;

use preload_core::{Action, Dispatcher, NavigationAction, Outcome};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Prints every dispatched action to stdout as one JSON object per line.
///
/// Navigation actions are also forwarded to `follow`, so the caller can run
/// them once the current navigation settles.
#[derive(Default)]
pub struct JsonLines {
    follow: Option<UnboundedSender<NavigationAction>>,
    lock: Mutex<()>,
}

impl JsonLines {
    pub fn following(follow: UnboundedSender<NavigationAction>) -> Self {
        Self {
            follow: Some(follow),
            lock: Mutex::new(()),
        }
    }

    pub fn print<T: Serialize>(&self, value: &T) {
        let line = match serde_json::to_string(value) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize output record");
                return;
            }
        };
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            warn!(error = %e, "failed to write output record");
        }
    }
}

impl Dispatcher for JsonLines {
    fn dispatch(&self, action: Action) {
        self.print(&action);
        if let (Action::Navigate(nav), Some(follow)) = (&action, &self.follow) {
            if follow.send(nav.clone()).is_err() {
                warn!(target = %nav.location, "navigation dropped, nobody is following");
            }
        }
    }
}

/// Settlement record printed after each navigation.
#[derive(Debug, Serialize)]
pub struct NavigationRecord<'a> {
    pub navigation: String,
    #[serde(flatten)]
    pub outcome: &'a Outcome,
}

/// Record for a navigation that settled with an error.
#[derive(Debug, Serialize)]
pub struct ErrorRecord {
    pub navigation: String,
    pub outcome: &'static str,
    pub error: String,
    pub code: u16,
}
