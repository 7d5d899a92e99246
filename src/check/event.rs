//! Events delivered to the caller while a check runs

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use crate::check::error::CheckError;

#[derive(Debug)]
pub enum CheckEvent {
    /// An update dialog was handed to the presenter
    ShowUpdateDialog,
    /// The user chose to update
    LaunchStore { url: String },
    /// The user chose to skip this version
    SkipVersion { version: String },
    /// The user dismissed the dialog
    Dismiss,
    /// An update was found but configured not to show a dialog
    SilentUpdateDetected { message: String },
    Error(CheckError),
}

/// Sending half of the event channel
#[derive(Debug, Clone)]
pub struct Listener {
    sender: UnboundedSender<CheckEvent>,
}

impl Listener {
    pub fn channel() -> (Self, UnboundedReceiver<CheckEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Deliver `event`; a closed receiver drops it
    pub fn emit(&self, event: CheckEvent) {
        if let Err(e) = self.sender.send(event) {
            debug!("No listener for {:?}", e.0);
        }
    }
}
