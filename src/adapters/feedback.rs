//! Log-based feedback adapter.
//!
//! Implements [`FeedbackPort`] by writing a line to the logger.  A head
//! unit build would implement the same trait over its audio service.

use log::info;

use crate::app::ports::FeedbackPort;

/// Adapter that logs every acknowledgement instead of playing a sound.
#[derive(Debug, Default)]
pub struct LogFeedback {
    played: u32,
}

impl LogFeedback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeedbackPort for LogFeedback {
    fn play_feedback(&mut self) {
        self.played = self.played.wrapping_add(1);
        info!("FEEDBACK | click #{}", self.played);
    }
}
