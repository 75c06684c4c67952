//! Desktop notification service: chime, persistent notification, badge.
//!
//! Fires only while the window is hidden; everything platform-facing is
//! best-effort and failures are logged and swallowed.

use thiserror::Error;

/// Severity class attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationClass {
    Info,
    Success,
    Alert,
}

/// Visibility of the hosting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Platform hook failure.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("platform hook unavailable: {0}")]
    Unavailable(String),
}

/// Platform hooks behind the notifier. All methods are best-effort; a
/// missing or rejecting platform returns an error the notifier swallows.
pub trait NotifySink {
    /// Audio output sample rate in Hz.
    fn sample_rate(&self) -> u32 {
        44_100
    }

    /// Play the chime buffer once.
    fn play_chime(&mut self, samples: &[f32]) -> Result<(), NotifyError>;

    /// Raise a desktop notification. `sticky` keeps it until the user
    /// dismisses it by clicking, which also refocuses the window.
    fn desktop_notify(
        &mut self,
        title: &str,
        body: &str,
        class: NotificationClass,
        sticky: bool,
    ) -> Result<(), NotifyError>;

    /// Set the application badge counter.
    fn set_badge(&mut self, count: u32) -> Result<(), NotifyError>;

    /// Clear the application badge.
    fn clear_badge(&mut self) -> Result<(), NotifyError>;
}

/// Sink for hosts with no notification platform. Every hook succeeds
/// silently.
#[derive(Debug, Default)]
pub struct NullSink;

impl NotifySink for NullSink {
    fn play_chime(&mut self, _samples: &[f32]) -> Result<(), NotifyError> {
        Ok(())
    }

    fn desktop_notify(
        &mut self,
        _title: &str,
        _body: &str,
        _class: NotificationClass,
        _sticky: bool,
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    fn set_badge(&mut self, _count: u32) -> Result<(), NotifyError> {
        Ok(())
    }

    fn clear_badge(&mut self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Notification title shown on every alert.
const TITLE: &str = "PhysioFlow 메모 알림";

/// Chime length in seconds.
const CHIME_SECS: f32 = 0.3;

/// Alerts staff to queue changes while the window is not focused.
pub struct Notifier {
    sink: Box<dyn NotifySink + Send>,
    chime: Vec<f32>,
    visibility: Visibility,
    badge: u32,
}

impl Notifier {
    /// Build a notifier over the given platform sink. The chime buffer is
    /// synthesized once here.
    pub fn new(sink: Box<dyn NotifySink + Send>) -> Self {
        let chime = chime_buffer(sink.sample_rate());
        Self {
            sink,
            chime,
            visibility: Visibility::Visible,
            badge: 0,
        }
    }

    /// Notifier with no platform attached.
    pub fn disabled() -> Self {
        Self::new(Box::new(NullSink))
    }

    /// Track a visibility change. Returning to visible clears the badge.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        if visibility == Visibility::Visible {
            self.badge = 0;
            if let Err(e) = self.sink.clear_badge() {
                log::warn!("clear badge failed: {e}");
            }
        }
    }

    /// Current badge count.
    pub fn badge_count(&self) -> u32 {
        self.badge
    }

    /// Fire a notification if the window is hidden at this moment: one
    /// chime, one sticky desktop notification, badge increment. No-op
    /// while visible.
    pub fn notify(&mut self, message: &str, class: NotificationClass) {
        if self.visibility == Visibility::Visible {
            return;
        }

        if let Err(e) = self.sink.play_chime(&self.chime) {
            log::warn!("chime playback failed: {e}");
        }

        if let Err(e) = self.sink.desktop_notify(TITLE, message, class, true) {
            log::warn!("desktop notification failed: {e}");
        }

        self.badge += 1;
        if let Err(e) = self.sink.set_badge(self.badge) {
            log::warn!("badge update failed: {e}");
        }
    }
}

/// Synthesize the chime: a decaying 880 Hz sine, `CHIME_SECS` long.
fn chime_buffer(sample_rate: u32) -> Vec<f32> {
    let len = (sample_rate as f32 * CHIME_SECS) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * 880.0 * t).sin() * (-3.0 * i as f32 / len as f32).exp()
        })
        .collect()
}
