//! Anti-exfiltration guard state machine.
//!
//! Runs single-threaded off the embedder's UI event loop: the embedder
//! forwards window and keyboard events, applies the returned effects
//! (suppress the default action or not), and styles the content from
//! the queried state: blurred/greyscale with a "Security Alert"
//! overlay while obscured, normal otherwise.

use std::time::{Duration, Instant};

/// How long an intercepted chord keeps the content obscured.
const WARNING_DURATION: Duration = Duration::from_secs(2);

/// A keyboard event as seen by the embedder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyChord {
    /// Key value, e.g. "p", "s", "c", "PrintScreen".
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyChord {
    /// Copy/save/print chords and the screenshot key.
    fn is_intercepted(&self) -> bool {
        if self.key == "PrintScreen" {
            return true;
        }
        (self.ctrl || self.meta) && matches!(self.key.as_str(), "p" | "s" | "c")
    }
}

/// UI events the guard consumes.
#[derive(Clone, Debug)]
pub enum GuardEvent {
    WindowBlurred,
    WindowFocused,
    KeyDown(KeyChord),
    ContextMenu,
    DragStart,
}

/// What the embedder must do with the event it just forwarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardEffect {
    /// Let the event through untouched.
    Allow,
    /// `preventDefault()`: the browser action must not happen.
    SuppressDefault,
}

/// Guard state, advanced by events and queried per frame.
#[derive(Debug)]
pub struct ExfiltrationGuard {
    window_focused: bool,
    warning_until: Option<Instant>,
}

impl ExfiltrationGuard {
    /// A fresh guard assumes the window is focused.
    pub fn new() -> Self {
        Self {
            window_focused: true,
            warning_until: None,
        }
    }

    /// Feeds one event through the guard.
    pub fn handle(&mut self, event: GuardEvent, now: Instant) -> GuardEffect {
        match event {
            GuardEvent::WindowBlurred => {
                self.window_focused = false;
                GuardEffect::Allow
            }
            GuardEvent::WindowFocused => {
                self.window_focused = true;
                GuardEffect::Allow
            }
            GuardEvent::KeyDown(chord) => {
                if chord.is_intercepted() {
                    self.warning_until = Some(now + WARNING_DURATION);
                    GuardEffect::SuppressDefault
                } else {
                    GuardEffect::Allow
                }
            }
            // Right-click menus and image dragging are download
            // affordances; never allowed while a viewer is open
            GuardEvent::ContextMenu | GuardEvent::DragStart => GuardEffect::SuppressDefault,
        }
    }

    /// Whether the content must currently be obscured
    /// (blur/greyscale filter + alert overlay).
    pub fn is_obscured(&self, now: Instant) -> bool {
        !self.window_focused || self.warning_visible(now)
    }

    /// Whether the transient interception warning is still showing.
    pub fn warning_visible(&self, now: Instant) -> bool {
        self.warning_until.is_some_and(|until| now < until)
    }

    /// Whether the persistent "Security Alert" overlay applies
    /// (focus loss, as opposed to a transient chord warning).
    pub fn alert_visible(&self) -> bool {
        !self.window_focused
    }
}

impl Default for ExfiltrationGuard {
    fn default() -> Self {
        Self::new()
    }
}
