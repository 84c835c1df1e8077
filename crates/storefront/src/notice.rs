//! Transient user-facing banners.
//!
//! Every fallible operation converts its error into a [`Notice`] at its own
//! boundary; nothing propagates uncaught into the rendering layer. The UI
//! host displays a notice and dismisses it after [`Notice::DISMISS_AFTER`].

use std::time::Duration;

/// Visual kind of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Green "it worked" banner.
    Success,
    /// Red "something went wrong" banner.
    Error,
}

/// A transient banner message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Visual kind.
    pub kind: NoticeKind,
    /// Text shown to the shopper.
    pub text: String,
}

impl Notice {
    /// How long the UI shows a notice before auto-dismissing it.
    pub const DISMISS_AFTER: Duration = Duration::from_secs(3);

    /// A success banner.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// An error banner.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}
