//! Page-effect helpers, kept as pure state so the presentation layer only
//! has to mirror them: toasts, scroll-linked navbar styling, one-shot reveal
//! animations, the landing-page dot carousel, modal toggling, the message
//! character counter, and phone-number display formatting.

use std::time::Duration;

/// Navbar style switches once the page is scrolled past this offset.
const NAVBAR_SCROLL_THRESHOLD: f64 = 100.0;

pub const NEWSLETTER_THANKS: &str = "感謝您的訂閱！我們會將最新資訊寄送至您的信箱。";

// ---------------------------------------------------------------------------
// Toasts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn color(self) -> &'static str {
        match self {
            ToastKind::Success => "#10B981",
            ToastKind::Error => "#EF4444",
            ToastKind::Warning => "#F59E0B",
            ToastKind::Info => "#3B82F6",
        }
    }
}

/// A transient message with a fixed auto-dismiss duration (3 s on the auth
/// page, 4 s on the contact page) and a slide animation on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub duration: Duration,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: Duration::from_secs(3),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    #[must_use]
    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

// ---------------------------------------------------------------------------
// Scroll effects
// ---------------------------------------------------------------------------

/// Resolve a smooth-scroll anchor. Only same-page fragments qualify.
pub fn anchor_target(href: &str) -> Option<&str> {
    let target = href.strip_prefix('#')?;
    if target.is_empty() { None } else { Some(target) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavbarStyle {
    pub background: &'static str,
    pub box_shadow: Option<&'static str>,
}

/// Navbar presentation keyed to the vertical scroll offset.
pub fn navbar_style(scroll_y: f64) -> NavbarStyle {
    if scroll_y > NAVBAR_SCROLL_THRESHOLD {
        NavbarStyle {
            background: "rgba(255, 255, 255, 0.98)",
            box_shadow: Some("0 2px 20px rgba(45, 139, 186, 0.1)"),
        }
    } else {
        NavbarStyle {
            background: "rgba(255, 255, 255, 0.95)",
            box_shadow: None,
        }
    }
}

/// Scroll-triggered reveal animation state. Each element reveals exactly once:
/// after its first intersection it is no longer observed.
#[derive(Debug, Default)]
pub struct RevealTracker {
    observed: std::collections::HashSet<String>,
}

impl RevealTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, element: impl Into<String>) {
        self.observed.insert(element.into());
    }

    /// Report an intersection. Returns true when the element becomes visible
    /// for the first time; subsequent intersections are ignored.
    pub fn intersect(&mut self, element: &str) -> bool {
        self.observed.remove(element)
    }

    pub fn is_observing(&self, element: &str) -> bool {
        self.observed.contains(element)
    }
}

// ---------------------------------------------------------------------------
// Carousel, modal
// ---------------------------------------------------------------------------

/// The landing-page dot carousel: exactly one active dot at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotCarousel {
    count: usize,
    active: usize,
}

impl DotCarousel {
    pub fn new(count: usize) -> Self {
        Self { count, active: 0 }
    }

    /// Activate a dot. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.count {
            self.active = index;
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Terms/privacy modal: visible or hidden, closed by its buttons or by a
/// click on the backdrop (but not on the dialog itself).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modal {
    open: bool,
}

impl Modal {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn click(&mut self, on_backdrop: bool) {
        if on_backdrop {
            self.open = false;
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

// ---------------------------------------------------------------------------
// Character counter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    Normal,
    Warning,
    Error,
}

/// Message-length counter. Warning above 80% of the limit, error at or past
/// it. Display-only: the counter never truncates the value.
#[derive(Debug, Clone, Copy)]
pub struct CharCounter {
    max: usize,
}

impl CharCounter {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn state(&self, length: usize) -> CounterState {
        if length >= self.max {
            CounterState::Error
        } else if length * 5 > self.max * 4 {
            CounterState::Warning
        } else {
            CounterState::Normal
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

// ---------------------------------------------------------------------------
// Phone formatting
// ---------------------------------------------------------------------------

/// Format a Taiwanese phone number for display as it is typed: mobile numbers
/// as 09XX-XXX-XXX, landlines as 0X-XXXX-XXXX. Non-digits are stripped first.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.starts_with("09") {
        match digits.len() {
            0..=4 => digits,
            5..=7 => format!("{}-{}", &digits[..4], &digits[4..]),
            _ => format!("{}-{}-{}", &digits[..4], &digits[4..7], &digits[7..]),
        }
    } else if digits.starts_with('0') && digits.len() > 1 {
        match digits.len() {
            0..=2 => digits,
            3..=6 => format!("{}-{}", &digits[..2], &digits[2..]),
            _ => format!("{}-{}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        }
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_kinds_map_to_colors() {
        assert_eq!(ToastKind::Success.color(), "#10B981");
        assert_eq!(ToastKind::Error.color(), "#EF4444");
        assert_eq!(ToastKind::Warning.color(), "#F59E0B");
        assert_eq!(ToastKind::Info.color(), "#3B82F6");
    }

    #[test]
    fn toast_duration_defaults_to_three_seconds() {
        let toast = Toast::success("ok");
        assert_eq!(toast.duration, Duration::from_secs(3));
        let longer = toast.lasting(Duration::from_secs(4));
        assert_eq!(longer.duration, Duration::from_secs(4));
    }

    #[test]
    fn anchor_targets_resolve_fragments_only() {
        assert_eq!(anchor_target("#about"), Some("about"));
        assert_eq!(anchor_target("#"), None);
        assert_eq!(anchor_target("https://example.com"), None);
    }

    #[test]
    fn navbar_style_switches_at_threshold() {
        assert_eq!(navbar_style(0.0).box_shadow, None);
        assert_eq!(navbar_style(100.0).box_shadow, None);
        let scrolled = navbar_style(101.0);
        assert_eq!(scrolled.background, "rgba(255, 255, 255, 0.98)");
        assert!(scrolled.box_shadow.is_some());
    }

    #[test]
    fn reveal_triggers_exactly_once() {
        let mut tracker = RevealTracker::new();
        tracker.observe("hero");
        assert!(tracker.intersect("hero"));
        assert!(!tracker.is_observing("hero"));
        assert!(!tracker.intersect("hero"));
        assert!(!tracker.intersect("never-observed"));
    }

    #[test]
    fn carousel_keeps_single_active_dot() {
        let mut dots = DotCarousel::new(3);
        assert_eq!(dots.active(), 0);
        assert!(dots.select(2));
        assert_eq!(dots.active(), 2);
        assert!(!dots.select(3));
        assert_eq!(dots.active(), 2);
    }

    #[test]
    fn modal_closes_on_backdrop_click_only() {
        let mut modal = Modal::default();
        modal.open();
        modal.click(false);
        assert!(modal.is_open());
        modal.click(true);
        assert!(!modal.is_open());
    }

    #[test]
    fn counter_thresholds() {
        let counter = CharCounter::new(1000);
        assert_eq!(counter.state(0), CounterState::Normal);
        assert_eq!(counter.state(800), CounterState::Normal);
        assert_eq!(counter.state(801), CounterState::Warning);
        assert_eq!(counter.state(999), CounterState::Warning);
        assert_eq!(counter.state(1000), CounterState::Error);
        assert_eq!(counter.state(1200), CounterState::Error);
    }

    #[test]
    fn formats_mobile_numbers() {
        assert_eq!(format_phone_number("0912"), "0912");
        assert_eq!(format_phone_number("0912345"), "0912-345");
        assert_eq!(format_phone_number("0912345678"), "0912-345-678");
        assert_eq!(format_phone_number("0912-345-678"), "0912-345-678");
    }

    #[test]
    fn formats_landline_numbers() {
        assert_eq!(format_phone_number("02"), "02");
        assert_eq!(format_phone_number("022345"), "02-2345");
        assert_eq!(format_phone_number("0223456789"), "02-2345-6789");
    }

    #[test]
    fn leaves_other_prefixes_unformatted() {
        assert_eq!(format_phone_number("12345678"), "12345678");
    }
}
