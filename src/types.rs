//! Value types for display configuration
//!
//! `Resolution`, `RelativePosition` and `ScreenSetup` are plain immutable
//! values; everything that interprets them (probing, ranking, command
//! synthesis) lives in the other modules.

use std::fmt;

/// A screen resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The plain "WxH" form used on the xrandr command line and in the
    /// preference store.
    pub fn mode_string(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Parse the "WxH" form back. Returns None for anything else.
    pub fn from_mode_string(s: &str) -> Option<Self> {
        let (w, h) = s.split_once('x')?;
        let width: u32 = w.parse().ok()?;
        let height: u32 = h.parse().ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    /// Width:height reduced to lowest terms, e.g. "16:9" for 1920x1080.
    fn aspect_ratio(&self) -> (u32, u32) {
        let d = gcd(self.width, self.height);
        (self.width / d, self.height / d)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.aspect_ratio();
        write!(f, "{}x{} ({}:{})", self.width, self.height, a, b)
    }
}

/// Where the external display sits relative to the internal one.
///
/// Display text, xrandr flag and store tag are pure lookup tables keyed by
/// the variant; nothing in the crate branches on these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePosition {
    Left,
    Right,
    Above,
    Below,
    Mirror,
}

impl RelativePosition {
    pub const ALL: [RelativePosition; 5] = [
        RelativePosition::Left,
        RelativePosition::Right,
        RelativePosition::Above,
        RelativePosition::Below,
        RelativePosition::Mirror,
    ];

    /// Human-readable phrase, completed by the dialogue to e.g.
    /// "left of internal screen".
    pub fn text(self) -> &'static str {
        match self {
            RelativePosition::Left => "left of",
            RelativePosition::Right => "right of",
            RelativePosition::Above => "above",
            RelativePosition::Below => "below",
            RelativePosition::Mirror => "same as",
        }
    }

    /// The xrandr flag expressing this relation.
    pub fn xrandr_flag(self) -> &'static str {
        match self {
            RelativePosition::Left => "--left-of",
            RelativePosition::Right => "--right-of",
            RelativePosition::Above => "--above",
            RelativePosition::Below => "--below",
            RelativePosition::Mirror => "--same-as",
        }
    }

    /// Stable tag used in the preference store.
    pub fn tag(self) -> &'static str {
        match self {
            RelativePosition::Left => "left",
            RelativePosition::Right => "right",
            RelativePosition::Above => "above",
            RelativePosition::Below => "below",
            RelativePosition::Mirror => "mirror",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tag() == tag)
    }
}

impl fmt::Display for RelativePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A complete display layout decision: which screens are on, at which
/// resolution, how they are positioned, and which is primary.
///
/// `None` resolutions mean the screen is off. The sole active screen is
/// always primary, which the constructor enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSetup {
    pub internal: Option<Resolution>,
    pub external: Option<Resolution>,
    pub position: Option<RelativePosition>,
    pub external_is_primary: bool,
}

impl ScreenSetup {
    pub fn new(
        internal: Option<Resolution>,
        external: Option<Resolution>,
        position: Option<RelativePosition>,
        external_is_primary: bool,
    ) -> Self {
        debug_assert!(
            position != Some(RelativePosition::Mirror) || internal == external,
            "mirrored screens must use the same resolution"
        );
        Self {
            internal,
            external,
            position,
            external_is_primary: external_is_primary || internal.is_none(),
        }
    }
}

impl fmt::Display for ScreenSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.internal, self.external) {
            (None, Some(ext)) => write!(f, "external display only, at {ext}"),
            (Some(int), None) => write!(f, "internal display only, at {int}"),
            (Some(int), Some(ext)) => {
                let (int_primary, ext_primary) = if self.external_is_primary {
                    ("", " (primary)")
                } else {
                    (" (primary)", "")
                };
                let position = self
                    .position
                    .map(RelativePosition::text)
                    .unwrap_or("next to");
                write!(
                    f,
                    "external display{ext_primary} at {ext} {position} internal display{int_primary} at {int}"
                )
            }
            (None, None) => f.write_str("all displays off"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_reduced_to_lowest_terms() {
        assert_eq!(Resolution::new(1024, 768).to_string(), "1024x768 (4:3)");
        assert_eq!(Resolution::new(1280, 1024).to_string(), "1280x1024 (5:4)");
        assert_eq!(Resolution::new(1920, 1080).to_string(), "1920x1080 (16:9)");
        assert_eq!(Resolution::new(1920, 1200).to_string(), "1920x1200 (16:10)");
        assert_eq!(Resolution::new(720, 480).to_string(), "720x480 (3:2)");
    }

    #[test]
    fn test_mode_string_round_trip() {
        let res = Resolution::new(1600, 900);
        assert_eq!(res.mode_string(), "1600x900");
        assert_eq!(Resolution::from_mode_string("1600x900"), Some(res));
    }

    #[test]
    fn test_from_mode_string_rejects_garbage() {
        assert_eq!(Resolution::from_mode_string(""), None);
        assert_eq!(Resolution::from_mode_string("1600"), None);
        assert_eq!(Resolution::from_mode_string("1600x"), None);
        assert_eq!(Resolution::from_mode_string("x900"), None);
        assert_eq!(Resolution::from_mode_string("0x900"), None);
        assert_eq!(Resolution::from_mode_string("1600x900x60"), None);
    }

    #[test]
    fn test_pixel_count_does_not_overflow_u32() {
        let res = Resolution::new(u32::MAX, 2);
        assert_eq!(res.pixel_count(), u32::MAX as u64 * 2);
    }

    #[test]
    fn test_position_tag_round_trip() {
        for position in RelativePosition::ALL {
            assert_eq!(RelativePosition::from_tag(position.tag()), Some(position));
        }
        assert_eq!(RelativePosition::from_tag("diagonal"), None);
    }

    #[test]
    fn test_position_tables_are_consistent() {
        assert_eq!(RelativePosition::Left.text(), "left of");
        assert_eq!(RelativePosition::Left.xrandr_flag(), "--left-of");
        assert_eq!(RelativePosition::Mirror.text(), "same as");
        assert_eq!(RelativePosition::Mirror.xrandr_flag(), "--same-as");
    }

    #[test]
    fn test_setup_sole_screen_is_primary() {
        let setup = ScreenSetup::new(None, Some(Resolution::new(1920, 1080)), None, false);
        assert!(setup.external_is_primary);
    }

    #[test]
    fn test_setup_keeps_explicit_primary_choice() {
        let setup = ScreenSetup::new(
            Some(Resolution::new(1920, 1080)),
            Some(Resolution::new(1920, 1080)),
            Some(RelativePosition::Right),
            false,
        );
        assert!(!setup.external_is_primary);
    }

    #[test]
    fn test_setup_display() {
        let int = Resolution::new(1366, 768);
        let ext = Resolution::new(1920, 1080);
        assert_eq!(
            ScreenSetup::new(Some(int), None, None, false).to_string(),
            "internal display only, at 1366x768 (683:384)"
        );
        assert_eq!(
            ScreenSetup::new(None, Some(ext), None, true).to_string(),
            "external display only, at 1920x1080 (16:9)"
        );
        let both = ScreenSetup::new(Some(int), Some(ext), Some(RelativePosition::Left), true);
        assert_eq!(
            both.to_string(),
            "external display (primary) at 1920x1080 (16:9) left of internal display at 1366x768 (683:384)"
        );
    }
}
