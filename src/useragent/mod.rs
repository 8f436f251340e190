//! Rotating user-agent tables.
//!
//! Each leaf category carries a static table of header strings, shuffled
//! once at construction and then served round-robin: a full cycle of N
//! distinct values is exhausted before any value repeats. Composite
//! categories splice their children's already-shuffled tables end to
//! end, preserving each child's internal order.

use std::fmt;
use std::sync::Mutex;

use crate::error::{Error, Result};

const DESKTOP_MACOS: &str = include_str!("data/desktop-macos.json");
const DESKTOP_WINDOWS: &str = include_str!("data/desktop-windows.json");
const MOBILE_ANDROID: &str = include_str!("data/mobile-android.json");
const MOBILE_IOS: &str = include_str!("data/mobile-ios.json");
const TABLET_ANDROID: &str = include_str!("data/tablet-android.json");
const TABLET_IOS: &str = include_str!("data/tablet-ios.json");

/// User-agent category. Root categories rotate over the union of their
/// children's tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UserAgent {
    #[default]
    Any,
    Desktop,
    DesktopWindows,
    DesktopMacos,
    Mobile,
    MobileAndroid,
    MobileIos,
    Tablet,
    TabletAndroid,
    TabletIos,
}

impl UserAgent {
    /// Every defined category.
    pub const ALL: &'static [UserAgent] = &[
        UserAgent::Any,
        UserAgent::Desktop,
        UserAgent::DesktopWindows,
        UserAgent::DesktopMacos,
        UserAgent::Mobile,
        UserAgent::MobileAndroid,
        UserAgent::MobileIos,
        UserAgent::Tablet,
        UserAgent::TabletAndroid,
        UserAgent::TabletIos,
    ];

    /// Hyphenated name, e.g. `desktop-windows`.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAgent::Any => "any",
            UserAgent::Desktop => "desktop",
            UserAgent::DesktopWindows => "desktop-windows",
            UserAgent::DesktopMacos => "desktop-macos",
            UserAgent::Mobile => "mobile",
            UserAgent::MobileAndroid => "mobile-android",
            UserAgent::MobileIos => "mobile-ios",
            UserAgent::Tablet => "tablet",
            UserAgent::TabletAndroid => "tablet-android",
            UserAgent::TabletIos => "tablet-ios",
        }
    }

    /// Identifier-style name, e.g. `DesktopWindows`.
    pub fn camel_str(&self) -> &'static str {
        match self {
            UserAgent::Any => "Any",
            UserAgent::Desktop => "Desktop",
            UserAgent::DesktopWindows => "DesktopWindows",
            UserAgent::DesktopMacos => "DesktopMacos",
            UserAgent::Mobile => "Mobile",
            UserAgent::MobileAndroid => "MobileAndroid",
            UserAgent::MobileIos => "MobileIOS",
            UserAgent::Tablet => "Tablet",
            UserAgent::TabletAndroid => "TabletAndroid",
            UserAgent::TabletIos => "TabletIOS",
        }
    }

    /// Parse either naming convention, identifier-style first. Unknown
    /// input maps to [`UserAgent::Any`]; parsing never fails.
    pub fn parse(s: &str) -> UserAgent {
        for ua in Self::ALL {
            if ua.camel_str() == s {
                return *ua;
            }
        }
        for ua in Self::ALL {
            if ua.as_str() == s {
                return *ua;
            }
        }
        UserAgent::Any
    }

    fn index(&self) -> usize {
        match self {
            UserAgent::Any => 0,
            UserAgent::Desktop => 1,
            UserAgent::DesktopWindows => 2,
            UserAgent::DesktopMacos => 3,
            UserAgent::Mobile => 4,
            UserAgent::MobileAndroid => 5,
            UserAgent::MobileIos => 6,
            UserAgent::Tablet => 7,
            UserAgent::TabletAndroid => 8,
            UserAgent::TabletIos => 9,
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable value arena plus a guarded read cursor.
#[derive(Debug)]
struct Ring {
    values: Vec<String>,
    cursor: Mutex<usize>,
}

impl Ring {
    fn next(&self) -> String {
        let mut cursor = self.cursor.lock().unwrap();
        let value = self.values[*cursor].clone();
        *cursor = (*cursor + 1) % self.values.len();
        value
    }
}

/// Rotator handle holding one ring per category.
///
/// Construct once and share (typically behind an `Arc`); there is no
/// process-wide instance.
#[derive(Debug)]
pub struct UserAgents {
    rings: Vec<Ring>,
}

impl UserAgents {
    /// Build rings for every category from the embedded tables.
    ///
    /// A malformed or empty table is fatal: no rotator exists unless
    /// every configured category loaded.
    pub fn new() -> Result<Self> {
        let rings = vec![
            ring_from_tables(&[
                ("desktop-macos.json", DESKTOP_MACOS),
                ("desktop-windows.json", DESKTOP_WINDOWS),
                ("mobile-android.json", MOBILE_ANDROID),
                ("mobile-ios.json", MOBILE_IOS),
            ])?,
            ring_from_tables(&[
                ("desktop-macos.json", DESKTOP_MACOS),
                ("desktop-windows.json", DESKTOP_WINDOWS),
            ])?,
            ring_from_tables(&[("desktop-windows.json", DESKTOP_WINDOWS)])?,
            ring_from_tables(&[("desktop-macos.json", DESKTOP_MACOS)])?,
            ring_from_tables(&[
                ("mobile-android.json", MOBILE_ANDROID),
                ("mobile-ios.json", MOBILE_IOS),
            ])?,
            ring_from_tables(&[("mobile-android.json", MOBILE_ANDROID)])?,
            ring_from_tables(&[("mobile-ios.json", MOBILE_IOS)])?,
            ring_from_tables(&[
                ("tablet-android.json", TABLET_ANDROID),
                ("tablet-ios.json", TABLET_IOS),
            ])?,
            ring_from_tables(&[("tablet-android.json", TABLET_ANDROID)])?,
            ring_from_tables(&[("tablet-ios.json", TABLET_IOS)])?,
        ];
        tracing::debug!(categories = rings.len(), "user agent rings initialized");
        Ok(Self { rings })
    }

    /// Current value for the category; advances the category's cursor.
    pub fn next(&self, category: UserAgent) -> String {
        self.rings[category.index()].next()
    }

    /// Number of distinct values in the category's rotation cycle.
    pub fn cycle_len(&self, category: UserAgent) -> usize {
        self.rings[category.index()].values.len()
    }
}

/// Parse each table, shuffle it independently, and splice the results.
/// Child tables keep their internal (shuffled) order; only the
/// boundaries between tables are fixed.
fn ring_from_tables(tables: &[(&str, &str)]) -> Result<Ring> {
    use rand::seq::SliceRandom;

    let mut values = Vec::new();
    for (name, data) in tables {
        let mut table: Vec<String> = serde_json::from_str(data)
            .map_err(|e| Error::user_agent_data(format!("{}: {}", name, e)))?;
        if table.is_empty() {
            return Err(Error::user_agent_data(format!("{}: empty table", name)));
        }
        table.shuffle(&mut rand::thread_rng());
        values.extend(table);
    }
    Ok(Ring {
        values,
        cursor: Mutex::new(0),
    })
}
