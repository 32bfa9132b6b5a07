//! Icon glyph lookup.
//!
//! Glyphs are path data drawn in a 24x24 box. The renderer asks an
//! [`IconProvider`] for the element's glyph and falls back to
//! [`FALLBACK_ICON`] when the name is unknown.

use crate::error::IconError;
use iconclay_core::IconLibrary;
use std::collections::HashMap;

/// Edge of the box glyph paths are drawn in.
pub const ICON_VIEWBOX: f64 = 24.0;

/// Lucide glyph drawn for unknown icon names.
pub const FALLBACK_ICON: &str = "HelpCircle";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconGlyph {
    /// SVG path data, one entry per subpath group.
    pub paths: Vec<String>,
}

impl IconGlyph {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { paths: paths.into_iter().map(Into::into).collect() }
    }
}

/// Source of icon glyphs by library and name.
pub trait IconProvider {
    fn resolve(&self, library: IconLibrary, name: &str) -> Result<IconGlyph, IconError>;
}

impl<P: IconProvider + ?Sized> IconProvider for &P {
    fn resolve(&self, library: IconLibrary, name: &str) -> Result<IconGlyph, IconError> {
        (**self).resolve(library, name)
    }
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "HelpCircle",
        &[
            "M22 12a10 10 0 1 1-20 0a10 10 0 1 1 20 0z",
            "M9.09 9a3 3 0 0 1 5.83 1c0 2-3 3-3 3",
            "M12 17h.01",
        ],
    ),
    ("Star", &["M12 2l3.09 6.26L22 9.27l-5 4.87 1.18 6.88L12 17.77l-6.18 3.25L7 14.14 2 9.27l6.91-1.01L12 2z"]),
    (
        "Heart",
        &["M20.84 4.61a5.5 5.5 0 0 0-7.78 0L12 5.67l-1.06-1.06a5.5 5.5 0 0 0-7.78 7.78l1.06 1.06L12 21.23l7.78-7.78 1.06-1.06a5.5 5.5 0 0 0 0-7.78z"],
    ),
    ("Check", &["M20 6 9 17l-5-5"]),
    ("Zap", &["M13 2 3 14h9l-1 8 10-12h-9l1-8z"]),
    ("Cloud", &["M18 10h-1.26A8 8 0 1 0 9 20h9a5 5 0 0 0 0-10z"]),
    ("Home", &["M3 9l9-7 9 7v11a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2z", "M9 22V12h6v10"]),
    ("Bell", &["M18 8A6 6 0 0 0 6 8c0 7-3 9-3 9h18s-3-2-3-9", "M13.73 21a2 2 0 0 1-3.46 0"]),
    ("Plus", &["M12 5v14", "M5 12h14"]),
    ("Play", &["M5 3l14 9-14 9V3z"]),
];

/// Small built-in glyph table shared by every library.
///
/// Heroicons names carry an `Icon` suffix (`HeartIcon`), which is stripped
/// before lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIcons;

impl BuiltinIcons {
    pub fn names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(name, _)| *name)
    }
}

impl IconProvider for BuiltinIcons {
    fn resolve(&self, library: IconLibrary, name: &str) -> Result<IconGlyph, IconError> {
        let key = match library {
            IconLibrary::Lucide => name,
            IconLibrary::HeroiconsOutline | IconLibrary::HeroiconsSolid => name.strip_suffix("Icon").unwrap_or(name),
        };
        BUILTIN
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, paths)| IconGlyph::new(paths.iter().copied()))
            .ok_or_else(|| IconError::NotFound { library, name: name.to_string() })
    }
}

/// Glyphs registered at runtime, consulted before an optional base provider.
#[derive(Debug, Clone, Default)]
pub struct IconSet<P = BuiltinIcons> {
    glyphs: HashMap<(IconLibrary, String), IconGlyph>,
    base: Option<P>,
}

impl IconSet<BuiltinIcons> {
    /// An empty set backed by the built-in table.
    pub fn with_builtin() -> Self {
        Self { glyphs: HashMap::new(), base: Some(BuiltinIcons) }
    }
}

impl<P: IconProvider> IconSet<P> {
    pub fn new() -> Self {
        Self { glyphs: HashMap::new(), base: None }
    }

    pub fn insert(&mut self, library: IconLibrary, name: impl Into<String>, glyph: IconGlyph) {
        self.glyphs.insert((library, name.into()), glyph);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl<P: IconProvider> IconProvider for IconSet<P> {
    fn resolve(&self, library: IconLibrary, name: &str) -> Result<IconGlyph, IconError> {
        if let Some(glyph) = self.glyphs.get(&(library, name.to_string())) {
            return Ok(glyph.clone());
        }
        match &self.base {
            Some(base) => base.resolve(library, name),
            None => Err(IconError::NotFound { library, name: name.to_string() }),
        }
    }
}
