use inkcanvas_core::CanvasConfig;

const DOCUMENTATION: &str = r#"# Inkcanvas settings. You may edit this file, but be aware that formatting and comments will not
# be preserved. Any missing value takes its default.

# [viewport] is the screen size, in pixels, used when reporting visible strokes.
# [canvas] tunes the canvas:
#   rebuild_threshold - edits (draws plus erases) batched before the spatial index is rebuilt.
#   min_scale, max_scale - zoom limits.
#   initial_extent - half-size of the area reported for an empty canvas.
#   hit_radius - vector eraser radius, in canvas units.

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}
impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub viewport: Viewport,
    pub canvas: CanvasConfig,
}
impl Settings {
    const FILENAME: &'static str = "inkcanvas.toml";
    /// Settings from user preferences, or defaulted if unavailable for some reason.
    #[must_use]
    pub fn load() -> Self {
        let Some(mut path) = preferences_dir() else {
            log::warn!("No preferences dir, using default settings.");
            return Self::default();
        };
        path.push(Self::FILENAME);
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Settings at {path:?} weren't available, defaulting: {e:#}");
                Self::default()
            }
        }
    }
    fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        let string = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&string)?)
    }
    pub fn save(&self) -> anyhow::Result<std::path::PathBuf> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(&preferences, string)?;
        Ok(preferences)
    }
}
