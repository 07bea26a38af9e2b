//! Presentation theme
//!
//! Purely presentational: the host uses the palette to light and clear the
//! viewport. Controllers never read it.

/// Host color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Lighting and background hints for a theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    /// Linear RGB clear color
    pub background: [f32; 3],
    /// Ambient light intensity
    pub ambient: f32,
    /// Key (directional) light intensity
    pub key_light: f32,
    /// Rim light intensity, separates the silhouette from the background
    pub rim_light: f32,
}

impl Theme {
    pub fn palette(self) -> ThemePalette {
        match self {
            Theme::Light => ThemePalette {
                background: [0.96, 0.97, 0.98],
                ambient: 0.8,
                key_light: 1.0,
                rim_light: 0.2,
            },
            Theme::Dark => ThemePalette {
                background: [0.06, 0.07, 0.09],
                ambient: 0.45,
                key_light: 1.2,
                rim_light: 0.6,
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_is_darker() {
        let light = Theme::Light.palette();
        let dark = Theme::Dark.palette();
        let luma = |c: [f32; 3]| c.iter().sum::<f32>();

        assert!(luma(dark.background) < luma(light.background));
        assert!(dark.rim_light > light.rim_light);
    }

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name("DARK"), Some(Theme::Dark));
        assert_eq!(Theme::from_name("light"), Some(Theme::Light));
        assert_eq!(Theme::from_name("sepia"), None);
    }
}
