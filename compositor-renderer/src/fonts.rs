//! Font registry and text metrics.
//!
//! Fonts are registered under a family name, either from uploaded bytes or
//! (with the `system-fonts` feature) from fonts installed on the host. Sizes
//! follow CSS semantics: a 30px font has a 30px em square.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use compositor_core::{TextMeasure, PRESET_FONTS};

use crate::error::{RenderError, RenderResult};

/// Advance assumed per character, in ems, when no font can be resolved.
pub const FALLBACK_ADVANCE_EM: f32 = 0.6;

/// Result of looking up a family.
#[derive(Debug, Clone, Copy)]
pub enum FontMatch<'a> {
    /// The family itself is registered.
    Exact(&'a FontArc),
    /// The family is unknown; the registry's fallback font stands in.
    Fallback(&'a FontArc),
    /// Neither the family nor a fallback is available.
    Missing,
}

impl<'a> FontMatch<'a> {
    /// The font to draw with, if any.
    #[must_use]
    pub fn font(self) -> Option<&'a FontArc> {
        match self {
            Self::Exact(font) | Self::Fallback(font) => Some(font),
            Self::Missing => None,
        }
    }
}

/// Fonts available to the renderer, by family name.
#[derive(Default)]
pub struct FontRegistry {
    fonts: HashMap<String, FontArc>,
    uploaded: Vec<String>,
    fallback: Option<String>,
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRegistry")
            .field("families", &self.fonts.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Derive a family name from an uploaded file name: the text before the
/// first `.`.
///
/// # Errors
///
/// Returns [`RenderError::Font`] if that text is empty.
pub fn family_from_filename(file_name: &str) -> RenderResult<String> {
    let family = file_name.split('.').next().unwrap_or_default().trim();
    if family.is_empty() {
        return Err(RenderError::Font(format!(
            "cannot derive a font family from '{file_name}'"
        )));
    }
    Ok(family.to_string())
}

/// Glyph scale for a CSS pixel font size.
#[must_use]
pub fn em_scale(font: &FontArc, font_size: f32) -> PxScale {
    let height = font
        .units_per_em()
        .map_or(font_size, |upem| font_size * font.height_unscaled() / upem);
    PxScale::from(height)
}

/// Advance width of `text` in pixels, including kerning.
#[must_use]
pub fn advance_width(font: &FontArc, text: &str, font_size: f32) -> f32 {
    let scaled = font.as_scaled(em_scale(font, font_size));
    let mut width = 0.0;
    let mut last: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = last {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        last = Some(id);
    }
    width
}

impl FontRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register TrueType/OpenType bytes under `family`, replacing any font
    /// already registered under that name.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if the bytes are not a usable font.
    pub fn register(&mut self, family: impl Into<String>, bytes: Vec<u8>) -> RenderResult<()> {
        let family = family.into();
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| RenderError::Font(format!("'{family}': {e}")))?;

        if !PRESET_FONTS.contains(&family.as_str()) && !self.uploaded.contains(&family) {
            self.uploaded.push(family.clone());
        }
        tracing::info!("Registered font family '{family}'");
        self.fonts.insert(family, font);
        Ok(())
    }

    /// Register an uploaded font file, deriving the family from its name.
    ///
    /// # Errors
    ///
    /// Returns an error if no family can be derived or the bytes are not a
    /// usable font.
    pub fn register_file(&mut self, file_name: &str, bytes: Vec<u8>) -> RenderResult<String> {
        let family = family_from_filename(file_name)?;
        self.register(family.clone(), bytes)?;
        Ok(family)
    }

    /// Use a registered family for text whose own family is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if `family` is not registered.
    pub fn set_fallback(&mut self, family: &str) -> RenderResult<()> {
        if !self.fonts.contains_key(family) {
            return Err(RenderError::Font(format!(
                "fallback family '{family}' is not registered"
            )));
        }
        self.fallback = Some(family.to_string());
        Ok(())
    }

    /// Current fallback family.
    #[must_use]
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Look up a family.
    #[must_use]
    pub fn resolve(&self, family: &str) -> FontMatch<'_> {
        if let Some(font) = self.fonts.get(family) {
            return FontMatch::Exact(font);
        }
        self.fallback
            .as_ref()
            .and_then(|name| self.fonts.get(name))
            .map_or(FontMatch::Missing, FontMatch::Fallback)
    }

    /// Whether `family` is registered.
    #[must_use]
    pub fn contains(&self, family: &str) -> bool {
        self.fonts.contains_key(family)
    }

    /// Families to offer: the presets followed by uploaded families.
    #[must_use]
    pub fn families(&self) -> Vec<String> {
        PRESET_FONTS
            .iter()
            .map(ToString::to_string)
            .chain(self.uploaded.iter().cloned())
            .collect()
    }

    /// Load `family` from the fonts installed on the host.
    ///
    /// Returns `false` if the host has no such family.
    ///
    /// # Errors
    ///
    /// Returns an error if the family exists but cannot be loaded.
    #[cfg(feature = "system-fonts")]
    pub fn load_system_family(&mut self, family: &str) -> RenderResult<bool> {
        use font_kit::source::SystemSource;

        let Ok(handle) = SystemSource::new().select_family_by_name(family) else {
            tracing::debug!("System font family '{family}' not installed");
            return Ok(false);
        };
        let Some(first) = handle.fonts().first() else {
            return Ok(false);
        };
        let font = first
            .load()
            .map_err(|e| RenderError::Font(format!("'{family}': {e}")))?;
        let bytes = font
            .copy_font_data()
            .ok_or_else(|| RenderError::Font(format!("'{family}': no font data")))?;

        self.register(family, bytes.as_ref().clone())?;
        Ok(true)
    }

    /// Load every preset family installed on the host and return how many
    /// were found. The first one found becomes the fallback if none is set.
    #[cfg(feature = "system-fonts")]
    pub fn load_system_presets(&mut self) -> usize {
        let mut loaded = 0;
        for family in PRESET_FONTS {
            match self.load_system_family(family) {
                Ok(true) => {
                    loaded += 1;
                    if self.fallback.is_none() {
                        self.fallback = Some(family.to_string());
                    }
                }
                Ok(false) => {}
                Err(e) => tracing::warn!("Skipping system font: {e}"),
            }
        }
        loaded
    }
}

impl TextMeasure for FontRegistry {
    fn text_width(&self, text: &str, font: &str, font_size: f32) -> f32 {
        match self.resolve(font).font() {
            Some(f) => advance_width(f, text, font_size),
            None => {
                #[allow(clippy::cast_precision_loss)]
                let chars = text.chars().count() as f32;
                chars * font_size * FALLBACK_ADVANCE_EM
            }
        }
    }
}
