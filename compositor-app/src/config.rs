//! Application configuration.
//!
//! `AppConfig` is what the editor and the headless composer consume;
//! `CliArgs` (feature `cli`) parses it from the command line and environment.

use std::path::PathBuf;

use compositor_core::{AspectPreset, Color, ResizeMode, DEFAULT_CANVAS_SIZE};
use compositor_renderer::{PendingPolicy, EXPORT_FILE_NAME};

/// Editor and composition settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Canvas background.
    pub background: Color,
    /// Aspect preset applied to `width` after sizing, if any.
    pub aspect: Option<AspectPreset>,
    /// How image resize gestures accumulate.
    pub resize_mode: ResizeMode,
    /// What to draw for images still decoding.
    pub pending_policy: PendingPolicy,
    /// Font file to register before adding text.
    pub font_file: Option<PathBuf>,
    /// Font family for new text (defaults to the uploaded font, if any).
    pub font: Option<String>,
    /// Image files to add as layers, bottom first.
    pub images: Vec<PathBuf>,
    /// Text contents to add as layers, bottom first.
    pub texts: Vec<String>,
    /// Font size for added text.
    pub text_size: Option<f32>,
    /// Color for added text.
    pub text_color: Option<Color>,
    /// Lay added text out vertically.
    pub vertical: bool,
    /// Where to write the export.
    pub output: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Create a configuration with default values: an empty 300x300 white
    /// canvas exported to `image.png`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: DEFAULT_CANVAS_SIZE,
            height: DEFAULT_CANVAS_SIZE,
            background: Color::WHITE,
            aspect: None,
            resize_mode: ResizeMode::default(),
            pending_policy: PendingPolicy::default(),
            font_file: None,
            font: None,
            images: Vec::new(),
            texts: Vec::new(),
            text_size: None,
            text_color: None,
            vertical: false,
            output: PathBuf::from(EXPORT_FILE_NAME),
        }
    }
}

#[cfg(feature = "cli")]
pub use cli::CliArgs;

#[cfg(feature = "cli")]
mod cli {
    use std::path::PathBuf;

    use clap::Parser;
    use compositor_core::{AspectPreset, Color, ResizeMode};
    use compositor_renderer::PendingPolicy;

    use super::AppConfig;

    /// Command-line arguments for the `compositor` binary.
    #[derive(Debug, Clone, Parser)]
    #[command(name = "compositor")]
    #[command(about = "Compose text and image layers on a canvas and export a PNG")]
    #[command(version)]
    pub struct CliArgs {
        /// Canvas width in pixels
        #[arg(long, env = "COMPOSITOR_WIDTH", default_value = "300")]
        pub width: u32,

        /// Canvas height in pixels
        #[arg(long, env = "COMPOSITOR_HEIGHT", default_value = "300")]
        pub height: u32,

        /// Background color (#rgb, #rgba, #rrggbb or #rrggbbaa)
        #[arg(long, env = "COMPOSITOR_BACKGROUND", default_value = "#ffffff")]
        pub background: Color,

        /// Aspect ratio preset applied to the width (1:1, 16:9, 9:16)
        #[arg(long)]
        pub aspect: Option<AspectPreset>,

        /// Image resize accumulation (anchored or incremental)
        #[arg(long, env = "COMPOSITOR_RESIZE_MODE", default_value = "anchored")]
        pub resize_mode: ResizeMode,

        /// TrueType/OpenType font file; its family is named after the file
        #[arg(long)]
        pub font_file: Option<PathBuf>,

        /// Font family for text layers
        #[arg(long)]
        pub font: Option<String>,

        /// Image file to add as a layer (repeatable, bottom first)
        #[arg(long = "image")]
        pub images: Vec<PathBuf>,

        /// Text to add as a layer at the canvas center (repeatable)
        #[arg(long = "text")]
        pub texts: Vec<String>,

        /// Font size for text layers in pixels
        #[arg(long)]
        pub text_size: Option<f32>,

        /// Color for text layers
        #[arg(long)]
        pub text_color: Option<Color>,

        /// Lay text out vertically, one character per line
        #[arg(long)]
        pub vertical: bool,

        /// Output PNG path
        #[arg(long, short, env = "COMPOSITOR_OUTPUT", default_value = "image.png")]
        pub output: PathBuf,
    }

    impl From<CliArgs> for AppConfig {
        fn from(args: CliArgs) -> Self {
            Self {
                width: args.width,
                height: args.height,
                background: args.background,
                aspect: args.aspect,
                resize_mode: args.resize_mode,
                pending_policy: PendingPolicy::default(),
                font_file: args.font_file,
                font: args.font,
                images: args.images,
                texts: args.texts,
                text_size: args.text_size,
                text_color: args.text_color,
                vertical: args.vertical,
                output: args.output,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults_match_app_config() {
            let args = CliArgs::parse_from(["compositor"]);
            let config = AppConfig::from(args);
            assert_eq!(config, AppConfig::default());
        }

        #[test]
        fn test_flags_parse() {
            let args = CliArgs::parse_from([
                "compositor",
                "--width",
                "640",
                "--background",
                "#f00",
                "--aspect",
                "16:9",
                "--resize-mode",
                "incremental",
                "--image",
                "a.png",
                "--image",
                "b.jpg",
                "--text",
                "hi",
                "--vertical",
                "-o",
                "out.png",
            ]);
            let config = AppConfig::from(args);
            assert_eq!(config.width, 640);
            assert_eq!(config.background, Color::rgb(255, 0, 0));
            assert_eq!(config.aspect, Some(AspectPreset::Landscape));
            assert_eq!(config.resize_mode, ResizeMode::Incremental);
            assert_eq!(config.images.len(), 2);
            assert_eq!(config.texts, ["hi"]);
            assert!(config.vertical);
            assert_eq!(config.output, PathBuf::from("out.png"));
        }

        #[test]
        fn test_bad_color_is_rejected() {
            let result = CliArgs::try_parse_from(["compositor", "--background", "red"]);
            assert!(result.is_err());
        }
    }
}
