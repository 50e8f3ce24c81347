//! # Compositor App
//!
//! Editor facade over `compositor-core` and `compositor-renderer`, with a
//! headless CLI and (feature `wasm`) browser bindings.
//!
//! ## Usage
//!
//! ```bash
//! compositor --width 640 --aspect 16:9 --image photo.jpg \
//!     --font-file Lobster.ttf --text "Hello" -o card.png
//! ```
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web compositor-app -- --no-default-features --features wasm
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap (feature `cli`)
//! - `AppConfig` - Canvas, inputs and output for a session
//! - `Editor` - Editor state, renderer and decode queue; uploads, touch
//!   routing, preview frames and export
//! - `compose` - Builds a composition from an `AppConfig` headlessly

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod editor;
pub mod error;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::AppConfig;
#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use editor::{compose, Editor, FileUpload};
pub use error::{AppError, AppResult};
