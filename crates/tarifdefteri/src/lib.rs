//! `tarifdefteri` - a personal recipe notebook
//!
//! Recipes are two-page spreads of free text and freely placed images,
//! filed under categories. They persist either to a remote document API and
//! blob store or, without remote credentials, to a local device store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod contents;
pub mod draft;
pub mod editor;
pub mod error;
pub mod logging;
pub mod notebook;
pub mod recipe;
pub mod session;
pub mod storage;

pub use config::Config;
pub use draft::Draft;
pub use editor::{EditTarget, Editor};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use notebook::Notebook;
pub use recipe::{ImagePlacement, Page, Recipe, RecipeId, RecipeInput, RecipePatch, TextStyle};
pub use session::{Session, SessionContext};
pub use storage::{open_store, BackendMode, DeviceStore, ImageUpload, RecipeStore};
