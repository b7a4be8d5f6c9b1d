//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::recipe::{FontChoice, Page, FONT_COLORS, FONT_FAMILIES};

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Email address
    pub email: String,

    /// Create a new local account with this display name
    #[arg(long, value_name = "NAME")]
    pub sign_up: Option<String>,

    /// User id issued by the remote account service (remote mode)
    #[arg(long, value_name = "UID")]
    pub uid: Option<String>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only recipes in this category
    #[arg(short = 'k', long)]
    pub category: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Recipe id
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Fields that `new` and `edit` can set.
#[derive(Debug, Default, Args)]
pub struct RecipeArgs {
    /// Recipe title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Category label
    #[arg(short = 'k', long)]
    pub category: Option<String>,

    /// Text of the left page
    #[arg(long, value_name = "TEXT")]
    pub left: Option<String>,

    /// Text of the right page
    #[arg(long, value_name = "TEXT")]
    pub right: Option<String>,

    /// Font size in pixels (12-24)
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Font family, by palette label or CSS value
    #[arg(long)]
    pub font_family: Option<String>,

    /// Font color, by palette label or #rrggbb
    #[arg(long)]
    pub font_color: Option<String>,

    /// Image file to place on the left page (repeatable)
    #[arg(long = "left-image", value_name = "FILE")]
    pub left_images: Vec<PathBuf>,

    /// Image file to place on the right page (repeatable)
    #[arg(long = "right-image", value_name = "FILE")]
    pub right_images: Vec<PathBuf>,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Recipe id
    pub id: String,

    /// Fields to change
    #[command(flatten)]
    pub fields: RecipeArgs,
}

/// Arguments naming one image of a recipe.
#[derive(Debug, Args)]
pub struct ImageTarget {
    /// Recipe id
    pub recipe: String,

    /// Page holding the image
    #[arg(value_enum)]
    pub page: PageArg,

    /// Image placement id
    pub image: String,
}

/// Image placement commands.
#[derive(Debug, Subcommand)]
pub enum ImageCommand {
    /// Move an image to a pixel position on its page
    Move {
        /// The image to move
        #[command(flatten)]
        target: ImageTarget,

        /// Left edge in pixels
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        /// Top edge in pixels
        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Page size in pixels, e.g. 400x600
        #[arg(long, value_parser = parse_container, default_value = "400x600")]
        container: (f64, f64),
    },

    /// Resize an image to a pixel rectangle on its page
    Resize {
        /// The image to resize
        #[command(flatten)]
        target: ImageTarget,

        /// Left edge in pixels
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        /// Top edge in pixels
        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Width in pixels
        #[arg(long)]
        width: f64,

        /// Height in pixels
        #[arg(long)]
        height: f64,

        /// Page size in pixels, e.g. 400x600
        #[arg(long, value_parser = parse_container, default_value = "400x600")]
        container: (f64, f64),
    },

    /// Remove an image from its page
    Remove {
        /// The image to remove
        #[command(flatten)]
        target: ImageTarget,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Page argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageArg {
    /// The left-hand page
    Left,
    /// The right-hand page
    Right,
}

impl From<PageArg> for Page {
    fn from(arg: PageArg) -> Self {
        match arg {
            PageArg::Left => Page::Left,
            PageArg::Right => Page::Right,
        }
    }
}

/// Output format for recipe listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one recipe per line
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Parse a `WIDTHxHEIGHT` page size.
///
/// # Errors
///
/// Returns a message if the text is not two positive numbers joined by `x`.
pub fn parse_container(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s}"))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("invalid width: {w}"))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("invalid height: {h}"))?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(format!("page size must be positive, got {s}"));
    }
    Ok((width, height))
}

/// Resolve a palette entry by label or value, ignoring case.
///
/// Unknown input is returned unchanged so custom values stay possible.
#[must_use]
pub fn resolve_choice(choices: &[FontChoice], input: &str) -> String {
    let input = input.trim();
    choices
        .iter()
        .find(|c| c.label.eq_ignore_ascii_case(input) || c.value.eq_ignore_ascii_case(input))
        .map_or_else(|| input.to_string(), |c| c.value.to_string())
}

/// Resolve a font family argument.
#[must_use]
pub fn resolve_font_family(input: &str) -> String {
    resolve_choice(FONT_FAMILIES, input)
}

/// Resolve a font color argument.
#[must_use]
pub fn resolve_font_color(input: &str) -> String {
    resolve_choice(FONT_COLORS, input)
}
