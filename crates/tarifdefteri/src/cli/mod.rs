//! Command-line interface for tarifdefteri.
//!
//! This module provides the CLI structure for the `tarif` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    parse_container, resolve_font_color, resolve_font_family, ConfigCommand, EditCommand,
    ImageCommand, ImageTarget, ListCommand, LoginCommand, OutputFormat, PageArg, RecipeArgs,
    ShowCommand, StatusCommand,
};

use crate::logging::Verbosity;

/// tarif - your recipe notebook
///
/// Write recipes as two-page spreads with text and images, file them by
/// category, and keep them on this device or in the cloud.
#[derive(Debug, Parser)]
#[command(name = "tarif")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in (local accounts are created on first use)
    Login(LoginCommand),

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show backend mode, session and notebook size
    Status(StatusCommand),

    /// List recipes, newest first
    List(ListCommand),

    /// List categories
    Categories,

    /// Show the table of contents
    Contents,

    /// Show one recipe
    Show(ShowCommand),

    /// Create a recipe
    New(RecipeArgs),

    /// Change a recipe
    Edit(EditCommand),

    /// Delete a recipe
    Delete {
        /// Recipe id
        id: String,
    },

    /// Move, resize or remove a placed image
    #[command(subcommand)]
    Image(ImageCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "tarif");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["tarif", "-q", "list"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["tarif", "list"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["tarif", "-v", "list"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["tarif", "-vv", "list"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_login() {
        let cli = parse(&["tarif", "login", "ayse@example.com", "--sign-up", "Ayşe"]);
        match cli.command {
            Command::Login(cmd) => {
                assert_eq!(cmd.email, "ayse@example.com");
                assert_eq!(cmd.sign_up.as_deref(), Some("Ayşe"));
                assert!(cmd.uid.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_format() {
        let cli = parse(&["tarif", "list", "--format", "json", "-k", "Tatlı"]);
        match cli.command {
            Command::List(cmd) => {
                assert_eq!(cmd.format, OutputFormat::Json);
                assert_eq!(cmd.category.as_deref(), Some("Tatlı"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_new_with_images() {
        let cli = parse(&[
            "tarif",
            "new",
            "--title",
            "Kek",
            "--left-image",
            "a.png",
            "--left-image",
            "b.png",
            "--right-image",
            "c.jpg",
            "--font-size",
            "18",
        ]);
        match cli.command {
            Command::New(args) => {
                assert_eq!(args.title.as_deref(), Some("Kek"));
                assert_eq!(args.left_images.len(), 2);
                assert_eq!(args.right_images, vec![PathBuf::from("c.jpg")]);
                assert_eq!(args.font_size, Some(18));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_edit() {
        let cli = parse(&["tarif", "edit", "recipe-1", "--category", "Çorba"]);
        match cli.command {
            Command::Edit(cmd) => {
                assert_eq!(cmd.id, "recipe-1");
                assert_eq!(cmd.fields.category.as_deref(), Some("Çorba"));
                assert!(cmd.fields.title.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_image_move() {
        let cli = parse(&[
            "tarif",
            "image",
            "move",
            "recipe-1",
            "left",
            "img-1",
            "--x",
            "120",
            "--y=-5",
            "--container",
            "300x500",
        ]);
        match cli.command {
            Command::Image(ImageCommand::Move {
                target,
                x,
                y,
                container,
            }) => {
                assert_eq!(target.recipe, "recipe-1");
                assert_eq!(target.page, PageArg::Left);
                assert_eq!(target.image, "img-1");
                assert_eq!(x, 120.0);
                assert_eq!(y, -5.0);
                assert_eq!(container, (300.0, 500.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_image_resize_default_container() {
        let cli = parse(&[
            "tarif", "image", "resize", "r", "right", "i", "--x", "0", "--y", "0", "--width",
            "10", "--height", "10",
        ]);
        match cli.command {
            Command::Image(ImageCommand::Resize { container, .. }) => {
                assert_eq!(container, (400.0, 600.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete() {
        let cli = parse(&["tarif", "delete", "recipe-1"]);
        assert!(matches!(cli.command, Command::Delete { id } if id == "recipe-1"));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["tarif", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = parse(&["tarif", "config", "show", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }
}
