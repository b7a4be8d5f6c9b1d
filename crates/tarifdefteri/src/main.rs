//! `tarif` - CLI for tarifdefteri
//!
//! This binary is the front end of the recipe notebook: sign in, list and
//! read recipes, and create or change them through the editor workflow.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tarifdefteri_layout::{PixelPoint, PixelRect};

use tarifdefteri::cli::{
    resolve_font_color, resolve_font_family, Cli, Command, ConfigCommand, EditCommand,
    ImageCommand, ImageTarget, ListCommand, LoginCommand, OutputFormat, RecipeArgs, ShowCommand,
};
use tarifdefteri::contents::UNCATEGORIZED;
use tarifdefteri::storage::LocalRecipeStore;
use tarifdefteri::{
    init_logging, open_store, BackendMode, Config, DeviceStore, Editor, Error, ImageUpload,
    Notebook, Page, Recipe, RecipeStore, Session, SessionContext,
};

/// Everything a command needs, opened once per run.
struct App {
    config: Config,
    device: Arc<DeviceStore>,
    sessions: SessionContext,
    store: Arc<dyn RecipeStore>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("mode", &self.store.mode())
            .finish_non_exhaustive()
    }
}

impl App {
    fn open(config: Config) -> anyhow::Result<Self> {
        let path = config.database_path();
        let device = Arc::new(
            DeviceStore::open(&path)
                .with_context(|| format!("opening device store at {}", path.display()))?,
        );
        let store = open_store(&config, Arc::clone(&device))?;
        Ok(Self {
            config,
            sessions: SessionContext::new(Arc::clone(&device)),
            device,
            store,
        })
    }

    fn session(&self) -> anyhow::Result<Session> {
        Ok(self.sessions.require()?)
    }

    fn editor(&self, session: &Session) -> Editor {
        Editor::new(
            Arc::clone(&self.store),
            session.uid.clone(),
            self.config.editor.clone(),
        )
    }

    async fn recipe(&self, session: &Session, id: &str) -> anyhow::Result<Recipe> {
        self.store
            .get_recipe(&session.uid, id)
            .await?
            .ok_or_else(|| Error::recipe_not_found(id).into())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err
                .downcast_ref::<Error>()
                .is_some_and(Error::is_configuration)
            {
                eprintln!("hint: run `tarif config show` to inspect the backend settings");
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config;
    // Config commands must work even when the store cannot be opened.
    let open = || -> anyhow::Result<App> { App::open(Config::load_from(config_path.clone())?) };

    match cli.command {
        Command::Config(cmd) => handle_config(config_path.clone(), cmd),
        Command::Login(cmd) => handle_login(&open()?, &cmd),
        Command::Logout => handle_logout(&open()?),
        Command::Whoami => handle_whoami(&open()?),
        Command::Status(cmd) => handle_status(&open()?, cmd.json).await,
        Command::List(cmd) => handle_list(&open()?, &cmd).await,
        Command::Categories => handle_categories(&open()?).await,
        Command::Contents => handle_contents(&open()?).await,
        Command::Show(cmd) => handle_show(&open()?, &cmd).await,
        Command::New(args) => handle_new(&open()?, &args).await,
        Command::Edit(cmd) => handle_edit(&open()?, &cmd).await,
        Command::Delete { id } => handle_delete(&open()?, &id).await,
        Command::Image(cmd) => handle_image(&open()?, cmd).await,
    }
}

fn handle_login(app: &App, cmd: &LoginCommand) -> anyhow::Result<()> {
    let session = match (app.store.mode(), &cmd.uid) {
        (BackendMode::Remote, Some(uid)) => app.sessions.sign_in_remote(uid, &cmd.email)?,
        (BackendMode::Remote, None) => {
            bail!("remote mode needs the user id from the account service: pass --uid")
        }
        (BackendMode::Local, Some(_)) => bail!("--uid only applies in remote mode"),
        (BackendMode::Local, None) => match &cmd.sign_up {
            Some(name) => app.sessions.sign_up(&cmd.email, name)?,
            None => app.sessions.sign_in(&cmd.email)?,
        },
    };
    println!("Signed in as {} ({})", session.name(), session.uid);
    Ok(())
}

fn handle_logout(app: &App) -> anyhow::Result<()> {
    app.sessions.sign_out()?;
    println!("Signed out.");
    Ok(())
}

fn handle_whoami(app: &App) -> anyhow::Result<()> {
    match app.sessions.current()? {
        Some(session) => {
            println!("{} <{}>", session.name(), session.email);
            println!("uid: {}", session.uid);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

async fn handle_status(app: &App, json: bool) -> anyhow::Result<()> {
    let mode = app.store.mode();
    let session = app.sessions.current()?;
    let recipes = match &session {
        Some(s) => Some(
            app.store
                .list_recipes(&s.uid)
                .await
                .as_deref()
                .map(<[Recipe]>::len)
                .map_err(ToString::to_string),
        ),
        None => None,
    };
    let last_saved = if mode.is_local() {
        LocalRecipeStore::new(Arc::clone(&app.device)).last_saved()?
    } else {
        None
    };

    if json {
        let status = serde_json::json!({
            "mode": mode.to_string(),
            "database_path": app.config.database_path(),
            "api_url": app.config.backend.api_url,
            "user": session,
            "recipes": recipes.as_ref().and_then(|r| r.as_ref().ok()),
            "error": recipes.as_ref().and_then(|r| r.as_ref().err()),
            "last_saved": last_saved,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("tarif status");
        println!("------------");
        println!("Backend:       {mode}");
        if mode.is_local() {
            println!("Database:      {}", app.config.database_path().display());
        } else {
            println!(
                "API:           {}",
                app.config.backend.api_url.as_deref().unwrap_or("(not set)")
            );
        }
        match &session {
            Some(s) => println!("User:          {} ({})", s.name(), s.uid),
            None => println!("User:          not signed in"),
        }
        match recipes {
            Some(Ok(count)) => println!("Recipes:       {count}"),
            Some(Err(e)) => println!("Recipes:       unavailable ({e})"),
            None => {}
        }
        if let Some(at) = last_saved {
            println!("Last saved:    {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }
    Ok(())
}

async fn handle_list(app: &App, cmd: &ListCommand) -> anyhow::Result<()> {
    let session = app.session()?;
    let notebook = Notebook::load(app.store.as_ref(), &session.uid).await?;
    let recipes: Vec<&Recipe> = match &cmd.category {
        Some(category) => notebook.in_category(category).collect(),
        None => notebook.recipes.iter().collect(),
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipes)?),
        OutputFormat::Plain => {
            for recipe in &recipes {
                println!("{}\t{}", recipe.id, recipe.title);
            }
        }
        OutputFormat::Table => {
            if recipes.is_empty() {
                if cmd.category.is_some() && !notebook.categories.is_empty() {
                    println!("No recipes there. Categories: {}", notebook.categories.join(", "));
                } else {
                    println!("No recipes yet. Create one with `tarif new --title ...`.");
                }
                return Ok(());
            }
            println!("{:<44} {:<16} {:<17} TITLE", "ID", "CATEGORY", "UPDATED");
            for recipe in &recipes {
                let category = if recipe.category.trim().is_empty() {
                    "-"
                } else {
                    recipe.category.as_str()
                };
                println!(
                    "{:<44} {:<16} {:<17} {}",
                    recipe.id,
                    category,
                    recipe.updated_at.format("%Y-%m-%d %H:%M"),
                    recipe.title
                );
            }
        }
    }
    Ok(())
}

async fn handle_categories(app: &App) -> anyhow::Result<()> {
    let session = app.session()?;
    for category in app.store.list_categories(&session.uid).await? {
        println!("{category}");
    }
    Ok(())
}

async fn handle_contents(app: &App) -> anyhow::Result<()> {
    let session = app.session()?;
    let notebook = Notebook::load(app.store.as_ref(), &session.uid).await?;
    if notebook.is_empty() {
        println!("The notebook is empty.");
        return Ok(());
    }

    println!("İçindekiler ({} tarif)", notebook.len());
    for section in notebook.contents() {
        let marker = if section.name == UNCATEGORIZED { "~" } else { "#" };
        println!();
        println!("{marker} {}", section.name);
        for recipe in section.recipes {
            println!("  - {}  [{}]", recipe.title, recipe.id);
        }
    }
    Ok(())
}

async fn handle_show(app: &App, cmd: &ShowCommand) -> anyhow::Result<()> {
    let session = app.session()?;
    let recipe = app.recipe(&session, &cmd.id).await?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    println!("{}", recipe.title);
    println!("{}", "=".repeat(recipe.title.chars().count().max(1)));
    if !recipe.category.trim().is_empty() {
        println!("Category: {}", recipe.category);
    }
    println!(
        "Font:     {}px {} {}",
        recipe.font_size, recipe.font_family, recipe.font_color
    );
    println!("Created:  {}", recipe.created_at.to_rfc3339());
    println!("Updated:  {}", recipe.updated_at.to_rfc3339());
    for page in [Page::Left, Page::Right] {
        println!();
        println!("[{page} page]");
        let content = recipe.content(page);
        if !content.trim().is_empty() {
            println!("{content}");
        }
        for image in recipe.images(page) {
            println!(
                "  image {} at ({:.1}%, {:.1}%) size {:.1}% x {:.1}% z={}",
                image.id, image.x, image.y, image.width, image.height, image.z_index
            );
        }
    }
    Ok(())
}

/// Copy the given fields into the open draft and upload any images.
async fn apply_fields(editor: &mut Editor, args: &RecipeArgs) -> anyhow::Result<()> {
    {
        let draft = editor.draft_mut()?;
        if let Some(title) = &args.title {
            draft.title.clone_from(title);
        }
        if let Some(category) = &args.category {
            draft.category.clone_from(category);
        }
        if let Some(text) = &args.left {
            *draft.content_mut(Page::Left) = text.clone();
        }
        if let Some(text) = &args.right {
            *draft.content_mut(Page::Right) = text.clone();
        }
        if let Some(size) = args.font_size {
            draft.set_font_size(size)?;
        }
        if let Some(family) = &args.font_family {
            draft.style.font_family = resolve_font_family(family);
        }
        if let Some(color) = &args.font_color {
            draft.style.font_color = resolve_font_color(color);
        }
    }

    let uploads = args
        .left_images
        .iter()
        .map(|p| (Page::Left, p))
        .chain(args.right_images.iter().map(|p| (Page::Right, p)));
    for (page, path) in uploads {
        let upload = ImageUpload::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let id = editor.upload_image(page, upload).await?;
        println!("Placed {} on the {page} page as {id}", path.display());
    }
    Ok(())
}

async fn handle_new(app: &App, args: &RecipeArgs) -> anyhow::Result<()> {
    let session = app.session()?;
    let mut editor = app.editor(&session);
    let id = editor.begin_new().await?;

    let result = async {
        apply_fields(&mut editor, args).await?;
        Ok::<_, anyhow::Error>(editor.save().await?)
    }
    .await;

    match result {
        Ok(id) => {
            println!("Created recipe {id}");
            Ok(())
        }
        Err(e) => {
            // The placeholder and anything already uploaded stay.
            if let Err(keep_err) = editor.keep().await {
                eprintln!("warning: could not save recipe {id}: {keep_err}");
            }
            Err(e.context(format!(
                "recipe {id} was kept; finish it with `tarif edit {id}`"
            )))
        }
    }
}

async fn handle_edit(app: &App, cmd: &EditCommand) -> anyhow::Result<()> {
    let session = app.session()?;
    let recipe = app.recipe(&session, &cmd.id).await?;
    let mut editor = app.editor(&session);
    editor.begin_edit(&recipe)?;
    apply_fields(&mut editor, &cmd.fields).await?;
    let id = editor.save().await?;
    println!("Saved recipe {id}");
    Ok(())
}

async fn handle_delete(app: &App, id: &str) -> anyhow::Result<()> {
    let session = app.session()?;
    app.store.delete_recipe(&session.uid, id).await?;
    println!("Deleted recipe {id}");
    Ok(())
}

async fn handle_image(app: &App, cmd: ImageCommand) -> anyhow::Result<()> {
    let session = app.session()?;
    let target: &ImageTarget = match &cmd {
        ImageCommand::Move { target, .. }
        | ImageCommand::Resize { target, .. }
        | ImageCommand::Remove { target } => target,
    };
    let recipe = app.recipe(&session, &target.recipe).await?;
    let page = Page::from(target.page);
    let mut editor = app.editor(&session);
    editor.begin_edit(&recipe)?;

    match &cmd {
        ImageCommand::Move {
            x, y, container, ..
        } => {
            let layout = editor.page_layout(container.0, container.1);
            let rect = editor
                .move_image(page, &target.image, &layout, PixelPoint::new(*x, *y))?
                .context("page is not laid out")?;
            println!("Moved {} to ({:.1}%, {:.1}%)", target.image, rect.x, rect.y);
        }
        ImageCommand::Resize {
            x,
            y,
            width,
            height,
            container,
            ..
        } => {
            let layout = editor.page_layout(container.0, container.1);
            let rect = editor
                .resize_image(
                    page,
                    &target.image,
                    &layout,
                    PixelRect::new(*x, *y, *width, *height),
                )?
                .context("page is not laid out")?;
            println!(
                "Resized {} to {:.1}% x {:.1}% at ({:.1}%, {:.1}%)",
                target.image, rect.width, rect.height, rect.x, rect.y
            );
        }
        ImageCommand::Remove { .. } => {
            editor.remove_image(page, &target.image)?;
            println!("Removed {} from the {page} page", target.image);
        }
    }

    editor.save().await?;
    Ok(())
}

fn handle_config(path: Option<std::path::PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path)?;
            let mut shown = config.clone();
            if shown.backend.api_key.is_some() {
                shown.backend.api_key = Some("<redacted>".to_string());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("Mode:                 {}", BackendMode::from_config(&config));
                println!();
                println!("[Backend]");
                println!(
                    "  API URL:            {}",
                    shown.backend.api_url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  Storage URL:        {}",
                    shown.backend.storage_url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  API key:            {}",
                    shown.backend.api_key.as_deref().unwrap_or("(not set)")
                );
                println!("  Timeout (s):        {}", shown.backend.timeout_secs);
                println!();
                println!("[Local]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Editor]");
                println!("  Font size:          {}", shown.editor.default_font_size);
                println!("  Font family:        {}", shown.editor.default_font_family);
                println!("  Font color:         {}", shown.editor.default_font_color);
                println!("  Min image (px):     {}", shown.editor.min_image_px);
                println!("  New image size (%): {}", shown.editor.new_image_size_pct);
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                path.unwrap_or_else(Config::default_config_path).display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
