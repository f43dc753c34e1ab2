use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dapur::api::{Recipe, RecipeClient};
use dapur::app::{App, AppEvent, Effect, NoticeKind};
use dapur::auth::StaticTokenStore;
use dapur::config::Config;
use dapur::image::LocalFileSource;
use dapur::util::{format_date, ingredients_preview, step_preview, strip_control_chars};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Get the config directory path (~/.config/dapur/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("dapur"))
}

#[derive(Parser, Debug)]
#[command(name = "dapur", about = "Browse, post and delete recipes from the terminal")]
struct Args {
    /// Config file (default: ~/.config/dapur/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL from the config file
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the public feed
    Feed {
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// List your own recipes
    Mine,
    /// Post a new recipe
    Post {
        #[arg(long)]
        title: String,
        /// Text file with one ingredient per line
        #[arg(long, value_name = "FILE")]
        ingredients: PathBuf,
        /// Text file with one step per line
        #[arg(long, value_name = "FILE")]
        steps: PathBuf,
        /// Photo of the dish
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
    },
    /// Delete one of your recipes
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Prints notices; returns `true` if any of them was an error.
fn report(effects: &[Effect]) -> bool {
    let mut failed = false;
    for effect in effects {
        match effect {
            Effect::Notify(notice) if notice.kind == NoticeKind::Error => {
                eprintln!("Error: {}", notice.message);
                failed = true;
            }
            Effect::Notify(notice) => println!("{}", notice.message),
            Effect::Navigate(route) => tracing::debug!(?route, "Navigation requested"),
        }
    }
    failed
}

fn print_recipe(recipe: &Recipe) {
    println!("{}  [{}]", strip_control_chars(&recipe.title), recipe.id);
    let mut byline = Vec::new();
    if let Some(name) = recipe.author.as_ref().and_then(|a| a.username()) {
        byline.push(format!("by {}", strip_control_chars(name)));
    }
    if let Some(date) = &recipe.created_at {
        byline.push(format_date(date));
    }
    if !byline.is_empty() {
        println!("  {}", byline.join(" · "));
    }
    if let Some(ingredients) = ingredients_preview(&recipe.ingredients) {
        println!("  Ingredients: {}", strip_control_chars(&ingredients));
    }
    if let Some(step) = step_preview(&recipe.steps) {
        println!("  Step 1: {}", strip_control_chars(&step));
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Asks on stdin; anything but y/yes declines.
fn ask(question: &str, confirm_label: &str) -> Result<bool> {
    print!("{} [{}? y/N] ", question, confirm_label);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    tracing::debug!(?config, "Effective configuration");

    let auth = Arc::new(StaticTokenStore::new(config.token()));
    let api = Arc::new(
        RecipeClient::new(&config.api_url, auth.clone(), config.request_timeout())
            .context("Failed to create API client")?,
    );

    // Only `post` picks a photo
    let image_path = match &args.command {
        Command::Post { image, .. } => image.clone(),
        _ => PathBuf::new(),
    };

    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(32);
    let mut app = App::new(
        api,
        auth,
        Arc::new(LocalFileSource::new(image_path)),
        config.settings(),
        event_tx,
    );

    let failed = match args.command {
        Command::Feed { pages } => {
            app.feed.load_initial();
            let mut failed = report(&app.settle(&mut event_rx).await);
            for _ in 1..pages {
                if !app.feed.load_more() {
                    break;
                }
                failed |= report(&app.settle(&mut event_rx).await);
            }
            for recipe in app.feed.items().iter() {
                print_recipe(recipe);
            }
            println!(
                "-- page {} of {} ({} recipes)",
                app.feed.page(),
                app.feed.total_pages(),
                app.feed.items().len()
            );
            failed
        }
        Command::Mine => {
            app.profile.load();
            let failed = report(&app.settle(&mut event_rx).await);
            for recipe in app.profile.items().iter() {
                print_recipe(recipe);
            }
            failed
        }
        Command::Post {
            title,
            ingredients,
            steps,
            ..
        } => {
            let ingredients = read_text(&ingredients)?;
            let steps = read_text(&steps)?;

            let mut effects: Vec<Effect> = app.pick_image().await.into_iter().collect();
            let draft = app.composer.draft_mut();
            draft.title = title;
            draft.ingredients_text = ingredients;
            draft.steps_text = steps;
            effects.extend(app.composer.submit());
            effects.extend(app.settle(&mut event_rx).await);
            report(&effects)
        }
        Command::Delete { id, yes } => {
            app.profile.load();
            let mut failed = report(&app.settle(&mut event_rx).await);
            let title = app
                .profile
                .items()
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.title.clone())
                .unwrap_or_else(|| id.clone());

            if let Some(prompt) = app.request_delete(&id, &title) {
                let question = format!("{} \"{}\"", prompt.message, title);
                let confirmed = yes || ask(&question, prompt.confirm_label)?;
                if confirmed {
                    let mut effects = app.confirm();
                    effects.extend(app.settle(&mut event_rx).await);
                    failed |= report(&effects);
                } else {
                    app.cancel();
                    println!("{}", prompt.cancel_label);
                }
            }
            failed
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
