//! Interactive terminal front end for the browsing client.
//! Usage:
//!   cargo run --bin cinestream_browse
//! Requires TMDB_CLIENT_API_KEY (or TMDB_API_KEY) in the environment (.env supported).

use anyhow::{anyhow, Result};
use cinestream::browser::{view, Browser};
use cinestream::config::ClientConfig;
use cinestream::tmdb::{TmdbApi, TmdbClient};
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
commands:
  list               show the current movie list
  genres             show the genre list
  genre <id|all>     filter by genre (all = popular)
  search [text]      search movies; empty text returns to the genre filter
  more               load the next page (same as scrolling to the bottom)
  open <n>           show details for movie number n
  close              close the detail view
  theme              toggle light/dark theme
  help               show this help
  quit               exit";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

enum Command {
    List,
    Genres,
    Genre(Option<i32>),
    Search(String),
    More,
    Open(usize),
    Close,
    Theme,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    match word.to_lowercase().as_str() {
        "" | "list" | "ls" => Ok(Command::List),
        "genres" => Ok(Command::Genres),
        "genre" => match rest {
            "" | "all" => Ok(Command::Genre(None)),
            id => id
                .parse()
                .map(|id| Command::Genre(Some(id)))
                .map_err(|_| anyhow!("genre expects a numeric id or 'all'")),
        },
        "search" | "s" => Ok(Command::Search(rest.to_string())),
        "more" | "m" => Ok(Command::More),
        "open" | "o" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(Command::Open)
            .ok_or_else(|| anyhow!("open expects a movie number from the list")),
        "close" | "c" => Ok(Command::Close),
        "theme" | "t" => Ok(Command::Theme),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(anyhow!("unknown command '{}', try 'help'", other)),
    }
}

fn print_list(browser: &Browser) {
    let state = browser.state();
    println!("{}", view::render_header(state));
    print!("{}", view::render_grid(state));
}

fn print_overlay(browser: &Browser) {
    let state = browser.state();
    if let Some(detail) = state.detail().filter(|_| state.overlay_visible()) {
        print!("{}", view::render_overlay(detail, state.theme()));
    }
}

async fn execute(browser: &mut Browser, command: Command) -> Result<bool> {
    match command {
        Command::List => {
            print_list(browser);
            print_overlay(browser);
        }
        Command::Genres => print!("{}", view::render_genre_picker(browser.state())),
        Command::Genre(genre) => {
            browser.select_genre(genre).await?;
            print_list(browser);
        }
        Command::Search(text) => {
            browser.set_query(text);
            browser.submit_search().await?;
            print_list(browser);
        }
        Command::More => {
            if browser.load_more().await? {
                print_list(browser);
            } else {
                println!("No more results.");
            }
        }
        Command::Open(n) => {
            let id = browser
                .state()
                .movies()
                .get(n - 1)
                .map(|m| m.id)
                .ok_or_else(|| anyhow!("no movie number {}", n))?;
            browser.open_movie(id).await?;
            print_overlay(browser);
        }
        Command::Close => browser.close_movie(),
        Command::Theme => {
            let theme = browser.toggle_theme();
            println!("Switched to {:?} theme.", theme);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = dotenv();
    init_tracing();
    match loaded {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let config = ClientConfig::from_env()?;
    let api: Arc<dyn TmdbApi> = Arc::new(TmdbClient::for_client(&config)?);
    let mut browser = Browser::new(api);
    browser.start().await?;
    print_list(&browser);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(c) => c,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match execute(&mut browser, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!("Command failed: {:#}", e);
                println!("Error: {:#}", e);
            }
        }
    }
    Ok(())
}
