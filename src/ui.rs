// UI layer: an interactive menu using `dialoguer`.
// Account actions go through `Accounts`; catalog browsing goes through
// `CatalogClient`. Failures are printed and the menu keeps running.

use crate::accounts::Accounts;
use crate::catalog::{CatalogClient, CatalogError, CatalogTransport, MovieDetail, MoviePage, DEFAULT_PAGE};
use anyhow::Result;
use crossterm::style::{style, Color, Stylize};
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::time::Duration;

const MENU: [&str; 10] = [
    "Register",
    "Login",
    "Logout",
    "Popular movies",
    "Now playing",
    "Discover by genre",
    "Search",
    "Genres",
    "Movie details",
    "Exit",
];

/// Main interactive menu. Runs until the user chooses "Exit".
pub fn main_menu<T: CatalogTransport>(accounts: &Accounts, catalog: &CatalogClient<T>) -> Result<()> {
    loop {
        print_status(accounts);
        let selection = Select::new().items(&MENU).default(3).interact()?;
        match selection {
            0 => handle_register(accounts)?,
            1 => handle_login(accounts)?,
            2 => match accounts.sign_out() {
                Ok(()) => success("Logged out."),
                Err(e) => failure(format!("Logout failed: {e}")),
            },
            3 => browse(|page| catalog.popular(page))?,
            4 => browse(|page| catalog.now_playing(page))?,
            5 => handle_discover(catalog)?,
            6 => {
                let query: String = Input::new().with_prompt("Search").interact_text()?;
                browse(|page| catalog.search(&query, page))?;
            }
            7 => match with_spinner("Loading genres...", || catalog.genres()) {
                Ok(genres) => {
                    for genre in genres {
                        println!("  {:>6}  {}", genre.id, genre.name);
                    }
                }
                Err(e) => report(&e),
            },
            8 => {
                let id: u64 = Input::new().with_prompt("Movie id").interact_text()?;
                match with_spinner("Loading movie...", || catalog.movie_detail(id)) {
                    Ok(detail) => print_detail(&detail),
                    Err(e) => report(&e),
                }
            }
            _ => break,
        }
    }
    Ok(())
}

fn print_status(accounts: &Accounts) {
    let line = match accounts.session().current_user_id() {
        Some(user) => format!("Logged in as {user}"),
        None => "Not logged in".to_string(),
    };
    println!("{}", style(line).with(Color::DarkGrey));
}

/// Collect an email and password and register a new user.
fn handle_register(accounts: &Accounts) -> Result<()> {
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password: String = Password::new()
        .with_prompt("Password (your catalog API key)")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    match accounts.sign_up(email.trim(), &password) {
        Ok(user) => success(format!("Registered {}, please login.", user.id)),
        Err(e) => failure(format!("Register failed: {e}")),
    }
    Ok(())
}

/// Collect credentials and start a session.
fn handle_login(accounts: &Accounts) -> Result<()> {
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password: String = Password::new().with_prompt("Password").interact()?;
    let keep = Confirm::new()
        .with_prompt("Keep me logged in?")
        .default(false)
        .interact()?;

    match accounts.sign_in(email.trim(), &password, keep) {
        Ok(user) => success(format!("Welcome {}!", user.id)),
        Err(e) => failure(format!("Login failed: {e}")),
    }
    Ok(())
}

fn handle_discover<T: CatalogTransport>(catalog: &CatalogClient<T>) -> Result<()> {
    let genres = match with_spinner("Loading genres...", || catalog.genres()) {
        Ok(genres) if !genres.is_empty() => genres,
        Ok(_) => {
            failure("The catalog returned no genres.");
            return Ok(());
        }
        Err(e) => {
            report(&e);
            return Ok(());
        }
    };

    let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
    let choice = Select::new()
        .with_prompt("Genre")
        .items(&names)
        .default(0)
        .interact()?;
    let filter = format!("&with_genres={}", genres[choice].id);
    browse(|page| catalog.discover(&filter, page))
}

/// Show one page at a time, asking before fetching the next.
fn browse<F>(mut fetch: F) -> Result<()>
where
    F: FnMut(u32) -> Result<MoviePage, CatalogError>,
{
    let mut page = DEFAULT_PAGE;
    loop {
        match with_spinner("Loading...", || fetch(page)) {
            Ok(result) => {
                print_page(&result);
                if !result.has_next() {
                    break;
                }
                let next = Confirm::new()
                    .with_prompt("Next page?")
                    .default(true)
                    .interact()?;
                if !next {
                    break;
                }
                page = result.page + 1;
            }
            Err(e) => {
                report(&e);
                break;
            }
        }
    }
    Ok(())
}

fn print_page(page: &MoviePage) {
    if page.results.is_empty() {
        println!("  (no results)");
    }
    for movie in &page.results {
        let year = movie
            .release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .unwrap_or("----");
        let rating = movie
            .vote_average
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>8}  {}  ({year})  {}",
            movie.id,
            style(&movie.title).attribute(crossterm::style::Attribute::Bold),
            style(format!("★ {rating}")).with(Color::Yellow),
        );
    }
    println!(
        "{}",
        style(format!("page {} / {}", page.page, page.total_pages)).with(Color::DarkGrey)
    );
}

fn print_detail(detail: &MovieDetail) {
    println!("{}", style(&detail.title).attribute(crossterm::style::Attribute::Bold));
    if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("  \"{tagline}\"");
    }
    if let Some(date) = &detail.release_date {
        println!("  Released: {date}");
    }
    if let Some(runtime) = detail.runtime {
        println!("  Runtime:  {runtime} min");
    }
    if let Some(vote) = detail.vote_average {
        println!("  Rating:   {vote:.1}");
    }
    if !detail.genres.is_empty() {
        let names: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
        println!("  Genres:   {}", names.join(", "));
    }
    if !detail.overview.is_empty() {
        println!();
        println!("{}", detail.overview);
    }
}

fn report(error: &CatalogError) {
    match error {
        CatalogError::MissingApiKey(_) => {
            println!("{}", style(error).with(Color::Yellow));
        }
        _ => failure(format!("Request failed: {error}")),
    }
}

fn success(message: impl Display) {
    println!("{}", style(message).with(Color::Green));
}

fn failure(message: impl Display) {
    println!("{}", style(message).with(Color::Red));
}

fn with_spinner<R>(message: &'static str, work: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = work();
    spinner.finish_and_clear();
    result
}
