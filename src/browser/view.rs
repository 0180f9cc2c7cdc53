//! Plain-text rendering of the browsing client, colored with the theme palette.

use std::fmt::Write as _;

use super::state::{BrowserState, Theme};
use crate::tmdb::{poster_url, MovieDetail, MovieSummary};

pub const APP_TITLE: &str = "CineStream";
const OVERVIEW_LIMIT: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
    pub accent: &'static str,
    pub muted: &'static str,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            background: "#181818",
            foreground: "#ffffff",
            accent: "#e50914",
            muted: "#bbbbbb",
        },
        Theme::Light => Palette {
            background: "#f5f5f5",
            foreground: "#222222",
            accent: "#e50914",
            muted: "#666666",
        },
    }
}

/// Label of the button that switches away from `theme`.
pub fn toggle_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "Light Mode",
        Theme::Light => "Dark Mode",
    }
}

pub fn overview_snippet(overview: Option<&str>) -> String {
    let text = match overview {
        Some(t) if !t.is_empty() => t,
        _ => return "No description available.".to_string(),
    };
    let mut snippet: String = text.chars().take(OVERVIEW_LIMIT).collect();
    if text.chars().count() > OVERVIEW_LIMIT {
        snippet.push_str("...");
    }
    snippet
}

/// 24-bit foreground color escape. Malformed colors leave the text untouched.
pub fn paint(text: &str, hex: &str) -> String {
    match hex_rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}

/// Like [`paint`], with a 24-bit background as well.
pub fn paint_on(text: &str, fg: &str, bg: &str) -> String {
    match (hex_rgb(fg), hex_rgb(bg)) {
        (Some((r, g, b)), Some((br, bgc, bb))) => {
            format!("\x1b[38;2;{r};{g};{b};48;2;{br};{bgc};{bb}m{text}\x1b[0m")
        }
        _ => paint(text, fg),
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub fn render_header(state: &BrowserState) -> String {
    let colors = palette(state.theme());
    let genre = match state.selected_genre() {
        Some(id) => state.genre_name(id).unwrap_or("Unknown genre").to_string(),
        None => "All Genres".to_string(),
    };
    format!(
        "{}  [{}]  genre: {}  page: {}{}",
        paint_on(APP_TITLE, colors.accent, colors.background),
        toggle_label(state.theme()),
        genre,
        state.page(),
        if state.has_more() { "" } else { " (end)" }
    )
}

pub fn render_genre_picker(state: &BrowserState) -> String {
    let mut out = String::from("  all  All Genres\n");
    for genre in state.genres() {
        let _ = writeln!(out, "{:>5}  {}", genre.id, genre.name);
    }
    out
}

pub fn render_card(index: usize, movie: &MovieSummary, theme: Theme) -> String {
    let colors = palette(theme);
    let poster = movie
        .poster_path
        .as_deref()
        .map(poster_url)
        .unwrap_or_else(|| "No Image".to_string());
    format!(
        "{:>3}. {} {}\n     {}\n     {}\n",
        index + 1,
        paint(&movie.title, colors.foreground),
        paint(movie.release_date.as_deref().unwrap_or(""), colors.accent),
        paint(&overview_snippet(movie.overview.as_deref()), colors.muted),
        poster
    )
}

pub fn render_grid(state: &BrowserState) -> String {
    if state.movies().is_empty() {
        return "No movies to show.\n".to_string();
    }
    state
        .movies()
        .iter()
        .enumerate()
        .map(|(i, m)| render_card(i, m, state.theme()))
        .collect()
}

pub fn render_overlay(detail: &MovieDetail, theme: Theme) -> String {
    let colors = palette(theme);
    let mut out = String::new();
    let _ = writeln!(out, "{}", paint(&detail.title, colors.accent));
    let _ = writeln!(out, "Genres: {}", detail.genres.join(", "));
    let _ = writeln!(out, "Rating: {} / 10", detail.vote_average);
    let _ = writeln!(
        out,
        "Release Date: {}",
        detail.release_date.as_deref().unwrap_or("")
    );
    let _ = writeln!(out, "Cast: {}", detail.cast.join(", "));
    if let Some(overview) = detail.overview.as_deref().filter(|o| !o.is_empty()) {
        let _ = writeln!(out, "\n{}", overview);
    }
    if let Some(trailer) = &detail.trailer {
        let _ = writeln!(out, "\nTrailer: {}", trailer.embed_url());
    }
    let _ = writeln!(
        out,
        "\n{}",
        paint(&format!("View on TMDB: {}", detail.tmdb_page()), colors.accent)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::Trailer;

    #[test]
    fn overview_is_truncated_at_limit() {
        let long = "x".repeat(150);
        let snippet = overview_snippet(Some(&long));
        assert_eq!(snippet.len(), 123);
        assert!(snippet.ends_with("..."));

        let exact = "y".repeat(120);
        assert_eq!(overview_snippet(Some(&exact)), exact);
        assert_eq!(overview_snippet(Some("")), "No description available.");
        assert_eq!(overview_snippet(None), "No description available.");
    }

    #[test]
    fn overview_truncation_respects_char_boundaries() {
        let accented = "é".repeat(130);
        let snippet = overview_snippet(Some(&accented));
        assert_eq!(snippet.chars().count(), 123);
    }

    #[test]
    fn paints_with_truecolor_escape() {
        assert_eq!(paint("hi", "#e50914"), "\x1b[38;2;229;9;20mhi\x1b[0m");
        assert_eq!(paint("hi", "red"), "hi");
    }

    #[test]
    fn card_without_poster_says_no_image() {
        let movie = MovieSummary {
            id: 1,
            title: "Nameless".to_string(),
            poster_path: None,
            release_date: None,
            overview: None,
            genre_ids: vec![],
        };
        let card = render_card(0, &movie, Theme::Dark);
        assert!(card.contains("No Image"));
        assert!(card.contains("No description available."));
    }

    #[test]
    fn overlay_lists_trailer_and_tmdb_link() {
        let detail = MovieDetail {
            id: 603,
            title: "The Matrix".to_string(),
            overview: Some("Neo wakes up.".to_string()),
            release_date: Some("1999-03-31".to_string()),
            vote_average: 8.2,
            poster_path: None,
            genres: vec!["Action".to_string(), "Science Fiction".to_string()],
            cast: vec!["Keanu Reeves".to_string(), "Carrie-Anne Moss".to_string()],
            trailer: Some(Trailer {
                key: "vKQi3bBA1y8".to_string(),
                name: "Trailer".to_string(),
            }),
        };
        let text = render_overlay(&detail, Theme::Light);
        assert!(text.contains("Genres: Action, Science Fiction"));
        assert!(text.contains("Rating: 8.2 / 10"));
        assert!(text.contains("Cast: Keanu Reeves, Carrie-Anne Moss"));
        assert!(text.contains("https://www.youtube.com/embed/vKQi3bBA1y8"));
        assert!(text.contains("https://www.themoviedb.org/movie/603"));
    }

    #[test]
    fn toggle_label_names_the_other_theme() {
        assert_eq!(toggle_label(Theme::Dark), "Light Mode");
        assert_eq!(toggle_label(Theme::Light), "Dark Mode");
    }
}
