//! Text rendering of the article view.
//!
//! Everything here is a pure function from state to `String`; the caller
//! decides where the text goes. ANSI styling is applied only when the
//! [`Theme`] says so, which keeps output assertable in tests.

use crate::models::Article;
use crate::utils::{display_date, truncate_chars, upcase};
use std::fmt::Write;

/// Shown instead of a lead image when the article has none.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x200";

pub const NO_ARTICLES: &str = "No articles found.";

const DESCRIPTION_MAX_CHARS: usize = 280;

/// Light or dark palette, optionally without any escape codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
    pub ansi: bool,
}

impl Theme {
    pub fn new(dark: bool, ansi: bool) -> Self {
        Self { dark, ansi }
    }

    /// Label of the dark-mode toggle: the mode it would switch to.
    pub fn toggle_icon(&self) -> &'static str {
        if self.dark { "☀️" } else { "🌙" }
    }

    fn paint(&self, text: &str, light: &str, dark: &str) -> String {
        if !self.ansi {
            return text.to_string();
        }
        let code = if self.dark { dark } else { light };
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn heading(&self, text: &str) -> String {
        self.paint(text, "1;34", "1;96")
    }

    fn secondary(&self, text: &str) -> String {
        self.paint(text, "2", "37")
    }

    fn link(&self, text: &str) -> String {
        self.paint(text, "4;34", "4;36")
    }
}

/// Navigation bar: the categories with the active one bracketed, and the toggle.
pub fn render_nav(categories: &[String], active: Option<&str>, theme: &Theme) -> String {
    let items = categories
        .iter()
        .map(|c| {
            if Some(c.as_str()) == active {
                theme.heading(&format!("[{}]", upcase(c)))
            } else {
                upcase(c)
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("News Search | {items} | {}", theme.toggle_icon())
}

/// One article card, numbered from 1.
pub fn render_card(index: usize, article: &Article, theme: &Theme) -> String {
    let mut card = String::new();
    let title = article.title.as_deref().unwrap_or("No Title");
    let date = article
        .published_at
        .as_ref()
        .map(display_date)
        .unwrap_or_default();
    let description = article
        .description
        .as_deref()
        .map(|d| truncate_chars(d, DESCRIPTION_MAX_CHARS))
        .unwrap_or_else(|| "No Description".to_string());
    let image = article.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE);

    writeln!(card, "{:>3}. {}", index, theme.heading(title)).unwrap();
    writeln!(
        card,
        "     {}",
        theme.secondary(&format!("{} • {}", article.source_name, date))
    )
    .unwrap();
    writeln!(card, "     {description}").unwrap();
    writeln!(card, "     {}", theme.link(&article.url)).unwrap();
    writeln!(card, "     {}", theme.secondary(&format!("image: {image}"))).unwrap();
    card
}

/// The whole result list.
///
/// An empty list renders [`NO_ARTICLES`] and never offers more pages.
pub fn render_articles(articles: &[Article], has_more: bool, theme: &Theme) -> String {
    if articles.is_empty() {
        return format!("{}\n", theme.secondary(NO_ARTICLES));
    }

    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        out.push_str(&render_card(i + 1, article, theme));
        out.push('\n');
    }
    if has_more {
        writeln!(out, "{}", theme.secondary("-- more results available: type `more` --")).unwrap();
    }
    out
}

/// Options of the source filter, the current selection marked with `*`.
pub fn render_sources(sources: &[String], selected: Option<&str>) -> String {
    let mut out = String::new();
    let mark = |on: bool| if on { '*' } else { ' ' };
    writeln!(out, "{} All Sources", mark(selected.is_none())).unwrap();
    for source in sources {
        writeln!(out, "{} {}", mark(selected == Some(source.as_str())), source).unwrap();
    }
    out
}
