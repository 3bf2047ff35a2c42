//! Interactive session: user actions bound to the controller and preferences.
//!
//! Input lines are parsed into an [`Action`]; [`App::handle`] performs it and
//! returns a [`Response`] describing what to draw and what to notify. The app
//! never writes to the terminal itself.

use crate::api::NewsSource;
use crate::controller::{Completion, PaginationController};
use crate::error::ControllerError;
use crate::outputs::cards::{Theme, render_articles, render_nav, render_sources};
use crate::outputs::json::{ExportedView, write_view};
use crate::prefs::{KeyValueStore, PreferenceStore};
use crate::utils::parse_date_input;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const HELP: &str = "\
Commands:
  <text>                 search for <text>
  search <text>          search for <text>
  category <name>        run one of the category searches
  source <name>|all      choose the source filter (then `apply`)
  date <YYYY-MM-DD>|any  choose the date filter (then `apply`)
  apply                  redraw with the chosen filters
  sources                list the sources in the current results
  more                   load the next page
  open <n>               show the link of article <n>
  export <path>          write the current view as JSON
  dark                   toggle dark mode
  help                   show this text
  quit                   leave";

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Category(String),
    Search(String),
    SelectSource(Option<String>),
    SelectDate(Option<NaiveDate>),
    ApplyFilters,
    ListSources,
    LoadMore,
    Open(usize),
    Export(PathBuf),
    ToggleDarkMode,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid date \"{0}\"; use YYYY-MM-DD or `any`")]
    InvalidDate(String),

    #[error("Invalid article number \"{0}\"")]
    InvalidIndex(String),
}

impl Action {
    /// Parse one input line. Blank lines yield `Ok(None)`; unrecognized text is a search.
    pub fn parse(line: &str) -> Result<Option<Action>, ActionError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let required = |name: &'static str| {
            if rest.is_empty() {
                Err(ActionError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };

        let action = match word.to_lowercase().as_str() {
            "search" | "s" => Action::Search(rest.to_string()),
            "category" | "cat" => Action::Category(required("category")?),
            "source" => {
                let name = required("source")?;
                if name.eq_ignore_ascii_case("all") {
                    Action::SelectSource(None)
                } else {
                    Action::SelectSource(Some(name))
                }
            }
            "date" => {
                let raw = required("date")?;
                if raw.eq_ignore_ascii_case("any") {
                    Action::SelectDate(None)
                } else {
                    let date = parse_date_input(&raw).ok_or(ActionError::InvalidDate(raw))?;
                    Action::SelectDate(Some(date))
                }
            }
            // Bare command words only; "exit polls" or "dark matter" is a search.
            "apply" if rest.is_empty() => Action::ApplyFilters,
            "sources" if rest.is_empty() => Action::ListSources,
            "more" | "m" if rest.is_empty() => Action::LoadMore,
            "dark" if rest.is_empty() => Action::ToggleDarkMode,
            "help" | "?" if rest.is_empty() => Action::Help,
            "quit" | "exit" | "q" if rest.is_empty() => Action::Quit,
            "open" if rest.bytes().all(|b| b.is_ascii_digit()) => {
                let raw = required("open")?;
                match raw.parse::<usize>() {
                    Ok(n) if n > 0 => Action::Open(n),
                    _ => return Err(ActionError::InvalidIndex(raw)),
                }
            }
            "export" => Action::Export(PathBuf::from(required("export")?)),
            _ => Action::Search(line.to_string()),
        };
        Ok(Some(action))
    }

    /// Actions that hit the network, for showing a loading indicator.
    pub fn fetches(&self) -> bool {
        matches!(
            self,
            Action::Category(_) | Action::Search(_) | Action::LoadMore
        )
    }
}

/// Result of handling one action.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Response {
    /// Text to draw on the main output.
    pub screen: Option<String>,
    /// Message to bring to the user's attention.
    pub notice: Option<String>,
    pub quit: bool,
}

impl Response {
    fn screen(text: impl Into<String>) -> Self {
        Self {
            screen: Some(text.into()),
            ..Default::default()
        }
    }

    fn notice(text: impl Into<String>) -> Self {
        Self {
            notice: Some(text.into()),
            ..Default::default()
        }
    }
}

/// The session: controller, news source, preferences and view flags.
pub struct App<S, K> {
    controller: PaginationController,
    source: S,
    prefs: PreferenceStore<K>,
    categories: Vec<String>,
    active_category: Option<String>,
    dark_mode: bool,
    ansi: bool,
}

impl<S: NewsSource, K: KeyValueStore> App<S, K> {
    /// Build a session; the dark-mode preference is read here, once.
    pub fn new(
        source: S,
        prefs: PreferenceStore<K>,
        page_size: u32,
        categories: Vec<String>,
        ansi: bool,
    ) -> Self {
        let dark_mode = prefs.load_dark_mode();
        debug!(dark_mode, "Loaded dark mode preference");
        Self {
            controller: PaginationController::new(page_size),
            source,
            prefs,
            categories,
            active_category: None,
            dark_mode,
            ansi,
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    #[cfg(test)]
    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    #[cfg(test)]
    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    fn theme(&self) -> Theme {
        Theme::new(self.dark_mode, self.ansi)
    }

    /// Initial query: the saved one, else `default_query`.
    pub fn initial_query(&self, default_query: &str) -> String {
        let last = self.prefs.load_last_query();
        if last.trim().is_empty() {
            default_query.to_string()
        } else {
            last
        }
    }

    /// Run the first search of the session.
    pub async fn start(&mut self, default_query: &str) -> Response {
        let query = self.initial_query(default_query);
        self.active_category = self.categories.iter().find(|c| **c == query).cloned();
        info!(%query, category = ?self.active_category, "Starting session");
        self.run_search(&query).await
    }

    pub async fn handle(&mut self, action: Action) -> Response {
        debug!(?action, "Handling action");
        match action {
            Action::Category(name) => {
                let Some(category) = self
                    .categories
                    .iter()
                    .find(|c| c.eq_ignore_ascii_case(&name))
                    .cloned()
                else {
                    return Response::notice(format!(
                        "Unknown category \"{name}\". Available: {}",
                        self.categories.join(", ")
                    ));
                };
                self.active_category = Some(category.clone());
                self.save_last_query(&category);
                self.run_search(&category).await
            }
            Action::Search(text) => {
                let query = text.trim();
                if query.is_empty() {
                    return Response::notice(ControllerError::EmptyQuery.to_string());
                }
                self.active_category = None;
                self.save_last_query(query);
                self.run_search(query).await
            }
            Action::SelectSource(source) => {
                if let Some(name) = &source {
                    if !self.controller.sources().contains(name) {
                        return Response::notice(format!(
                            "Unknown source \"{name}\". Type `sources` to list them."
                        ));
                    }
                }
                let label = source.clone().unwrap_or_else(|| "All Sources".to_string());
                self.controller.set_source_filter(source);
                Response::screen(format!("Source filter: {label} (type `apply` to refresh)"))
            }
            Action::SelectDate(date) => {
                let label = date.map(|d| d.to_string()).unwrap_or_else(|| "any date".to_string());
                self.controller.set_date_filter(date);
                Response::screen(format!("Date filter: {label} (type `apply` to refresh)"))
            }
            Action::ApplyFilters => Response::screen(self.render()),
            Action::ListSources => Response::screen(render_sources(
                self.controller.sources(),
                self.controller.filters().source_name.as_deref(),
            )),
            Action::LoadMore => {
                let done = self.controller.load_more(&self.source).await;
                self.respond(done)
            }
            Action::Open(n) => {
                let visible = self.controller.visible();
                match n.checked_sub(1).and_then(|i| visible.get(i)) {
                    Some(article) => Response::screen(format!("Open: {}", article.url)),
                    None => Response::notice(format!("No article number {n} in the current view.")),
                }
            }
            Action::Export(path) => self.export(path).await,
            Action::ToggleDarkMode => {
                self.dark_mode = !self.dark_mode;
                if let Err(e) = self.prefs.save_dark_mode(self.dark_mode) {
                    warn!(error = %e, "Failed to save dark mode preference");
                }
                let theme = self.theme();
                Response::screen(render_nav(
                    &self.categories,
                    self.active_category.as_deref(),
                    &theme,
                ))
            }
            Action::Help => Response::screen(HELP),
            Action::Quit => Response {
                quit: true,
                ..Default::default()
            },
        }
    }

    fn save_last_query(&mut self, query: &str) {
        if let Err(e) = self.prefs.save_last_query(query) {
            warn!(error = %e, "Failed to save last query");
        }
    }

    async fn run_search(&mut self, query: &str) -> Response {
        match self.controller.start_search(&self.source, query).await {
            Ok(done) => self.respond(done),
            Err(e) => Response::notice(e.to_string()),
        }
    }

    fn respond(&self, done: Completion) -> Response {
        debug!(
            phase = ?self.controller.phase(),
            cached = self.controller.cache().len(),
            "Fetch finished"
        );
        match done {
            Completion::Applied => Response::screen(self.render()),
            Completion::Failed(e) => Response::notice(e.to_string()),
            Completion::Stale => Response::default(),
            Completion::NoMorePages => Response::notice("No more articles to load."),
        }
    }

    /// Navigation bar plus the filtered cards.
    pub fn render(&self) -> String {
        let theme = self.theme();
        let visible = self.controller.visible();
        // An empty filtered view never offers more pages.
        let has_more = !visible.is_empty() && self.controller.has_more();
        format!(
            "{}\n\n{}",
            render_nav(&self.categories, self.active_category.as_deref(), &theme),
            render_articles(&visible, has_more, &theme)
        )
    }

    async fn export(&self, path: PathBuf) -> Response {
        let visible = self.controller.visible();
        let view = ExportedView::new(
            &self.controller.search().query,
            self.controller.filters(),
            &visible,
        );
        match write_view(&view, &path).await {
            Ok(()) => Response::screen(format!(
                "Exported {} articles to {}",
                visible.len(),
                path.display()
            )),
            Err(e) => Response::notice(format!("Export failed: {e}")),
        }
    }
}
