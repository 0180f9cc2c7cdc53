//! View state of the browsing client.
//!
//! Every transition here is synchronous. Intents (`select_genre`,
//! `submit_search`, `next_page`, `open_movie`) return a request ticket; the
//! caller performs the fetch and hands the outcome back through `apply_*` or
//! `fail_*`. Tickets carry a sequence number so a completion that has been
//! superseded by a newer request of the same kind is dropped instead of
//! overwriting the list or overlay out of order.

use tracing::debug;

use crate::tmdb::{Genre, MovieDetail, MoviePage, MovieSummary};

/// Distance in rows/pixels from the bottom that counts as "near the end".
pub const SCROLL_THRESHOLD: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Popular,
    Genre(i32),
    Search(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub seq: u64,
    pub listing: Listing,
    pub page: u32,
}

/// Filter and pagination the current list was loaded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pagination {
    selected_genre: Option<i32>,
    page: u32,
    has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub seq: u64,
    pub movie_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub viewport_height: u32,
    pub scroll_offset: u32,
    pub content_height: u32,
}

impl ScrollMetrics {
    pub fn near_bottom(&self) -> bool {
        self.viewport_height.saturating_add(self.scroll_offset)
            >= self.content_height.saturating_sub(SCROLL_THRESHOLD)
    }
}

#[derive(Debug, Clone)]
pub struct BrowserState {
    movies: Vec<MovieSummary>,
    genres: Vec<Genre>,
    query: String,
    selected_genre: Option<i32>,
    page: u32,
    has_more: bool,
    theme: Theme,
    selected: Option<MovieSummary>,
    detail: Option<MovieDetail>,
    modal_open: bool,
    list_seq: u64,
    list_pending: bool,
    committed: Pagination,
    detail_seq: u64,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self {
            movies: Vec::new(),
            genres: Vec::new(),
            query: String::new(),
            selected_genre: None,
            page: 1,
            has_more: true,
            theme: Theme::Dark,
            selected: None,
            detail: None,
            modal_open: false,
            list_seq: 0,
            list_pending: false,
            committed: Pagination {
                selected_genre: None,
                page: 1,
                has_more: true,
            },
            detail_seq: 0,
        }
    }
}

impl BrowserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_genre(&self) -> Option<i32> {
        self.selected_genre
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn selected(&self) -> Option<&MovieSummary> {
        self.selected.as_ref()
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.detail.as_ref()
    }

    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    /// The overlay renders only once detail data has arrived.
    pub fn overlay_visible(&self) -> bool {
        self.modal_open && self.detail.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.list_pending
    }

    pub fn genre_name(&self, id: i32) -> Option<&str> {
        self.genres
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.as_str())
    }

    /// Listing for the active genre filter, ignoring any search text.
    pub fn filter_listing(&self) -> Listing {
        match self.selected_genre {
            Some(id) => Listing::Genre(id),
            None => Listing::Popular,
        }
    }

    pub fn set_genres(&mut self, genres: Vec<Genre>) {
        self.genres = genres;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    fn pagination(&self) -> Pagination {
        Pagination {
            selected_genre: self.selected_genre,
            page: self.page,
            has_more: self.has_more,
        }
    }

    pub fn request_page(&mut self, listing: Listing, page: u32) -> ListRequest {
        self.list_seq += 1;
        self.list_pending = true;
        ListRequest {
            seq: self.list_seq,
            listing,
            page,
        }
    }

    /// Pagination resets before the fetch; a failed fetch puts it back.
    pub fn select_genre(&mut self, genre: Option<i32>) -> ListRequest {
        self.selected_genre = genre;
        self.page = 1;
        self.has_more = true;
        let listing = self.filter_listing();
        self.request_page(listing, 1)
    }

    /// Empty text falls back to page 1 of the active filter.
    pub fn submit_search(&mut self) -> ListRequest {
        let text = self.query.trim();
        if text.is_empty() {
            let listing = self.filter_listing();
            return self.request_page(listing, 1);
        }
        let listing = Listing::Search(text.to_string());
        self.request_page(listing, 1)
    }

    /// Next page of the active filter, unless the list is exhausted or a list
    /// request is still in flight.
    pub fn next_page(&mut self) -> Option<ListRequest> {
        if !self.has_more || self.list_pending {
            return None;
        }
        let listing = self.filter_listing();
        let page = self.page + 1;
        Some(self.request_page(listing, page))
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<ListRequest> {
        if !self.has_more || !metrics.near_bottom() {
            return None;
        }
        self.next_page()
    }

    fn is_current_list(&self, req: &ListRequest) -> bool {
        req.seq == self.list_seq
    }

    /// Returns false when the completion was stale and ignored.
    pub fn apply_page(&mut self, req: &ListRequest, response: MoviePage) -> bool {
        if !self.is_current_list(req) {
            debug!(
                "Dropping stale page {} for {:?} (seq {} < {})",
                req.page, req.listing, req.seq, self.list_seq
            );
            return false;
        }
        self.list_pending = false;

        if let Listing::Search(_) = req.listing {
            self.movies = response.results;
            self.has_more = false;
            self.committed = self.pagination();
            return true;
        }

        if req.page <= 1 {
            self.movies = response.results;
        } else {
            self.movies.extend(response.results);
        }
        self.has_more = response.page < response.total_pages;
        self.page = req.page;
        self.committed = self.pagination();
        debug!(
            "Applied page {} of {} for {:?} ({} movies)",
            response.page,
            response.total_pages,
            req.listing,
            self.movies.len()
        );
        true
    }

    /// Restores the filter and pagination the list was loaded under.
    pub fn fail_page(&mut self, req: &ListRequest) {
        if !self.is_current_list(req) {
            return;
        }
        self.list_pending = false;
        self.selected_genre = self.committed.selected_genre;
        self.page = self.committed.page;
        self.has_more = self.committed.has_more;
    }

    pub fn open_movie(&mut self, movie: MovieSummary) -> DetailRequest {
        self.detail_seq += 1;
        let movie_id = movie.id;
        self.selected = Some(movie);
        self.detail = None;
        self.modal_open = true;
        DetailRequest {
            seq: self.detail_seq,
            movie_id,
        }
    }

    pub fn apply_detail(&mut self, req: &DetailRequest, detail: MovieDetail) -> bool {
        if req.seq != self.detail_seq || !self.modal_open {
            debug!("Dropping stale detail for movie {}", req.movie_id);
            return false;
        }
        self.detail = Some(detail);
        true
    }

    pub fn fail_detail(&mut self, req: &DetailRequest) {
        if req.seq == self.detail_seq {
            self.close_movie();
        }
    }

    /// Also invalidates any detail fetch still in flight.
    pub fn close_movie(&mut self) {
        self.detail_seq += 1;
        self.modal_open = false;
        self.detail = None;
        self.selected = None;
    }
}
