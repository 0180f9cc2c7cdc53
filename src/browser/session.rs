use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::state::{BrowserState, DetailRequest, ListRequest, Listing, ScrollMetrics, Theme};
use crate::tmdb::{MovieDetail, MoviePage, TmdbApi};

/// Drives a [`BrowserState`] against the catalog, one intent at a time.
pub struct Browser {
    api: Arc<dyn TmdbApi>,
    state: BrowserState,
}

impl Browser {
    pub fn new(api: Arc<dyn TmdbApi>) -> Self {
        Self {
            api,
            state: BrowserState::new(),
        }
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    /// Genre list, then the first page of popular movies.
    pub async fn start(&mut self) -> Result<()> {
        self.load_genres().await?;
        let req = self.state.request_page(Listing::Popular, 1);
        self.run_list(req).await
    }

    pub async fn load_genres(&mut self) -> Result<()> {
        let genres = self
            .api
            .genres()
            .await
            .context("Failed to load genre list")?;
        info!("Loaded {} genres", genres.len());
        self.state.set_genres(genres);
        Ok(())
    }

    pub async fn load_page(&mut self, listing: Listing, page: u32) -> Result<()> {
        let req = self.state.request_page(listing, page);
        self.run_list(req).await
    }

    pub async fn select_genre(&mut self, genre: Option<i32>) -> Result<()> {
        let req = self.state.select_genre(genre);
        self.run_list(req).await
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.set_query(query);
    }

    pub async fn submit_search(&mut self) -> Result<()> {
        let req = self.state.submit_search();
        self.run_list(req).await
    }

    /// Returns whether a new page was requested.
    pub async fn on_scroll(&mut self, metrics: ScrollMetrics) -> Result<bool> {
        match self.state.on_scroll(metrics) {
            Some(req) => self.run_list(req).await.map(|_| true),
            None => Ok(false),
        }
    }

    pub async fn load_more(&mut self) -> Result<bool> {
        match self.state.next_page() {
            Some(req) => self.run_list(req).await.map(|_| true),
            None => Ok(false),
        }
    }

    pub async fn open_movie(&mut self, movie_id: i32) -> Result<()> {
        let movie = self
            .state
            .movies()
            .iter()
            .find(|m| m.id == movie_id)
            .cloned()
            .ok_or_else(|| anyhow!("Movie {} is not in the current list", movie_id))?;
        let req = self.state.open_movie(movie);
        match fetch_detail(self.api.as_ref(), &req).await {
            Ok(detail) => {
                self.state.apply_detail(&req, detail);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load detail for movie {}: {:#}", movie_id, e);
                self.state.fail_detail(&req);
                Err(e)
            }
        }
    }

    pub fn close_movie(&mut self) {
        self.state.close_movie();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.state.toggle_theme()
    }

    async fn run_list(&mut self, req: ListRequest) -> Result<()> {
        debug!("Fetching page {} for {:?}", req.page, req.listing);
        match fetch_listing(self.api.as_ref(), &req).await {
            Ok(page) => {
                self.state.apply_page(&req, page);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Failed to load page {} for {:?}: {:#}",
                    req.page, req.listing, e
                );
                self.state.fail_page(&req);
                Err(e)
            }
        }
    }
}

pub async fn fetch_listing(api: &dyn TmdbApi, req: &ListRequest) -> Result<MoviePage> {
    match &req.listing {
        Listing::Popular => api
            .popular(req.page)
            .await
            .with_context(|| format!("Failed to load popular movies page {}", req.page)),
        Listing::Genre(id) => api
            .discover_by_genre(*id, req.page)
            .await
            .with_context(|| format!("Failed to load genre {} page {}", id, req.page)),
        Listing::Search(query) => api
            .search(query)
            .await
            .with_context(|| format!("Failed to search movies for '{}'", query)),
    }
}

/// Detail, credits and videos are fetched concurrently and merged.
pub async fn fetch_detail(api: &dyn TmdbApi, req: &DetailRequest) -> Result<MovieDetail> {
    let id = req.movie_id;
    let (detail, credits, videos) = tokio::try_join!(
        api.movie_detail(id),
        api.movie_credits(id),
        api.movie_videos(id),
    )
    .with_context(|| format!("Failed to load details for movie {}", id))?;
    Ok(MovieDetail::merge(detail, &credits, &videos))
}
