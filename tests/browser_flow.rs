use cinestream::browser::{Browser, ScrollMetrics, Theme};
use cinestream::tmdb::{
    Credits, Genre, MovieDetailResponse, MoviePage, MovieSummary, TmdbApi, Videos,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

const TOTAL_PAGES: u32 = 3;

/// Catalog with three popular pages (ids 100+), three pages per genre
/// (ids genre*1000+), and a two-result search.
struct FakeCatalog {
    calls: Mutex<Vec<String>>,
    fail_videos: bool,
    fail_search: bool,
    fail_genre: bool,
    trailer: bool,
}

impl FakeCatalog {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_videos: false,
            fail_search: false,
            fail_genre: false,
            trailer: true,
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn summary(id: i32) -> MovieSummary {
    MovieSummary {
        id,
        title: format!("Movie {id}"),
        poster_path: Some(format!("/{id}.jpg")),
        release_date: Some("2024-05-01".to_string()),
        overview: Some("Overview".to_string()),
        genre_ids: vec![],
    }
}

fn page_of(base: i32, page: u32) -> MoviePage {
    let start = base + (page as i32 - 1) * 2;
    MoviePage {
        page,
        results: vec![summary(start), summary(start + 1)],
        total_pages: TOTAL_PAGES,
        total_results: TOTAL_PAGES * 2,
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeCatalog {
    async fn genres(&self) -> anyhow::Result<Vec<Genre>> {
        self.record("genres".to_string());
        Ok(vec![
            Genre {
                id: 28,
                name: "Action".to_string(),
            },
            Genre {
                id: 35,
                name: "Comedy".to_string(),
            },
        ])
    }

    async fn popular(&self, page: u32) -> anyhow::Result<MoviePage> {
        self.record(format!("popular:{page}"));
        Ok(page_of(100, page))
    }

    async fn discover_by_genre(&self, genre_id: i32, page: u32) -> anyhow::Result<MoviePage> {
        self.record(format!("genre:{genre_id}:{page}"));
        if self.fail_genre {
            return Err(anyhow::anyhow!("discover upstream down"));
        }
        Ok(page_of(genre_id * 1000, page))
    }

    async fn search(&self, query: &str) -> anyhow::Result<MoviePage> {
        self.record(format!("search:{query}"));
        if self.fail_search {
            return Err(anyhow::anyhow!("search upstream down"));
        }
        Ok(MoviePage {
            page: 1,
            results: vec![summary(7), summary(8)],
            total_pages: 5,
            total_results: 90,
        })
    }

    async fn movie_detail(&self, id: i32) -> anyhow::Result<MovieDetailResponse> {
        self.record(format!("detail:{id}"));
        Ok(serde_json::from_value(json!({
            "id": id,
            "title": format!("Movie {id}"),
            "overview": "Full overview",
            "release_date": "2024-05-01",
            "vote_average": 7.5,
            "genres": [{ "id": 28, "name": "Action" }, { "id": 35, "name": "Comedy" }]
        }))?)
    }

    async fn movie_credits(&self, id: i32) -> anyhow::Result<Credits> {
        self.record(format!("credits:{id}"));
        let cast: Vec<_> = (1..=7).map(|i| json!({ "name": format!("Cast {i}") })).collect();
        Ok(serde_json::from_value(json!({ "cast": cast }))?)
    }

    async fn movie_videos(&self, id: i32) -> anyhow::Result<Videos> {
        self.record(format!("videos:{id}"));
        if self.fail_videos {
            return Err(anyhow::anyhow!("videos upstream down"));
        }
        let results = if self.trailer {
            json!([
                { "site": "YouTube", "type": "Clip", "key": "clip" },
                { "site": "YouTube", "type": "Trailer", "key": "trailer-key", "name": "Official" }
            ])
        } else {
            json!([{ "site": "YouTube", "type": "Teaser", "key": "teaser" }])
        };
        Ok(serde_json::from_value(json!({ "results": results }))?)
    }
}

fn ids(browser: &Browser) -> Vec<i32> {
    browser.state().movies().iter().map(|m| m.id).collect()
}

async fn started(catalog: FakeCatalog) -> (Browser, Arc<FakeCatalog>) {
    let catalog = Arc::new(catalog);
    let mut browser = Browser::new(catalog.clone());
    browser.start().await.expect("start");
    (browser, catalog)
}

const BOTTOM: ScrollMetrics = ScrollMetrics {
    viewport_height: 900,
    scroll_offset: 1000,
    content_height: 1950,
};

#[tokio::test]
async fn start_loads_genres_and_first_popular_page() {
    let (browser, catalog) = started(FakeCatalog::new()).await;
    assert_eq!(catalog.calls(), vec!["genres", "popular:1"]);
    assert_eq!(browser.state().genres().len(), 2);
    assert_eq!(ids(&browser), vec![100, 101]);
    assert_eq!(browser.state().page(), 1);
    assert!(browser.state().has_more());
}

#[tokio::test]
async fn scrolling_appends_until_last_page() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;

    assert!(browser.on_scroll(BOTTOM).await.unwrap());
    assert_eq!(ids(&browser), vec![100, 101, 102, 103]);
    assert!(browser.state().has_more());

    assert!(browser.on_scroll(BOTTOM).await.unwrap());
    assert_eq!(browser.state().page(), 3);
    assert!(!browser.state().has_more());

    assert!(!browser.on_scroll(BOTTOM).await.unwrap());
    assert_eq!(
        catalog.calls(),
        vec!["genres", "popular:1", "popular:2", "popular:3"]
    );
}

#[tokio::test]
async fn scrolling_away_from_bottom_does_nothing() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;
    let top = ScrollMetrics {
        viewport_height: 900,
        scroll_offset: 0,
        content_height: 1950,
    };
    assert!(!browser.on_scroll(top).await.unwrap());
    assert_eq!(catalog.calls().len(), 2);
}

#[tokio::test]
async fn genre_change_replaces_list_and_scrolls_within_genre() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;
    browser.load_more().await.unwrap();
    browser.load_more().await.unwrap();
    assert!(!browser.state().has_more());

    browser.select_genre(Some(28)).await.unwrap();
    assert_eq!(browser.state().selected_genre(), Some(28));
    assert_eq!(ids(&browser), vec![28000, 28001]);
    assert_eq!(browser.state().page(), 1);
    assert!(browser.state().has_more());

    browser.on_scroll(BOTTOM).await.unwrap();
    assert_eq!(ids(&browser), vec![28000, 28001, 28002, 28003]);
    assert_eq!(
        catalog.calls()[catalog.calls().len() - 2..],
        ["genre:28:1".to_string(), "genre:28:2".to_string()]
    );

    browser.select_genre(None).await.unwrap();
    assert_eq!(ids(&browser), vec![100, 101]);
}

#[tokio::test]
async fn non_empty_search_replaces_list_and_disables_paging() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;
    browser.set_query("alien");
    browser.submit_search().await.unwrap();

    assert_eq!(ids(&browser), vec![7, 8]);
    assert!(!browser.state().has_more());
    assert!(!browser.on_scroll(BOTTOM).await.unwrap());
    assert!(!browser.load_more().await.unwrap());
    assert_eq!(catalog.calls().last().map(String::as_str), Some("search:alien"));
}

#[tokio::test]
async fn empty_search_falls_back_to_active_genre() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;
    browser.select_genre(Some(35)).await.unwrap();
    browser.set_query("alien");
    browser.submit_search().await.unwrap();
    assert_eq!(ids(&browser), vec![7, 8]);

    browser.set_query("");
    browser.submit_search().await.unwrap();
    assert_eq!(ids(&browser), vec![35000, 35001]);
    assert!(browser.state().has_more());
    assert_eq!(catalog.calls().last().map(String::as_str), Some("genre:35:1"));
}

#[tokio::test]
async fn empty_search_without_genre_returns_to_popular() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;
    browser.load_more().await.unwrap();
    browser.set_query("   ");
    browser.submit_search().await.unwrap();
    assert_eq!(ids(&browser), vec![100, 101]);
    assert_eq!(catalog.calls().last().map(String::as_str), Some("popular:1"));
}

#[tokio::test]
async fn failed_search_keeps_previous_list() {
    let mut catalog = FakeCatalog::new();
    catalog.fail_search = true;
    let (mut browser, _catalog) = started(catalog).await;

    browser.set_query("alien");
    assert!(browser.submit_search().await.is_err());
    assert_eq!(ids(&browser), vec![100, 101]);
    assert!(browser.state().has_more());
    assert!(!browser.state().is_loading());
    assert!(browser.load_more().await.unwrap());
}

#[tokio::test]
async fn failed_genre_switch_keeps_popular_pagination() {
    let mut catalog = FakeCatalog::new();
    catalog.fail_genre = true;
    let (mut browser, catalog) = started(catalog).await;
    browser.load_more().await.unwrap();

    assert!(browser.select_genre(Some(28)).await.is_err());
    assert_eq!(browser.state().selected_genre(), None);
    assert_eq!(browser.state().page(), 2);
    assert_eq!(ids(&browser), vec![100, 101, 102, 103]);

    assert!(browser.load_more().await.unwrap());
    assert_eq!(ids(&browser), vec![100, 101, 102, 103, 104, 105]);
    assert_eq!(catalog.calls().last().map(String::as_str), Some("popular:3"));
}

#[tokio::test]
async fn opening_movie_merges_detail_cast_and_trailer() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;
    browser.open_movie(101).await.unwrap();

    let state = browser.state();
    assert!(state.overlay_visible());
    assert_eq!(state.selected().map(|m| m.id), Some(101));
    let detail = state.detail().expect("detail loaded");
    assert_eq!(detail.title, "Movie 101");
    assert_eq!(detail.genres, vec!["Action", "Comedy"]);
    assert_eq!(
        detail.cast,
        vec!["Cast 1", "Cast 2", "Cast 3", "Cast 4", "Cast 5"]
    );
    assert_eq!(
        detail.trailer.as_ref().map(|t| t.key.as_str()),
        Some("trailer-key")
    );

    let calls = catalog.calls();
    for expected in ["detail:101", "credits:101", "videos:101"] {
        assert!(calls.iter().any(|c| c == expected), "missing {expected}");
    }

    browser.close_movie();
    assert!(!browser.state().modal_open());
    assert!(browser.state().detail().is_none());
    assert!(browser.state().selected().is_none());
}

#[tokio::test]
async fn opening_movie_without_trailer_omits_it() {
    let mut catalog = FakeCatalog::new();
    catalog.trailer = false;
    let (mut browser, _catalog) = started(catalog).await;
    browser.open_movie(100).await.unwrap();
    let detail = browser.state().detail().expect("detail loaded");
    assert!(detail.trailer.is_none());
}

#[tokio::test]
async fn failed_detail_closes_overlay() {
    let mut catalog = FakeCatalog::new();
    catalog.fail_videos = true;
    let (mut browser, _catalog) = started(catalog).await;

    assert!(browser.open_movie(100).await.is_err());
    assert!(!browser.state().modal_open());
    assert!(browser.state().detail().is_none());
}

#[tokio::test]
async fn opening_unknown_movie_is_an_error() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;
    assert!(browser.open_movie(999).await.is_err());
    assert!(!browser.state().modal_open());
    assert_eq!(catalog.calls().len(), 2);
}

#[tokio::test]
async fn theme_toggle_is_local_only() {
    let (mut browser, catalog) = started(FakeCatalog::new()).await;
    assert_eq!(browser.toggle_theme(), Theme::Light);
    assert_eq!(browser.state().theme(), Theme::Light);
    assert_eq!(browser.toggle_theme(), Theme::Dark);
    assert_eq!(catalog.calls().len(), 2);
}
