use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{ClientConfig, RelayConfig};

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const MOVIE_PAGE_BASE: &str = "https://www.themoviedb.org/movie";
pub const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed";
pub const CAST_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Typed catalog access used by the browsing client.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn genres(&self) -> Result<Vec<Genre>>;
    async fn popular(&self, page: u32) -> Result<MoviePage>;
    async fn discover_by_genre(&self, genre_id: i32, page: u32) -> Result<MoviePage>;
    async fn search(&self, query: &str) -> Result<MoviePage>;
    async fn movie_detail(&self, id: i32) -> Result<MovieDetailResponse>;
    async fn movie_credits(&self, id: i32) -> Result<Credits>;
    async fn movie_videos(&self, id: i32) -> Result<Videos>;
}

/// Untyped passthrough used by the relay: the body is never parsed.
#[async_trait]
pub trait RelayUpstream: Send + Sync {
    async fn popular_raw(&self) -> Result<UpstreamResponse>;
    async fn search_raw(&self, query: &str) -> Result<UpstreamResponse>;
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoviePage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetailResponse {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastMember {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub video_type: String,
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trailer {
    pub key: String,
    pub name: String,
}

impl Trailer {
    pub fn embed_url(&self) -> String {
        format!("{YOUTUBE_EMBED_BASE}/{}", self.key)
    }
}

/// Detail overlay model: detail fields plus cast and trailer.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub id: i32,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f32,
    pub poster_path: Option<String>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub trailer: Option<Trailer>,
}

impl MovieDetail {
    pub fn merge(detail: MovieDetailResponse, credits: &Credits, videos: &Videos) -> Self {
        Self {
            id: detail.id,
            title: detail.title,
            overview: detail.overview,
            release_date: detail.release_date,
            vote_average: detail.vote_average,
            poster_path: detail.poster_path,
            genres: names(&detail.genres),
            cast: top_names(&credits.cast, CAST_LIMIT),
            trailer: select_trailer(videos),
        }
    }

    pub fn tmdb_page(&self) -> String {
        format!("{MOVIE_PAGE_BASE}/{}", self.id)
    }
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let user_agent = format!("cinestream/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    pub fn for_relay(config: &RelayConfig) -> Result<Self> {
        Self::new(&config.tmdb_api_key, &config.tmdb_base_url)
    }

    pub fn for_client(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.tmdb_api_key, &config.tmdb_base_url)
    }

    /// Builds `{base}{path}?api_key=..&k=v..`, URL-encoding every parameter value.
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{}?api_key={}",
            self.base_url,
            path,
            urlencoding::encode(&self.api_key)
        );
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            return url.to_string();
        }
        url.replace(&*urlencoding::encode(&self.api_key), "***")
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let res = self.get_raw(url).await?;
        let parsed: T = serde_json::from_slice(&res.body).context("JSON parse failed")?;
        Ok(parsed)
    }

    async fn get_raw(&self, url: &str) -> Result<UpstreamResponse> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("request to {} failed", self.redact(url)))?;
        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| e.without_url())
            .context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!(
                "{} -> {} {}",
                self.redact(url),
                status,
                String::from_utf8_lossy(&body)
            ));
        }
        Ok(UpstreamResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn genres(&self) -> Result<Vec<Genre>> {
        #[derive(Deserialize)]
        struct GenreList {
            genres: Vec<Genre>,
        }

        let url = self.endpoint("/genre/movie/list", &[]);
        let data: GenreList = self.get_json(&url).await?;
        Ok(data.genres)
    }

    async fn popular(&self, page: u32) -> Result<MoviePage> {
        let page = page.to_string();
        let url = self.endpoint("/movie/popular", &[("page", &page)]);
        self.get_json(&url).await
    }

    async fn discover_by_genre(&self, genre_id: i32, page: u32) -> Result<MoviePage> {
        let genre = genre_id.to_string();
        let page = page.to_string();
        let url = self.endpoint(
            "/discover/movie",
            &[("with_genres", &genre), ("page", &page)],
        );
        self.get_json(&url).await
    }

    async fn search(&self, query: &str) -> Result<MoviePage> {
        let url = self.endpoint("/search/movie", &[("query", query)]);
        self.get_json(&url).await
    }

    async fn movie_detail(&self, id: i32) -> Result<MovieDetailResponse> {
        let url = self.endpoint(&format!("/movie/{id}"), &[]);
        self.get_json(&url).await
    }

    async fn movie_credits(&self, id: i32) -> Result<Credits> {
        let url = self.endpoint(&format!("/movie/{id}/credits"), &[]);
        self.get_json(&url).await
    }

    async fn movie_videos(&self, id: i32) -> Result<Videos> {
        let url = self.endpoint(&format!("/movie/{id}/videos"), &[]);
        self.get_json(&url).await
    }
}

#[async_trait]
impl RelayUpstream for TmdbClient {
    async fn popular_raw(&self) -> Result<UpstreamResponse> {
        let url = self.endpoint("/movie/popular", &[]);
        self.get_raw(&url).await
    }

    async fn search_raw(&self, query: &str) -> Result<UpstreamResponse> {
        let url = self.endpoint("/search/movie", &[("query", query)]);
        self.get_raw(&url).await
    }
}

pub fn poster_url(path: &str) -> String {
    format!("{POSTER_BASE}{path}")
}

fn top_names(list: &[CastMember], max: usize) -> Vec<String> {
    list.iter().take(max).map(|c| c.name.clone()).collect()
}

fn names(genres: &[Genre]) -> Vec<String> {
    genres.iter().map(|g| g.name.clone()).collect()
}

fn select_trailer(videos: &Videos) -> Option<Trailer> {
    videos
        .results
        .iter()
        .find(|v| v.site == "YouTube" && v.video_type == "Trailer")
        .map(|v| Trailer {
            key: v.key.clone(),
            name: v.name.clone(),
        })
}
