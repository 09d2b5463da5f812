// Catalog client: read-only queries against the movie catalog service.
//
// Every request carries the same query contract, in this order:
// `api_key`, `language`, `page` (paged endpoints only), then any
// endpoint-specific parameters. The key is resolved before the URL is
// built, so no request ever leaves without one.
//
// Each call returns exactly one page. Walking further pages is up to the
// caller (`MoviePage::has_next`).

mod transport;
mod types;

pub use transport::{CatalogTransport, HttpTransport};
#[cfg(test)]
pub use transport::MockCatalogTransport;
pub use types::{Genre, Movie, MovieDetail, MoviePage};

use crate::resolver::{ApiKeyResolver, MissingApiKey};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use types::GenreList;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "ko-KR";
pub const DEFAULT_PAGE: u32 = 1;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    MissingApiKey(#[from] MissingApiKey),

    #[error("invalid catalog url: {0}")]
    InvalidUrl(String),

    #[error("catalog request failed: {0}")]
    Transport(String),

    #[error("catalog request timed out: {0}")]
    Timeout(String),

    #[error("catalog returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid catalog response: {0}")]
    Decode(String),
}

pub struct CatalogClient<T = HttpTransport> {
    transport: T,
    resolver: ApiKeyResolver,
    base_url: Url,
    language: String,
}

impl<T: CatalogTransport> CatalogClient<T> {
    pub fn new(transport: T, resolver: ApiKeyResolver, base_url: Url, language: &str) -> Self {
        Self {
            transport,
            resolver,
            base_url,
            language: language.to_string(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// `GET /movie/popular`
    pub fn popular(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.fetch("/movie/popular", Some(page), &[])
    }

    /// `GET /movie/now_playing`
    pub fn now_playing(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.fetch("/movie/now_playing", Some(page), &[])
    }

    /// `GET /discover/movie` with a filter such as `&with_genres=28`.
    ///
    /// The filter is split into pairs and re-encoded, so raw user input
    /// cannot inject extra query syntax.
    pub fn discover(&self, filter: &str, page: u32) -> Result<MoviePage, CatalogError> {
        let extra = parse_filter(filter);
        self.fetch("/discover/movie", Some(page), &extra)
    }

    /// `GET /search/movie?query=...`
    pub fn search(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        let extra = [("query".to_string(), query.to_string())];
        self.fetch("/search/movie", Some(page), &extra)
    }

    /// `GET /genre/movie/list`, unwrapped to the flat genre list.
    pub fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let list: GenreList = self.fetch("/genre/movie/list", None, &[])?;
        Ok(list.genres)
    }

    /// `GET /movie/{id}`
    pub fn movie_detail(&self, id: u64) -> Result<MovieDetail, CatalogError> {
        self.fetch(&format!("/movie/{id}"), None, &[])
    }

    /// Build the full request URL for `path`.
    ///
    /// A `page` of 0 is sent as 1.
    pub fn build_query(
        &self,
        path: &str,
        page: Option<u32>,
        extra: &[(String, String)],
    ) -> Result<Url, CatalogError> {
        let key = self.resolver.resolve()?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair("api_key", &key);
            query.append_pair("language", &self.language);
            if let Some(page) = page {
                query.append_pair("page", &page.max(DEFAULT_PAGE).to_string());
            }
            for (name, value) in extra {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn fetch<R: DeserializeOwned>(
        &self,
        path: &str,
        page: Option<u32>,
        extra: &[(String, String)],
    ) -> Result<R, CatalogError> {
        let url = self.build_query(path, page, extra)?;
        debug!(path, ?page, "catalog request");
        let body = self.transport.get(&url)?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Split a `&name=value&...` fragment into decoded pairs.
fn parse_filter(filter: &str) -> Vec<(String, String)> {
    let trimmed = filter.trim().trim_start_matches(|c: char| c == '?' || c == '&');
    url::form_urlencoded::parse(trimmed.as_bytes())
        .into_owned()
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
