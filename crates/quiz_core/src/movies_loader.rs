//! External movie catalog: wire model and the HTTP loader.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{domain::Movie, error::QuizError};
use url::Url;

const RESIZED_POSTER_SUFFIX: &str = "._V0_UX600_.jpg";
const POSTER_VARIANT_MARKER: &str = "._V1_";

#[async_trait]
pub trait MoviesLoading: Send + Sync {
    async fn load_movies(&self) -> Result<Vec<Movie>, QuizError>;
    async fn load_poster(&self, image_url: &str) -> Result<Vec<u8>, QuizError>;
}

#[derive(Debug, Deserialize)]
struct MostPopularMovies {
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
    #[serde(default)]
    items: Vec<MostPopularMovie>,
}

#[derive(Debug, Deserialize)]
struct MostPopularMovie {
    title: String,
    #[serde(rename = "imDbRating", default)]
    rating: Option<String>,
    #[serde(rename = "image", default)]
    image_url: String,
}

impl From<MostPopularMovie> for Movie {
    fn from(value: MostPopularMovie) -> Self {
        let rating = value
            .rating
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f32>().ok())
            .filter(|rating| rating.is_finite())
            .unwrap_or(0.0);
        Movie {
            title: value.title,
            rating,
            image_url: resized_poster_url(&value.image_url),
        }
    }
}

/// Asks the image CDN for a 600px rendition instead of the full-size poster.
pub fn resized_poster_url(image_url: &str) -> String {
    match image_url.split_once(POSTER_VARIANT_MARKER) {
        Some((base, _)) => format!("{base}{RESIZED_POSTER_SUFFIX}"),
        None => image_url.to_string(),
    }
}

pub fn parse_catalog(body: &[u8]) -> Result<Vec<Movie>, QuizError> {
    let payload: MostPopularMovies = serde_json::from_slice(body)
        .map_err(|err| QuizError::MalformedResponse(err.to_string()))?;

    if let Some(message) = payload
        .error_message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
    {
        return Err(QuizError::SourceRejected(message.to_string()));
    }

    Ok(payload.items.into_iter().map(Movie::from).collect())
}

pub struct HttpMoviesLoader {
    http: Client,
    endpoint: Url,
}

impl HttpMoviesLoader {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, QuizError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| QuizError::Transport(err.to_string()))?;
        Ok(Self { http, endpoint })
    }

    /// The upstream API takes the key as the last path segment.
    pub fn endpoint_with_key(base: &Url, api_key: Option<&str>) -> Result<Url, QuizError> {
        let Some(key) = api_key.map(str::trim).filter(|key| !key.is_empty()) else {
            return Ok(base.clone());
        };
        let mut endpoint = base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| QuizError::Transport(format!("cannot append api key to {base}")))?
            .pop_if_empty()
            .push(key);
        Ok(endpoint)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, QuizError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| QuizError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| QuizError::Transport(err.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| QuizError::Transport(err.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl MoviesLoading for HttpMoviesLoader {
    async fn load_movies(&self) -> Result<Vec<Movie>, QuizError> {
        let body = self.get_bytes(self.endpoint.as_str()).await?;
        let movies = parse_catalog(&body)?;
        tracing::debug!(count = movies.len(), endpoint = %self.endpoint, "movie catalog fetched");
        Ok(movies)
    }

    async fn load_poster(&self, image_url: &str) -> Result<Vec<u8>, QuizError> {
        if image_url.is_empty() {
            return Err(QuizError::ImageDecode("movie has no poster url".into()));
        }
        self.get_bytes(image_url).await
    }
}

#[cfg(test)]
#[path = "tests/movies_loader_tests.rs"]
mod tests;
