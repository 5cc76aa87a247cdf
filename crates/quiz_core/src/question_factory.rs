//! Builds one randomized question at a time from the loaded movie catalog.

use std::{
    io::Cursor,
    sync::{Arc, RwLock},
};

use image::ImageReader;
use rand::Rng;
use shared::{
    domain::{Movie, PosterInfo, QuizQuestion, RoundId},
    error::QuizError,
};
use tracing::{debug, error, warn};

use crate::movies_loader::MoviesLoading;

pub const MIN_THRESHOLD: u8 = 1;
pub const MAX_THRESHOLD: u8 = 10;

/// Receives the outcome of every factory request. Exactly one method fires per
/// outstanding request, from a background task.
pub trait QuestionFactoryListener: Send + Sync {
    fn on_question_ready(&self, round: RoundId, question: Option<QuizQuestion>);
    fn on_data_loaded(&self);
    fn on_data_load_failed(&self, error: QuizError);
}

/// What the presenter needs from a question factory.
pub trait QuestionSource: Send {
    fn load_data(&self);
    fn request_next_question(&self, round: RoundId);
}

pub struct QuestionFactory {
    loader: Arc<dyn MoviesLoading>,
    listener: Arc<dyn QuestionFactoryListener>,
    movies: Arc<RwLock<Vec<Movie>>>,
    min_movies: usize,
}

impl QuestionFactory {
    /// Spawns onto the ambient Tokio runtime; call from within one.
    pub fn new(
        loader: Arc<dyn MoviesLoading>,
        listener: Arc<dyn QuestionFactoryListener>,
        min_movies: usize,
    ) -> Self {
        Self {
            loader,
            listener,
            movies: Arc::new(RwLock::new(Vec::new())),
            min_movies,
        }
    }

    pub fn catalog_len(&self) -> usize {
        read_catalog(&self.movies).len()
    }
}

impl QuestionSource for QuestionFactory {
    fn load_data(&self) {
        let loader = Arc::clone(&self.loader);
        let listener = Arc::clone(&self.listener);
        let movies = Arc::clone(&self.movies);
        let min_movies = self.min_movies;

        tokio::spawn(async move {
            let loaded = loader
                .load_movies()
                .await
                .and_then(|catalog| ensure_enough_movies(catalog, min_movies));
            match loaded {
                Ok(catalog) => {
                    debug!(count = catalog.len(), "movie catalog ready");
                    *write_catalog(&movies) = catalog;
                    listener.on_data_loaded();
                }
                Err(err) => {
                    error!(kind = ?err.kind(), "movie catalog load failed: {err}");
                    write_catalog(&movies).clear();
                    listener.on_data_load_failed(err);
                }
            }
        });
    }

    fn request_next_question(&self, round: RoundId) {
        let listener = Arc::clone(&self.listener);
        let picked = {
            let catalog = read_catalog(&self.movies);
            let mut rng = rand::thread_rng();
            pick_movie(&catalog, &mut rng)
                .map(|movie| (movie.clone(), pick_threshold(movie.rating, &mut rng)))
        };

        let Some((movie, threshold)) = picked else {
            warn!(round = round.0, "question requested before the catalog was loaded");
            tokio::spawn(async move {
                listener.on_question_ready(round, None);
            });
            return;
        };

        let loader = Arc::clone(&self.loader);
        tokio::spawn(async move {
            let (image, poster) = match load_poster(loader.as_ref(), &movie.image_url).await {
                Ok((image, poster)) => (image, Some(poster)),
                Err(err) => {
                    warn!(title = %movie.title, "poster unavailable, using empty image: {err}");
                    (Vec::new(), None)
                }
            };
            let question = build_question(&movie, threshold, image).with_poster(poster);
            listener.on_question_ready(round, Some(question));
        });
    }
}

async fn load_poster(
    loader: &dyn MoviesLoading,
    image_url: &str,
) -> Result<(Vec<u8>, PosterInfo), QuizError> {
    let bytes = loader.load_poster(image_url).await?;
    let poster = decode_poster(&bytes)?;
    Ok((bytes, poster))
}

/// Reads the image header only; the pixels are never decoded.
pub fn decode_poster(bytes: &[u8]) -> Result<PosterInfo, QuizError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| QuizError::ImageDecode(err.to_string()))?
        .into_dimensions()
        .map_err(|err| QuizError::ImageDecode(err.to_string()))?;
    Ok(PosterInfo { width, height })
}

fn ensure_enough_movies(catalog: Vec<Movie>, required: usize) -> Result<Vec<Movie>, QuizError> {
    if catalog.len() < required {
        return Err(QuizError::InsufficientData {
            required,
            actual: catalog.len(),
        });
    }
    Ok(catalog)
}

pub fn pick_movie<'a, R: Rng + ?Sized>(catalog: &'a [Movie], rng: &mut R) -> Option<&'a Movie> {
    if catalog.is_empty() {
        return None;
    }
    catalog.get(rng.gen_range(0..catalog.len()))
}

/// Uniform in `1..=10`, redrawn once when it lands on the rounded rating.
pub fn pick_threshold<R: Rng + ?Sized>(rating: f32, rng: &mut R) -> u8 {
    let first = rng.gen_range(MIN_THRESHOLD..=MAX_THRESHOLD);
    if f32::from(first) == rating.round() {
        return rng.gen_range(MIN_THRESHOLD..=MAX_THRESHOLD);
    }
    first
}

pub fn build_question(movie: &Movie, threshold: u8, image: Vec<u8>) -> QuizQuestion {
    let text = format!("Is the rating of this movie higher than {threshold}?");
    QuizQuestion::new(image, text, movie.rating > f32::from(threshold))
        .with_movie_title(movie.title.clone())
}

fn read_catalog(movies: &RwLock<Vec<Movie>>) -> std::sync::RwLockReadGuard<'_, Vec<Movie>> {
    movies.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_catalog(movies: &RwLock<Vec<Movie>>) -> std::sync::RwLockWriteGuard<'_, Vec<Movie>> {
    movies.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "tests/question_factory_tests.rs"]
mod tests;
