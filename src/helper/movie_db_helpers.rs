use log::warn;
use thiserror::Error;

use crate::config::MovieDbConfig;
use crate::models::movie_db_models::{
    CrewMember, DetailsResponse, MovieCandidate, MovieDetails, SearchResponse, Video,
};

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_CANDIDATES: usize = 8;
const SEARCH_POSTER_SIZE: &str = "w342";
const DETAIL_POSTER_SIZE: &str = "w500";
const WRITER_JOBS: [&str; 3] = ["Screenplay", "Writer", "Story"];

#[derive(Error, Debug)]
pub enum MovieDbError {
    #[error("Movie database API key is not configured")]
    NotConfigured,
    #[error("Movie database request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Movie database answered with status {0}")]
    Status(u16),
}

pub fn poster_url(image_base_url: &str, poster_path: Option<&str>, size: &str) -> Option<String> {
    poster_path
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}/{}{}", image_base_url.trim_end_matches('/'), size, path))
}

fn first_with_job<'a>(crew: &'a [CrewMember], jobs: &[&str]) -> Option<&'a str> {
    crew.iter()
        .find(|member| jobs.contains(&member.job.as_str()))
        .map(|member| member.name.as_str())
}

pub fn find_director(crew: &[CrewMember]) -> Option<&str> {
    first_with_job(crew, &["Director"])
}

/// The first crew entry credited with any writing job, in crew order.
pub fn find_writer(crew: &[CrewMember]) -> Option<&str> {
    first_with_job(crew, &WRITER_JOBS)
}

pub fn find_cinematographer(crew: &[CrewMember]) -> Option<&str> {
    first_with_job(crew, &["Director of Photography"])
}

pub fn find_trailer_key(videos: &[Video]) -> Option<&str> {
    videos
        .iter()
        .find(|video| video.video_type == "Trailer" && video.site == "YouTube")
        .map(|video| video.key.as_str())
}

pub fn trailer_watch_url(key: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", key)
}

pub fn to_candidates(response: SearchResponse, image_base_url: &str) -> Vec<MovieCandidate> {
    response
        .results
        .into_iter()
        .take(MAX_CANDIDATES)
        .map(|result| MovieCandidate {
            id: result.id,
            release_year: result
                .release_date
                .as_deref()
                .and_then(|date| date.get(..4))
                .unwrap_or_default()
                .to_string(),
            poster_url: poster_url(image_base_url, result.poster_path.as_deref(), SEARCH_POSTER_SIZE),
            poster_path: result.poster_path,
            title: result.title,
        })
        .collect()
}

pub fn to_details(response: DetailsResponse, image_base_url: &str) -> MovieDetails {
    let crew = &response.credits.crew;
    let trailer_key = find_trailer_key(&response.videos.results).map(str::to_string);
    MovieDetails {
        id: response.id,
        director: find_director(crew).map(str::to_string),
        writer: find_writer(crew).map(str::to_string),
        cinematographer: find_cinematographer(crew).map(str::to_string),
        poster_url: poster_url(image_base_url, response.poster_path.as_deref(), DETAIL_POSTER_SIZE),
        trailer_url: trailer_key.as_deref().map(trailer_watch_url),
        trailer_key,
        overview: response.overview.filter(|text| !text.trim().is_empty()),
        title: response.title,
    }
}

/// Thin client over the movie database's search and details endpoints.
#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    config: MovieDbConfig,
}

impl TmdbClient {
    pub fn new(config: MovieDbConfig) -> Self {
        TmdbClient { http: reqwest::Client::new(), config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, MovieDbError> {
        self.config.api_key.as_deref().ok_or(MovieDbError::NotConfigured)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MovieDbError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key()?)])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Movie database request to {} failed with status {}", path, status);
            return Err(MovieDbError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }

    /// Short queries return no candidates without contacting the service.
    pub async fn search_movies(&self, query: &str) -> Result<Vec<MovieCandidate>, MovieDbError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }
        let response: SearchResponse = self.get_json("/search/movie", &[("query", query)]).await?;
        Ok(to_candidates(response, &self.config.image_base_url))
    }

    pub async fn movie_details(&self, movie_id: i64) -> Result<MovieDetails, MovieDbError> {
        let response: DetailsResponse = self
            .get_json(
                &format!("/movie/{}", movie_id),
                &[("append_to_response", "credits,videos")],
            )
            .await?;
        Ok(to_details(response, &self.config.image_base_url))
    }
}
