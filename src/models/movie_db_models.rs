use serde::{Deserialize, Serialize};

// --- Shapes returned by the movie database API ---

#[derive(Debug, Deserialize, Clone)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchResult {
    pub id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Credits {
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetailsResponse {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub videos: Videos,
}

// --- Shapes this crate hands to its callers ---

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MovieCandidate {
    pub id: i64,
    pub title: String,
    /// First four characters of the release date, or empty.
    pub release_year: String,
    pub poster_path: Option<String>,
    pub poster_url: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub cinematographer: Option<String>,
    pub trailer_key: Option<String>,
    pub trailer_url: Option<String>,
}
