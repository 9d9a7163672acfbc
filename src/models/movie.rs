//! Movie detail models for `GET /api/movies/{id}/`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code
    pub alpha_2: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPerson {
    pub name: Option<String>,
    pub en_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub biography: String,
}

/// A single cast/crew entry. `job` is `director` or `actor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credit {
    pub job: String,
    #[serde(default)]
    pub cameo_type: String,
    #[serde(default)]
    pub role_name: String,
    #[serde(alias = "people")]
    pub person: CreditPerson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poster {
    pub image_url: String,
    pub is_main: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Still {
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub title: Option<String>,
    /// Hosting site identifier, e.g. `youtube`
    pub site: String,
    pub external_id: String,
}

/// Full movie detail as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    pub production_year: Option<i32>,
    /// Serialized duration, e.g. `02:13:00`
    pub running_time: Option<String>,
    #[serde(default)]
    pub synopsys: String,
    pub film_rating: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default, alias = "staffs")]
    pub credits: Vec<Credit>,
    #[serde(default)]
    pub poster_set: Vec<Poster>,
    #[serde(default)]
    pub still_set: Vec<Still>,
    #[serde(default)]
    pub video_set: Vec<Video>,
}

impl Movie {
    /// URL of the designated main poster, if one exists.
    pub fn main_poster(&self) -> Option<&str> {
        self.poster_set
            .iter()
            .find(|p| p.is_main)
            .map(|p| p.image_url.as_str())
    }

    /// Image to use as the page wallpaper: the first still, falling back
    /// to a non-main poster.
    pub fn wallpaper(&self) -> Option<&str> {
        self.still_set
            .first()
            .map(|s| s.image_url.as_str())
            .or_else(|| {
                self.poster_set
                    .iter()
                    .find(|p| !p.is_main)
                    .map(|p| p.image_url.as_str())
            })
    }

    pub fn directors(&self) -> impl Iterator<Item = &Credit> {
        self.credits.iter().filter(|c| c.job == "director")
    }

    pub fn cast(&self) -> impl Iterator<Item = &Credit> {
        self.credits.iter().filter(|c| c.job == "actor")
    }
}
