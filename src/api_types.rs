use serde::{Deserialize, Serialize};

use crate::{caption, graph::RawPhoto};

/// Name shown for animals whose caption did not yield one.
pub const PLACEHOLDER_NAME: &str = "Podopieczny";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

/// Adoption status of an animal. Captions that mention no status are `Available`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdoptionStatus {
    #[default]
    #[serde(rename = "available")]
    Available,

    #[serde(rename = "pending")]
    Pending,

    #[serde(rename = "adopted")]
    Adopted,
}

/// An adoptable animal derived from one album photo.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalRecord {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weight: Option<f64>,
    pub color: String,
    pub description: String,
    pub status: AdoptionStatus,
    /// Source URL of the widest image variant.
    pub photo: Option<String>,
    pub created_at: Option<String>,
}

impl From<&RawPhoto> for AnimalRecord {
    fn from(photo: &RawPhoto) -> Self {
        let fields = caption::parse(photo.caption.as_deref().unwrap_or_default());

        Self {
            id: photo.id.clone(),
            name: fields
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_NAME.to_owned()),
            breed: fields.breed.unwrap_or_default(),
            age: fields.age,
            gender: fields.gender,
            weight: fields.weight,
            color: fields.color.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            status: fields.status.unwrap_or_default(),
            photo: photo.largest_image().map(|image| image.source.clone()),
            created_at: photo.created_time.clone(),
        }
    }
}

/// Body returned by the HTTP layer when the feed cannot be served.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
