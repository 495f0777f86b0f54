//! Client side of the photo album API the feed is built from.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;

use crate::error::FetchError;

/// One rendition of a photo.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageVariant {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub source: String,
}

/// A photo as returned by the album API.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawPhoto {
    #[serde(default)]
    pub id: String,
    /// Free-text caption typed by shelter staff. The API calls this `name`.
    #[serde(default, rename = "name")]
    pub caption: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageVariant>,
    #[serde(default)]
    pub created_time: Option<String>,
}

impl RawPhoto {
    /// The widest image variant. The first one wins on ties.
    pub fn largest_image(&self) -> Option<&ImageVariant> {
        self.images.iter().fold(None, |best, image| match best {
            Some(current) if current.width >= image.width => Some(current),
            _ if image.source.is_empty() => best,
            _ => Some(image),
        })
    }
}

/// Album identifier plus the token used to read it.
#[derive(Clone, PartialEq, Eq)]
pub struct AlbumCredentials {
    pub album_id: String,
    pub access_token: String,
}

impl AlbumCredentials {
    /// Build credentials from optional configuration values. Blank values count as missing.
    pub fn from_parts(album_id: Option<String>, access_token: Option<String>) -> Option<Self> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Some(Self {
            album_id: present(album_id)?,
            access_token: present(access_token)?,
        })
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for AlbumCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumCredentials")
            .field("album_id", &self.album_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// PhotoSource is the trait for anything that can list the photos of an album.
/// Implementations make exactly one upstream call per invocation and never retry.
#[async_trait]
pub trait PhotoSource {
    async fn fetch_photos(&self, credentials: &AlbumCredentials) -> Result<Vec<RawPhoto>, FetchError>;
}

#[derive(Deserialize, Debug)]
struct GraphError {
    message: String,
}

/// Response envelope of the photos edge. Either side may be missing, and `data` is decoded
/// entry by entry so one malformed photo does not take the album down with it.
#[derive(Deserialize, Debug)]
struct PhotosEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<GraphError>,
}

impl PhotosEnvelope {
    fn into_photos(self) -> Result<Vec<RawPhoto>, FetchError> {
        if let Some(error) = self.error {
            return Err(FetchError::UpstreamRejected(error.message));
        }

        let entries = match self.data {
            Some(serde_json::Value::Array(entries)) => entries,
            Some(other) => {
                warn!("Album data is not a list, treating it as empty: {}", other);
                return Ok(vec![]);
            }
            None => return Ok(vec![]),
        };

        Ok(entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<RawPhoto>(entry) {
                Ok(photo) => Some(photo),
                Err(err) => {
                    warn!("Skipping undecodable album photo: {}", err);
                    None
                }
            })
            .collect())
    }
}

/// [PhotoSource] backed by the Graph API photos edge of an album.
pub struct GraphPhotoSource {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    limit: u32,
}

impl GraphPhotoSource {
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        limit: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Network(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_version: api_version.into(),
            limit,
        })
    }

    fn photos_url(&self, album_id: &str) -> String {
        format!(
            "{}/{}/{}/photos",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            album_id
        )
    }
}

#[async_trait]
impl PhotoSource for GraphPhotoSource {
    async fn fetch_photos(&self, credentials: &AlbumCredentials) -> Result<Vec<RawPhoto>, FetchError> {
        let url = self.photos_url(&credentials.album_id);
        debug!("Fetching album photos from {}", &url);

        let limit = self.limit.to_string();
        let envelope = self
            .client
            .get(&url)
            .query(&[
                ("fields", "id,name,images,created_time"),
                ("limit", limit.as_str()),
                ("access_token", credentials.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|err| FetchError::Network(err.without_url().to_string()))?
            .json::<PhotosEnvelope>()
            .await
            .map_err(|err| FetchError::Network(err.without_url().to_string()))?;

        envelope.into_photos()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::error::FetchError;

    use super::{AlbumCredentials, GraphPhotoSource, PhotosEnvelope, RawPhoto};

    #[test]
    pub fn envelope_with_photos() {
        let envelope: PhotosEnvelope = serde_json::from_str(
            r#"
            {
                "data": [
                    {
                        "id": "101",
                        "name": "Burek - Mieszaniec, 3 lata, samiec",
                        "images": [
                            {"height": 720, "width": 960, "source": "https://cdn.example/960.jpg"},
                            {"height": 130, "width": 173, "source": "https://cdn.example/173.jpg"}
                        ],
                        "created_time": "2024-02-11T09:15:42+0000"
                    },
                    {"id": "102"}
                ],
                "paging": {"cursors": {"before": "a", "after": "b"}}
            }
        "#,
        )
        .unwrap();

        let photos = envelope.into_photos().unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(
            photos[0].caption.as_deref(),
            Some("Burek - Mieszaniec, 3 lata, samiec")
        );
        assert_eq!(photos[0].images[1].width, 173);
        assert_eq!(
            photos[1],
            RawPhoto {
                id: "102".to_owned(),
                caption: None,
                images: vec![],
                created_time: None,
            }
        );
    }

    #[test]
    pub fn envelope_with_error() {
        let envelope: PhotosEnvelope = serde_json::from_str(
            r#"{"error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}}"#,
        )
        .unwrap();

        match envelope.into_photos() {
            Err(FetchError::UpstreamRejected(message)) => {
                assert_eq!(message, "Invalid OAuth access token.")
            }
            other => panic!("expected upstream rejection, got {:?}", other),
        }
    }

    #[test]
    pub fn envelope_skips_malformed_photos() {
        let envelope: PhotosEnvelope = serde_json::from_str(
            r#"
            {
                "data": [
                    {"name": "Burek", "images": [{"width": 300}]},
                    "not a photo",
                    {"id": 7},
                    {"id": "103", "name": "Luna", "images": {"width": 1}},
                    {"id": "104", "name": "Reksio"}
                ]
            }
        "#,
        )
        .unwrap();

        let photos = envelope.into_photos().unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].id, "");
        assert_eq!(photos[0].caption.as_deref(), Some("Burek"));
        assert_eq!(photos[0].largest_image(), None);
        assert_eq!(photos[1].id, "104");
    }

    #[test]
    pub fn envelope_with_non_list_data() {
        for body in [r#"{"data": {"id": "1"}}"#, r#"{"data": null}"#, r#"{"data": "oops"}"#] {
            let envelope: PhotosEnvelope = serde_json::from_str(body).unwrap();
            assert!(envelope.into_photos().unwrap().is_empty());
        }
    }

    #[test]
    pub fn envelope_without_data() {
        let envelope: PhotosEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.into_photos().unwrap().is_empty());
    }

    #[test]
    pub fn credentials_require_both_parts() {
        assert!(AlbumCredentials::from_parts(Some("123".into()), Some("token".into())).is_some());
        assert!(AlbumCredentials::from_parts(None, Some("token".into())).is_none());
        assert!(AlbumCredentials::from_parts(Some("123".into()), None).is_none());
        assert!(AlbumCredentials::from_parts(Some("  ".into()), Some("token".into())).is_none());
    }

    #[test]
    pub fn credentials_debug_hides_token() {
        let credentials =
            AlbumCredentials::from_parts(Some("123".into()), Some("s3cr3t".into())).unwrap();
        assert!(!format!("{:?}", credentials).contains("s3cr3t"));
    }

    #[test]
    pub fn photos_url() {
        let source =
            GraphPhotoSource::new("https://graph.facebook.com/", "v25.0", 100, Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            source.photos_url("998877"),
            "https://graph.facebook.com/v25.0/998877/photos"
        );
    }
}
