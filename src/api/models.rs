use serde::Serialize;

/// Body of a successful `/api/medium/:username` response.
#[derive(Serialize)]
pub struct FeedResponse {
    pub status: String,
    pub feed: Feed,
    pub items: Vec<FeedItem>,
}

/// Channel-level feed metadata. Every key is always present; absent
/// fields are empty strings, never null.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Feed {
    pub url: String,
    pub title: String,
    pub link: String,
    pub author: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedItem {
    pub title: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub link: String,
    pub guid: String,
    pub author: String,
    pub thumbnail: String,
    pub description: String,
    pub content: String,
    pub enclosure: Enclosure,
    pub categories: Vec<String>,
}

/// Placeholder kept for consumers expecting the key; serializes as `{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Enclosure {}
