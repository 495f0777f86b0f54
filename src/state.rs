use std::sync::Arc;

use crate::feed::AnimalFeed;

type FeedHandle = Arc<AnimalFeed>;

#[derive(Clone)]
pub struct AppState {
    pub feed: FeedHandle,
}

impl AppState {
    pub fn new(feed: AnimalFeed) -> Self {
        Self {
            feed: Arc::new(feed),
        }
    }
}
