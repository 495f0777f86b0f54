pub mod api_types;
pub mod caption;
pub mod error;
pub mod feed;
pub mod graph;
pub mod router;
pub mod state;
