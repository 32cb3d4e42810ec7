//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod admin;
pub mod analytics;
pub mod bulk;
pub mod health;
pub mod preview;
pub mod redirect;
pub mod shorten;

pub use admin::{
    delete_expired_handler, delete_url_handler, list_urls_handler, summary_handler,
    top_clicked_handler,
};
pub use analytics::analytics_handler;
pub use bulk::{bulk_shorten_csv_handler, bulk_shorten_handler};
pub use health::health_handler;
pub use preview::preview_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
