//! Business logic services for the application layer.

pub mod admin_service;
pub mod bulk_service;
pub mod resolver_service;
pub mod shortener_service;

pub use admin_service::AdminService;
pub use bulk_service::{BulkItemResult, BulkService, BulkStatus};
pub use resolver_service::ResolverService;
pub use shortener_service::{ShortenInput, ShortenedUrl, ShortenerService};
