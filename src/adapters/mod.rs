// Adapters layer: the HTTP side of every port and endpoint.

pub mod auth_api;
pub mod catalog_api;
pub mod http;
pub mod ranking_api;
pub mod social_api;

pub use http::ApiClient;
pub use ranking_api::HttpRankingSource;
