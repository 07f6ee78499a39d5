pub mod api;
pub mod http;

pub use api::{ApiResponse, GatewayError, UserApi};
pub use http::HttpUserApi;
