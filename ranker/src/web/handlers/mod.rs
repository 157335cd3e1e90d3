// API handlers organized by domain
pub mod common;
pub mod endpoints;
pub mod status;

pub use common::{ApiResponse, ApiResult};
pub use endpoints::get_published_endpoints;
pub use status::get_status;
