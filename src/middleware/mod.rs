pub mod body;
pub mod response;

pub use body::RequestBody;
pub use response::{ApiResponse, ApiResult};
