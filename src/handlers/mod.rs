pub mod root;
pub mod upload;
pub mod users;

pub use root::{health, root};
pub use upload::image_upload;
