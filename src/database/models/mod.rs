pub mod address;
pub mod post;
pub mod user;

pub use address::{Address, NewAddress};
pub use post::{NewPost, Post};
pub use user::{NewUser, User, UserChanges, UserDetail};
