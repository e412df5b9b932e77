// handlers/users/mod.rs - User CRUD handlers

pub mod create;   // POST /users/create
pub mod list;     // GET /users
pub mod show;     // GET /users/:id
pub mod edit;     // PATCH /users/edit/:id
pub mod update;   // PATCH /users/update/:id
pub mod delete;   // DELETE /users/delete/:id

pub use create::user_create;
pub use list::user_list;
pub use show::user_show;
pub use edit::user_edit;
pub use update::user_update;
pub use delete::user_delete;
