//! Browser loader for the user table.
//!
//! On page load the loader fetches `GET /users/` and renders one row per user
//! into the page's `<tbody id="user-table-body">`.

pub mod api;
#[cfg(target_arch = "wasm32")]
pub mod bootstrap;
pub mod components;
pub mod loader;
pub mod user;

/// Id of the `<tbody>` the rows are rendered into.
pub const USER_TABLE_BODY_ID: &str = "user-table-body";
