use std::future::Future;

use thiserror::Error;

use crate::user::User;

/// The user collection resource.
pub const USERS_ENDPOINT: &str = "/users/";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request to /users/ failed: {0}")]
    Network(String),

    #[error("/users/ answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode users: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no element with id `{0}` in the document")]
    MissingContainer(&'static str),
}

/// Where the loader gets its users from.
pub trait UserSource {
    fn fetch_users(&self) -> impl Future<Output = Result<Vec<User>, LoadError>>;
}

/// Turns a raw `/users/` response into records.
///
/// Anything but `200 OK` is an error, so is a body that is not a JSON array
/// of objects.
pub fn parse_users(status: u16, body: &str) -> Result<Vec<User>, LoadError> {
    if status != 200 {
        return Err(LoadError::Status {
            status,
            body: body.to_string(),
        });
    }

    Ok(serde_json::from_str(body)?)
}

#[cfg(target_arch = "wasm32")]
pub use http::HttpUserSource;

#[cfg(target_arch = "wasm32")]
mod http {
    use gloo_net::http::Request;

    use super::{parse_users, LoadError, UserSource, USERS_ENDPOINT};
    use crate::user::User;

    /// Fetches users from the backend with `GET /users/`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct HttpUserSource;

    impl UserSource for HttpUserSource {
        async fn fetch_users(&self) -> Result<Vec<User>, LoadError> {
            let response = Request::get(USERS_ENDPOINT)
                .send()
                .await
                .map_err(|err| LoadError::Network(err.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|err| LoadError::Network(err.to_string()))?;

            parse_users(status, &body)
        }
    }
}
