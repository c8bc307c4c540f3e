use axum::{extract::State, response::Json};
use tracing::info;

use crate::app::AppState;
use crate::auth::jwt::generate_access_token;
use crate::auth::password::spawn_verify_password;
use crate::dao::user::UserDao;
use crate::handlers::error::ApiError;
use crate::handlers::extract::Form;
use crate::schema::auth::{LoginForm, Token};

const BAD_CREDENTIALS: &str = "Incorrect email or password";

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    let user = {
        let db = state.db.lock().await;
        UserDao
            .get_user_by_email(&db, &form.username)
            .await
            .map_err(|err| ApiError::internal("failed to log in", err))?
    };
    let Some(user) = user else {
        return Err(ApiError::BadRequest(BAD_CREDENTIALS.to_string()));
    };

    let verified = spawn_verify_password(user.hashed_password, form.password)
        .await
        .map_err(|err| ApiError::internal("failed to log in", err))?;
    if !verified {
        return Err(ApiError::BadRequest(BAD_CREDENTIALS.to_string()));
    }

    let access_token = generate_access_token(&state.jwt_secret, &user.email)
        .map_err(|err| ApiError::internal("failed to log in", err))?;

    info!("User {} logged in", user.email);

    Ok(Json(Token {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
