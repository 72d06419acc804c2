use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use mindline_core::session::ChatMessage;
use mindline_core::Error;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::auth::CallerState;
use crate::error::{ApiError, DUPLICATE_EMAIL};
use crate::state::{
    AppState, ChatRequest, ChatResponse, LoginForm, LoginResponse, NewChatResponse, RegisterForm,
    StatusMessage,
};

type ApiResult<T> = Result<T, ApiError>;

pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Response> {
    // Identity decides the status before the body is looked at.
    let caller = state.cookies.read(&headers).ok_or(Error::Unauthenticated)?;
    let identity = caller.identity();
    let hint = caller.active_chat_id.clone();

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!("Unreadable chat body, treating as empty message: {}", rejection);
            ChatRequest::default()
        }
    };

    let posted = state
        .controller
        .post_message(Some(&identity), hint.as_deref(), &payload.message)
        .await?;

    let body = Json(ChatResponse {
        response: posted.reply_text,
        message_id: posted.reply_id,
    });

    // Persist a freshly minted session id for the next post.
    if hint.as_deref() == Some(posted.session_id.as_str()) {
        return Ok(body.into_response());
    }
    let cookie = state
        .cookies
        .set_cookie(&caller.with_active_chat(posted.session_id))?;
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

pub async fn chat_history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let caller = state.cookies.read(&headers);
    let identity = caller.as_ref().map(CallerState::identity);

    let history = state
        .controller
        .get_history(
            identity.as_ref(),
            caller.as_ref().and_then(|c| c.active_chat_id.as_deref()),
        )
        .await?;
    Ok(Json(history))
}

pub async fn new_chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let caller = state.cookies.read(&headers);
    let identity = caller.as_ref().map(CallerState::identity);

    let session_id = state.controller.reset(identity.as_ref()).await?;
    let caller = caller.ok_or(Error::Unauthenticated)?;
    let cookie = state
        .cookies
        .set_cookie(&caller.with_active_chat(session_id.clone()))?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(NewChatResponse {
            success: true,
            session_id,
        }),
    )
        .into_response())
}

pub async fn register_handler(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> ApiResult<(StatusCode, Json<StatusMessage>)> {
    let name = form.name.trim();
    let email = form.email.trim();

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(Error::Validation("Please provide name, email and password.".into()).into());
    }
    if form.password != form.confirm_password {
        return Err(Error::Validation("Passwords do not match.".into()).into());
    }
    if state.users.find_by_email(email).await?.is_some() {
        return Err(Error::Conflict(DUPLICATE_EMAIL.into()).into());
    }

    let hasher = state.hasher;
    let password = form.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| Error::Internal(format!("password hashing task failed: {}", e)))??;

    let user = state.users.create_user(name, email, &password_hash).await?;
    info!(user_id = user.id, "Registered new user");

    Ok((
        StatusCode::CREATED,
        Json(StatusMessage {
            success: true,
            message: "Registration successful! Please log in.".to_string(),
        }),
    ))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return Err(Error::Validation("Please provide both email and password.".into()).into());
    }

    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let hasher = state.hasher;
    let password = form.password;
    let stored = user.password.clone();
    let valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
        .await
        .map_err(|e| Error::Internal(format!("password check task failed: {}", e)))?;
    if !valid {
        warn!(user_id = user.id, "Rejected login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let cookie = state
        .cookies
        .set_cookie(&CallerState::new(user.id, user.name.clone()))?;
    info!(user_id = user.id, "User logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            username: user.name,
            message: "Login successful!".to_string(),
        }),
    )
        .into_response())
}

pub async fn logout_handler(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, state.cookies.clear_cookie())],
        Json(StatusMessage {
            success: true,
            message: "You have been logged out.".to_string(),
        }),
    )
        .into_response()
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
