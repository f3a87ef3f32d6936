//! # lf-api Handlers
//!
//! This module coordinates the flow between HTTP requests and core traits.
//! The interesting endpoint is `upload_item`: validate, persist the blob
//! and the row, run the matcher inside the request, then answer with the
//! match outcome while notification fans out in the background.

use std::str::FromStr;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use lf_core::{AppError, AuthProvider, BlobStore, Item, ItemRepo, ItemStatus, User, UserRepo};
use lf_match::{MatchFeed, MatchOutcome, Matcher, Notifier};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::error::ApiError;

/// State shared across all actix workers.
pub struct AppState {
    pub items: Arc<dyn ItemRepo>,
    pub users: Arc<dyn UserRepo>,
    pub blobs: Arc<dyn BlobStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub matcher: Matcher,
    pub notifier: Notifier,
    pub feed: Arc<MatchFeed>,
}

/// A simple service banner for "/".
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Lost-and-found matching service running")
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    data: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "name, email and password are required".to_string(),
        )
        .into());
    }
    if data.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict(format!("email {} already registered", req.email)).into());
    }

    let password_hash = data.auth.hash_password(&req.password)?;
    let user = User {
        id: Uuid::now_v7(),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash,
    };
    data.users.create_user(user.clone()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "registered successfully",
        "user_id": user.id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let user = data
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string(), req.email.clone()))?;

    if !data.auth.verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized("incorrect password".to_string()).into());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "login successful",
        "user_id": user.id,
        "name": user.name,
        "email": user.email,
    })))
}

/// Collected `POST /items` form fields.
#[derive(Debug, Default)]
struct UploadForm {
    title: Option<String>,
    description: String,
    status: Option<ItemStatus>,
    owner_id: Option<Uuid>,
    image: Option<Vec<u8>>,
}

fn text_field(name: &str, buf: &[u8]) -> Result<String, AppError> {
    std::str::from_utf8(buf)
        .map(str::to_string)
        .map_err(|_| AppError::ValidationError(format!("field '{name}' is not UTF-8")))
}

async fn read_form(payload: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::ValidationError(format!("malformed multipart payload: {e}")))?
    {
        let name = field.name().to_string();
        let mut buf = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::ValidationError(format!("broken upload stream: {e}")))?
        {
            buf.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "title" => form.title = Some(text_field(&name, &buf)?),
            "description" => form.description = text_field(&name, &buf)?,
            "status" => form.status = Some(ItemStatus::from_str(text_field(&name, &buf)?.trim())?),
            "user_id" => {
                form.owner_id =
                    Some(Uuid::parse_str(text_field(&name, &buf)?.trim()).map_err(|_| {
                        AppError::ValidationError("user_id must be a UUID".to_string())
                    })?)
            }
            "image" => form.image = Some(buf),
            // Unknown fields are ignored, same as the form-based clients expect.
            _ => {}
        }
    }
    Ok(form)
}

/// Submit a lost/found report and attempt the visual match synchronously.
///
/// Validation rejects before anything is stored. After the item row is
/// committed, scan faults only degrade the response to "no match"; a
/// stored item is never lost to a scoring or notification problem.
pub async fn upload_item(
    data: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_form(&mut payload).await?;

    let title = form
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("title is required".to_string()))?;
    let status = form
        .status
        .ok_or_else(|| AppError::ValidationError("status is required".to_string()))?;
    let owner_id = form
        .owner_id
        .ok_or_else(|| AppError::ValidationError("user_id is required".to_string()))?;
    let image = form
        .image
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::ValidationError("image is required".to_string()))?;

    if image::load_from_memory(&image).is_err() {
        return Err(AppError::ValidationError("image could not be decoded".to_string()).into());
    }
    let owner = data
        .users
        .get_user(owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string(), owner_id.to_string()))?;

    let image_ref = data.blobs.save(image).await?;
    let item = Item {
        id: Uuid::now_v7(),
        title: title.trim().to_string(),
        description: form.description,
        status,
        owner_id: owner.id,
        image_ref,
        matched: false,
        created_at: Utc::now(),
    };
    data.items.create_item(item.clone()).await?;

    let outcome = match data.matcher.try_match(&item).await {
        Ok(outcome) => outcome,
        Err(err) => {
            log::warn!("match scan for {} failed: {err:#}", item.id);
            MatchOutcome::Unmatched
        }
    };

    match outcome {
        MatchOutcome::Matched { event, .. } => {
            // Fire-and-forget: the match is durable, the response must not
            // wait on mail or broadcast delivery.
            let notifier = data.notifier.clone();
            let announced = event.clone();
            tokio::spawn(async move { notifier.announce(&announced).await });

            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "match found",
                "matched": true,
                "similarity_percent": event.similarity_percent,
            })))
        }
        MatchOutcome::Unmatched => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "item stored",
            "matched": false,
        }))),
    }
}

pub async fn list_items(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let items = data.items.list_items().await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_item(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let item = data
        .items
        .get_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound("item".to_string(), id.to_string()))?;
    Ok(HttpResponse::Ok().json(item))
}

/// Server-Sent Events stream of match announcements, fed from the
/// in-process broadcast. Lagged subscribers skip ahead rather than
/// terminating the stream.
pub async fn events(data: web::Data<AppState>) -> HttpResponse {
    let rx = data.feed.subscribe();
    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(frame) => {
                    let sse = format!("event: {}\ndata: {}\n\n", frame.topic, frame.payload);
                    return Some((Ok::<_, actix_web::Error>(web::Bytes::from(sse)), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!("sse subscriber lagged, skipped {skipped} events");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}
