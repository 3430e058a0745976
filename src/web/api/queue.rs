//! API endpoints for the ticket queue.

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::{Contact, QueueError, QueueService, QueueStats, Reference, Ticket};

/// Carries the caller's own reference on register; the body holds the queue head.
pub const TICKET_REFERENCE_HEADER: &str = "x-ticket-reference";

type ApiError = (StatusCode, String);

fn queue_error(err: QueueError) -> ApiError {
    match err {
        QueueError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        QueueError::NotFound(_) => (StatusCode::NOT_ACCEPTABLE, "Ticket not found".to_string()),
        QueueError::AlreadyServed(_) => (
            StatusCode::NOT_ACCEPTABLE,
            "Ticket already served".to_string(),
        ),
    }
}

/// Ticket as existing clients read it: `username`, `phone` and `email` at top level.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub reference: Reference,
    pub phone: String,
    pub username: String,
    pub email: String,
    pub served: bool,
    pub registered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub served_at: Option<DateTime<Utc>>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            reference: ticket.reference,
            phone: ticket.contact.contact_address,
            username: ticket.contact.display_name,
            email: ticket.contact.email_address,
            served: ticket.served,
            registered_at: ticket.registered_at,
            served_at: ticket.served_at,
        }
    }
}

/// Serve query parameters.
#[derive(Deserialize)]
pub struct ServeQuery {
    pub id: Option<String>,
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("application/x-www-form-urlencoded"))
}

/// Read a contact from a JSON or urlencoded form body.
async fn read_contact(request: Request) -> Result<Contact, ApiError> {
    let wrong_format = |e: String| {
        tracing::debug!("Rejected register body: {}", e);
        (StatusCode::BAD_REQUEST, "Wrong data format".to_string())
    };

    if is_form(&request) {
        let Form(contact) = Form::<Contact>::from_request(request, &())
            .await
            .map_err(|e| wrong_format(e.body_text()))?;
        Ok(contact)
    } else {
        let Json(contact) = Json::<Contact>::from_request(request, &())
            .await
            .map_err(|e| wrong_format(e.body_text()))?;
        Ok(contact)
    }
}

/// Register a client. Responds with the ticket at the head of the queue.
pub async fn register_user(
    State(service): State<Arc<QueueService>>,
    request: Request,
) -> Result<Response, ApiError> {
    let contact = read_contact(request).await?;

    let registration = service.register(contact).await.map_err(queue_error)?;
    let header = [(
        TICKET_REFERENCE_HEADER,
        registration.ticket.reference.to_string(),
    )];

    Ok(match registration.now_serving {
        Some(head) => (header, Json(TicketResponse::from(head))).into_response(),
        None => (header, StatusCode::OK).into_response(),
    })
}

/// Close out ticket `id` and respond with the next ticket to call.
pub async fn serve_user(
    State(service): State<Arc<QueueService>>,
    Query(query): Query<ServeQuery>,
) -> Result<Response, ApiError> {
    let reference: Reference = query
        .id
        .as_deref()
        .and_then(|id| id.trim().parse().ok())
        .ok_or((StatusCode::BAD_REQUEST, "Ticket id not found".to_string()))?;

    let next = service.serve_next(reference).await.map_err(queue_error)?;

    Ok(match next {
        Some(ticket) => Json(TicketResponse::from(ticket)).into_response(),
        None => StatusCode::OK.into_response(),
    })
}

/// List all tickets in registration order.
pub async fn list_users(State(service): State<Arc<QueueService>>) -> Json<Vec<TicketResponse>> {
    let tickets = service
        .list_all()
        .await
        .into_iter()
        .map(TicketResponse::from)
        .collect();

    Json(tickets)
}

/// Get a single ticket.
pub async fn get_ticket(
    State(service): State<Arc<QueueService>>,
    Path(reference): Path<Reference>,
) -> Result<Json<TicketResponse>, StatusCode> {
    let ticket = service
        .find(reference)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(Json(TicketResponse::from(ticket)))
}

/// Queue and delivery counters.
pub async fn queue_stats(State(service): State<Arc<QueueService>>) -> Json<QueueStats> {
    Json(service.stats().await)
}
