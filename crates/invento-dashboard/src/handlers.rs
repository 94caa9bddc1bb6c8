//! Request handlers for the dashboard pages and form posts.

use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::{Form, Json};
use invento_audit::ActivityKind;
use invento_core::{NewItem, NewRequest, RequestAction};
use invento_store::InventoryChange;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{ActivityContext, CurrentUser};
use crate::error::DashboardError;
use crate::pages;
use crate::session::{FlashLevel, Session};
use crate::state::AppState;

/// Events shown on the activity page.
const ACTIVITY_PAGE_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequestForm {
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionForm {
    #[serde(default)]
    pub price: Option<String>,
}

/// Liveness probe.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "invento" }))
}

/// Inventory and restock requests.
///
/// A failing query is reported as a flash and an empty page rather than an
/// error response.
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    session: Session,
    activity: ActivityContext,
) -> Html<String> {
    let (inventory, requests) = match state.store().list_inventory().await {
        Ok(inventory) => {
            let requests = match state.store().list_requests().await {
                Ok(requests) => requests,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to fetch requests, returning empty list");
                    Vec::new()
                }
            };
            (inventory, requests)
        }
        Err(e) => {
            activity
                .record(
                    ActivityKind::DatabaseError,
                    format!("Database query failed in index: {e}"),
                )
                .await;
            session.flash(FlashLevel::Error, "Error accessing database");
            (Vec::new(), Vec::new())
        }
    };

    Html(pages::index_page(
        &user,
        &session.csrf_token(),
        &session.take_flashes(),
        &inventory,
        &requests,
    ))
}

/// Add an inventory row (admin only).
pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    session: Session,
    activity: ActivityContext,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, DashboardError> {
    let result: Result<(i64, NewItem), DashboardError> = async {
        user.require_admin()?;
        let item = NewItem::parse(
            form.name.as_deref(),
            form.quantity.as_deref(),
            form.price.as_deref(),
        )?;
        let id = state.store().add_item(&item).await?;
        Ok((id, item))
    }
    .await;
    let (id, item) = activity.outcome("Item addition", result).await?;

    activity
        .record_event(
            activity
                .event(ActivityKind::ItemAdded, format!("Added item: {}", item.name))
                .detail(json!({ "item_id": id, "quantity": item.quantity, "price": item.price }))
                .build(),
        )
        .await;
    session.flash(FlashLevel::Success, "Item added successfully");
    Ok(Redirect::to("/"))
}

/// Delete an inventory row (admin only).
pub async fn delete_item(
    State(state): State<AppState>,
    user: CurrentUser,
    session: Session,
    activity: ActivityContext,
    Path(item_id): Path<i64>,
) -> Result<Redirect, DashboardError> {
    let result = async {
        user.require_admin()?;
        Ok::<_, DashboardError>(state.store().delete_item(item_id).await?)
    }
    .await;
    let deleted = activity
        .outcome(&format!("Deletion of item ID {item_id}"), result)
        .await?;

    activity
        .record_event(
            activity
                .event(ActivityKind::ItemDeleted, format!("Deleted item ID: {item_id}"))
                .detail(json!({ "item_id": item_id, "name": deleted.name }))
                .build(),
        )
        .await;
    session.flash(FlashLevel::Success, "Item deleted successfully");
    Ok(Redirect::to("/"))
}

/// File a restock request for the session user.
pub async fn submit_request(
    State(state): State<AppState>,
    user: CurrentUser,
    session: Session,
    activity: ActivityContext,
    Form(form): Form<RequestForm>,
) -> Result<Redirect, DashboardError> {
    let result = async {
        let request = NewRequest::parse(form.item_name.as_deref(), form.quantity.as_deref())?;
        let id = state.store().create_request(&request, user.id).await?;
        Ok::<_, DashboardError>((id, request))
    }
    .await;
    let (id, request) = activity.outcome("Request submission", result).await?;

    activity
        .record_event(
            activity
                .event(
                    ActivityKind::RequestSubmitted,
                    format!("Added request for item: {}", request.item_name),
                )
                .detail(json!({ "request_id": id, "quantity": request.quantity }))
                .build(),
        )
        .await;
    session.flash(FlashLevel::Success, "Request submitted successfully");
    Ok(Redirect::to("/"))
}

/// Approve or reject a pending request (admin only).
///
/// Checks run in order: role, action name, then the store's own checks
/// (request exists, submitter exists, still pending, price).
pub async fn decide_request(
    State(state): State<AppState>,
    user: CurrentUser,
    session: Session,
    activity: ActivityContext,
    Path((request_id, action)): Path<(i64, String)>,
    Form(form): Form<DecisionForm>,
) -> Result<Redirect, DashboardError> {
    let result = async {
        user.require_admin()?;
        let action = RequestAction::parse(&action)?;
        let outcome = state
            .store()
            .decide_request(request_id, action, form.price.as_deref())
            .await?;
        Ok::<_, DashboardError>((action, outcome))
    }
    .await;
    let (action, outcome) = activity
        .outcome(&format!("Decision on request ID {request_id}"), result)
        .await?;

    let kind = match action {
        RequestAction::Approve => ActivityKind::RequestApproved,
        RequestAction::Reject => ActivityKind::RequestRejected,
    };
    let detail = match outcome.inventory {
        Some(InventoryChange::Restocked { item_id, quantity, price }) => {
            json!({ "request_id": request_id, "item_id": item_id, "new_quantity": quantity, "price": price })
        }
        Some(InventoryChange::Created { item_id, quantity, price }) => {
            json!({ "request_id": request_id, "item_id": item_id, "created": true, "quantity": quantity, "price": price })
        }
        None => json!({ "request_id": request_id }),
    };
    activity
        .record_event(
            activity
                .event(
                    kind,
                    format!("Request ID {request_id} {} successfully", action.past_tense()),
                )
                .detail(detail)
                .build(),
        )
        .await;

    session.flash(
        FlashLevel::Success,
        format!("Request {} successfully", action.past_tense()),
    );
    Ok(Redirect::to("/"))
}

/// Recent activity (admin only).
pub async fn activity_log(
    State(state): State<AppState>,
    user: CurrentUser,
    session: Session,
    activity: ActivityContext,
) -> Result<Html<String>, DashboardError> {
    activity
        .outcome("Viewing activity log", user.require_admin())
        .await?;

    let events = state.activity().recent(ACTIVITY_PAGE_LIMIT);
    Ok(Html(pages::activity_page(
        &user,
        &session.take_flashes(),
        &events,
    )))
}
