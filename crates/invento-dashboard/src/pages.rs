//! Full dashboard pages.

use invento_audit::{ActivityEvent, ActivityLevel};
use invento_core::{InventoryItem, RequestStatus, RequestSummary};

use crate::session::{Flash, SessionUser};
use crate::templates::{badge, card, csrf_input, empty_state, html_escape, layout, table};

pub fn login_page(csrf_token: &str, flashes: &[Flash]) -> String {
    let form = format!(
        r#"<form method="POST" action="/login" class="stack">
            {csrf}
            <label>Username <input type="text" name="username" maxlength="50" required autofocus></label>
            <label>Password <input type="password" name="password" required></label>
            <label>Role
                <select name="role" required>
                    <option value="worker">Worker</option>
                    <option value="admin">Admin</option>
                </select>
            </label>
            <button type="submit">Sign in</button>
        </form>"#,
        csrf = csrf_input(csrf_token),
    );

    layout(
        "Login",
        None,
        flashes,
        &format!(r#"<div class="login">{}</div>"#, card("Sign in", &form)),
    )
}

pub fn index_page(
    user: &SessionUser,
    csrf_token: &str,
    flashes: &[Flash],
    inventory: &[InventoryItem],
    requests: &[RequestSummary],
) -> String {
    let is_admin = user.role.is_admin();
    let mut content = String::new();

    content.push_str(&card("Inventory", &inventory_table(inventory, is_admin, csrf_token)));
    if is_admin {
        content.push_str(&card("Add item", &add_item_form(csrf_token)));
    }
    content.push_str(&card("Request restock", &request_form(csrf_token)));
    content.push_str(&card(
        "Restock requests",
        &requests_table(requests, is_admin, csrf_token),
    ));

    layout("Inventory", Some(user), flashes, &content)
}

fn inventory_table(items: &[InventoryItem], is_admin: bool, csrf_token: &str) -> String {
    if items.is_empty() {
        return empty_state("No items", "The inventory is empty.");
    }

    let mut headers = vec!["ID", "Name", "Quantity", "Price"];
    if is_admin {
        headers.push("");
    }

    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            let mut row = vec![
                item.id.to_string(),
                html_escape(&item.name),
                item.quantity.to_string(),
                format!("{:.2}", item.price),
            ];
            if is_admin {
                row.push(format!(
                    r#"<form method="POST" action="/items/{id}/delete" class="inline">
                        {csrf}
                        <button type="submit" class="danger">Delete</button>
                    </form>"#,
                    id = item.id,
                    csrf = csrf_input(csrf_token),
                ));
            }
            row
        })
        .collect();

    table(&headers, &rows)
}

fn add_item_form(csrf_token: &str) -> String {
    format!(
        r#"<form method="POST" action="/items" class="stack">
            {csrf}
            <input type="text" name="name" placeholder="Item name" maxlength="100" required>
            <input type="number" name="quantity" placeholder="Quantity" min="0" required>
            <input type="number" name="price" placeholder="Price" min="0" step="0.01" required>
            <button type="submit">Add item</button>
        </form>"#,
        csrf = csrf_input(csrf_token),
    )
}

fn request_form(csrf_token: &str) -> String {
    format!(
        r#"<form method="POST" action="/requests" class="stack">
            {csrf}
            <input type="text" name="item_name" placeholder="Item name" maxlength="100" required>
            <input type="number" name="quantity" placeholder="Quantity" min="1" required>
            <button type="submit">Submit request</button>
        </form>"#,
        csrf = csrf_input(csrf_token),
    )
}

fn status_badge(status: RequestStatus) -> String {
    let color = match status {
        RequestStatus::Pending => "yellow",
        RequestStatus::Approved => "green",
        RequestStatus::Rejected => "red",
    };
    badge(status.as_str(), color)
}

fn requests_table(requests: &[RequestSummary], is_admin: bool, csrf_token: &str) -> String {
    if requests.is_empty() {
        return empty_state("No requests", "Nobody has asked for a restock yet.");
    }

    let mut headers = vec!["ID", "Item", "Quantity", "Requested by", "Status"];
    if is_admin {
        headers.push("");
    }

    let rows: Vec<Vec<String>> = requests
        .iter()
        .map(|req| {
            let mut row = vec![
                req.id.to_string(),
                html_escape(&req.item_name),
                req.quantity.to_string(),
                html_escape(&req.username),
                status_badge(req.status),
            ];
            if is_admin {
                row.push(if req.status == RequestStatus::Pending {
                    decision_forms(req.id, csrf_token)
                } else {
                    String::new()
                });
            }
            row
        })
        .collect();

    table(&headers, &rows)
}

fn decision_forms(request_id: i64, csrf_token: &str) -> String {
    let csrf = csrf_input(csrf_token);
    format!(
        r#"<form method="POST" action="/requests/{request_id}/approve" class="inline">
            {csrf}
            <input type="number" name="price" placeholder="Price" min="0" step="0.01" required>
            <button type="submit" class="success">Approve</button>
        </form>
        <form method="POST" action="/requests/{request_id}/reject" class="inline">
            {csrf}
            <button type="submit" class="danger">Reject</button>
        </form>"#
    )
}

pub fn activity_page(user: &SessionUser, flashes: &[Flash], events: &[ActivityEvent]) -> String {
    let body = if events.is_empty() {
        empty_state("No activity", "Nothing has been recorded since the server started.")
    } else {
        let rows: Vec<Vec<String>> = events
            .iter()
            .map(|e| {
                let color = match e.level {
                    ActivityLevel::Error => "red",
                    ActivityLevel::Warning => "yellow",
                    ActivityLevel::Info | ActivityLevel::Debug => "gray",
                };
                vec![
                    e.occurred_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    badge(&e.level.to_string(), color),
                    e.kind.to_string(),
                    html_escape(&e.message),
                    html_escape(&e.client_ip),
                    html_escape(&e.user),
                ]
            })
            .collect();
        table(&["Time", "Level", "Event", "Message", "IP", "User"], &rows)
    };

    layout("Activity", Some(user), flashes, &card("Recent activity", &body))
}
