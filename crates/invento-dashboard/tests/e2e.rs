//! End-to-end tests driving the dashboard router in-process.
//!
//! Each test gets its own SQLite file seeded with the default stock and
//! accounts, and talks to the router through `tower::ServiceExt::oneshot`,
//! carrying the session cookie and CSRF token between requests like a
//! browser would.
//!
//! Test modules are organized by feature area:
//! - `auth` - login, logout, CSRF, session expiry
//! - `inventory` - adding and deleting items
//! - `requests` - submitting, approving and rejecting restock requests
//! - `activity` - activity log recording and the admin page
//!
//! Run with:
//!   cargo test -p invento-dashboard --test e2e

#[path = "e2e/common/mod.rs"]
mod common;

#[path = "e2e/activity.rs"]
mod activity;

#[path = "e2e/auth.rs"]
mod auth;

#[path = "e2e/inventory.rs"]
mod inventory;

#[path = "e2e/requests.rs"]
mod requests;
