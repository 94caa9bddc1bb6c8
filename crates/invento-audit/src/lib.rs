//! # invento-audit
//!
//! Activity logging for Invento.
//!
//! Every login, stock change and request decision becomes an
//! [`ActivityEvent`] carrying the client IP and acting user. The
//! [`ActivityLogger`] mirrors each event to `tracing`, keeps the newest ones
//! in memory for the admin activity page and hands them to a storage
//! backend:
//!
//! - **File**: JSON Lines, rotated by size (`app.log`, `app.log.1`, ...)
//! - **Console**: human-readable lines on stdout
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use invento_audit::{ActivityEvent, ActivityKind, ActivityLogger, ConsoleStorage};
//!
//! # async fn example() {
//! let logger = ActivityLogger::with_storage(Arc::new(ConsoleStorage::new()));
//! logger
//!     .record(
//!         ActivityEvent::builder(ActivityKind::ItemAdded, "Item added: Bolts")
//!             .client_ip("10.0.0.7")
//!             .user("1")
//!             .build(),
//!     )
//!     .await;
//! # }
//! ```

pub mod error;
pub mod event;
pub mod logger;
pub mod storage;

pub use error::ActivityError;
pub use event::{ActivityEvent, ActivityEventBuilder, ActivityKind, ActivityLevel};
pub use logger::ActivityLogger;
pub use storage::{ActivityStorage, ConsoleStorage, DualStorage, NullStorage, RotatingFileStorage};
