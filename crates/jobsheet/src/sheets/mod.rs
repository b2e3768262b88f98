mod appender;
pub mod auth;
pub mod client;

pub use appender::{AppendError, SheetAppender};
pub use auth::{AuthError, ServiceAccountAuth, TokenProvider};
pub use client::{AppendResponse, SheetStore, SheetsClient, SheetsError, UpdateSummary};
