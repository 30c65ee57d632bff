//! API route handlers
//!
//! This module contains all route handlers organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Registration, login, refresh, verification flows
//! - `users`: Profile, password, email change, role grants
//! - `projects`: Projects and memberships
//! - `invitations`: Invitation lifecycle
//! - `boards`: Boards
//! - `columns`: Ordered columns
//! - `tasks`: Ordered tasks, assignees
//! - `time_entries`: Time tracking

pub mod auth;
pub mod boards;
pub mod columns;
pub mod health;
pub mod invitations;
pub mod projects;
pub mod tasks;
pub mod time_entries;
pub mod users;
