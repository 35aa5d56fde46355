/*!
 * Exercise session.
 *
 * This module provides:
 * - The session state machine owning the host page and every store
 * - Host event routing to the component owning a subscription or timer
 * - Notifications for UI layers
 */

pub mod manager;
pub mod models;

// Re-export main types
pub use manager::ExerciseSession;
pub use models::SessionNotification;
