//! Business logic services.

pub mod follow;
pub mod notification;
pub mod user;

pub use follow::{FollowOutcome, FollowService};
pub use notification::NotificationService;
pub use user::{CreateUserInput, UserService};
