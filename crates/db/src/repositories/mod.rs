//! Database repositories.

mod follow;
mod follow_request;
mod notification;
mod user;

pub use follow::FollowRepository;
pub use follow_request::FollowRequestRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;
