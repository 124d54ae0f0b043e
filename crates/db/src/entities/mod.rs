//! Database entities.

pub mod follow;
pub mod follow_request;
pub mod notification;
pub mod user;

pub use follow::Entity as Follow;
pub use follow_request::Entity as FollowRequest;
pub use notification::Entity as Notification;
pub use user::Entity as User;
