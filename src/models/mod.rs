pub mod event;
pub mod user;

pub use event::{Event, EventPatch, EventStatus, NewEvent};
pub use user::{User, UserRole, UserUpsert};
