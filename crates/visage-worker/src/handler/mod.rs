//! Avatar job processing handlers.

mod avatar;

pub use avatar::AvatarWorker;
