mod booking;
mod property;
mod user;

pub use booking::*;
pub use property::*;
pub use user::*;
