pub mod copy;
pub mod dispatch;
pub mod error;
pub mod notify;
