pub mod dispatch;
pub mod markers;
pub mod pipeline;
pub mod provider;
pub mod retry;
