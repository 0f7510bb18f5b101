pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod payment;
pub mod sink;
