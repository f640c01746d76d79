pub mod channel;
pub mod dispatch;
pub mod health;
pub mod payload;
pub mod request;
pub mod response;
pub mod reward;
pub mod validation;
