pub mod messages;
pub mod request;
pub mod response;
