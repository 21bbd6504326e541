pub mod approval;
pub mod attachment;
pub mod request;
pub mod status;
