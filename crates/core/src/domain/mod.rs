pub mod hotel;
pub mod request;
pub mod state;
