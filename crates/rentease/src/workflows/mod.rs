pub mod documents;
pub mod messaging;
pub mod notify;
pub mod rent;
pub mod store;
