pub mod bson;
pub mod discord;
