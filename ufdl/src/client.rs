pub(crate) mod actions;
pub(crate) mod connection;
mod datasets;
mod jobs;
mod transfer;
mod users;
