pub mod clients;
pub mod connection_string;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod signing;
pub mod state;
