pub mod admin;
pub mod model;
pub mod player;
pub mod server;
pub mod websocket;

pub use server::serve;
