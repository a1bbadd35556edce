pub mod demo;
pub mod export;
pub mod info;
pub mod inspect;
pub mod server;
