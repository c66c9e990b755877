// Interface adapters: HTTP client, wire protocol, session storage and terminal output.

pub mod clients;
pub mod display;
pub mod export;
pub mod protocol;
pub mod store;
