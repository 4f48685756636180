mod serialize;
mod types;

pub use types::ClientCommand;
