mod assembler;
mod history;
mod message;
mod registry;
mod room;
mod types;

pub use assembler::*;
pub use history::*;
pub use message::*;
pub use registry::*;
pub use room::*;
pub use types::*;

pub extern crate euclid;
pub extern crate serde;
pub extern crate serde_json;
