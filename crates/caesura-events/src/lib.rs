#![forbid(unsafe_code)]

mod bus;
mod event;
mod insert;
mod ssai;

pub use bus::EventBus;
pub use event::Event;
pub use insert::{ErrorScope, InsertEvent};
pub use ssai::SsaiEvent;
