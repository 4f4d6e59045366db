pub mod event;
pub mod maze;
pub mod phase;
pub mod session;
pub mod snapshot;
pub mod step;
