// Session Controller: typed state machine plus the actions that drive it.

pub mod controller;
pub mod handlers;
pub mod state;

pub use controller::{SessionController, SessionError};
pub use state::{SessionPhase, SessionState};
