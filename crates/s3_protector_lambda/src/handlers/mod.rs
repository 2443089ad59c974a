pub mod change_event;
pub mod remediation;

pub use change_event::{handle_change_event, HandlerError};
pub use remediation::{Outcome, Remediator};
