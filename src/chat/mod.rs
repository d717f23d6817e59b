mod apply;
mod session;

pub use apply::{ActivationPolicy, ApplyOutcome, activate_first_extracted_file, apply_reply};
pub use session::{ChatSession, ChatSettings};
