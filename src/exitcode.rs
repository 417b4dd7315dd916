//! Exit codes
//!
//! Every failure exits with 1, like an uncaught error would. The constants
//! name the cause so call sites read clearly.

/// Generic failure
pub const FAILURE: i32 = 1;

/// Profile could not be resolved from the config file
pub const CONFIG: i32 = 1;

/// Remote API call failed
pub const REMOTE: i32 = 1;
