//! Process exit codes.
//! These codes are part of the CLI contract; scripts may depend on them.

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1; // Usage error, unknown id, rejected request
pub const INTERNAL_ERROR: i32 = 2; // Config error or unexpected server response
pub const NETWORK_ERROR: i32 = 5; // Server unreachable or timed out
