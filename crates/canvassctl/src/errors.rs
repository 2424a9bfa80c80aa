//! Exit status for canvassctl

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the form input was rejected (nothing was changed or sent)
pub const EXIT_INVALID_INPUT: i32 = 65;

/// Exit code when the referenced marker does not exist in the working set
pub const EXIT_NOT_FOUND: i32 = 66;
