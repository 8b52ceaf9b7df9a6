//! Process exit codes for `spendgate`.

/// Successful operation.
pub const EXIT_SUCCESS: i32 = 0;

/// The spend policy denied the transaction.
pub const EXIT_POLICY_DENIED: i32 = 1;

/// Any other error: configuration, storage, invalid input, broadcast failure.
pub const EXIT_ERROR: i32 = 2;
