use std::fmt;

// Record-level rule violations shared by the validator and the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestRuleError {
    EmptyId,
    EmptyName,
    PassesOutOfRange(u32),
    ConfirmedAbovePasses { confirmed: u32, passes: u32 },
}

impl fmt::Display for GuestRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuestRuleError::EmptyId => write!(f, "id is required"),
            GuestRuleError::EmptyName => write!(f, "name is required"),
            GuestRuleError::PassesOutOfRange(passes) => {
                write!(f, "passes must be between 1 and 20, got {passes}")
            }
            GuestRuleError::ConfirmedAbovePasses { confirmed, passes } => {
                write!(f, "confirmed ({confirmed}) cannot exceed passes ({passes})")
            }
        }
    }
}

impl std::error::Error for GuestRuleError {}

// Failures raised by a guest store backend.
#[derive(Debug)]
pub enum StoreError {
    ReadFailed(String),
    WriteFailed(String),
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ReadFailed(reason) => write!(f, "could not read guests: {reason}"),
            StoreError::WriteFailed(reason) => write!(f, "could not save guests: {reason}"),
            StoreError::Backend(reason) => write!(f, "guest store error: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

// Errors returned by guest directory operations.
#[derive(Debug)]
pub enum DirectoryError {
    InvalidName,
    InvalidPasses(u32),
    InvalidConfirmation { confirmed: u32, passes: u32 },
    InvalidFile(String),
    Export(String),
    Storage(StoreError),
}

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        DirectoryError::Storage(err)
    }
}

impl From<GuestRuleError> for DirectoryError {
    fn from(err: GuestRuleError) -> Self {
        match err {
            GuestRuleError::EmptyId | GuestRuleError::EmptyName => DirectoryError::InvalidName,
            GuestRuleError::PassesOutOfRange(passes) => DirectoryError::InvalidPasses(passes),
            GuestRuleError::ConfirmedAbovePasses { confirmed, passes } => {
                DirectoryError::InvalidConfirmation { confirmed, passes }
            }
        }
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::InvalidName => write!(f, "name is required"),
            DirectoryError::InvalidPasses(passes) => {
                write!(f, "passes must be between 1 and 20, got {passes}")
            }
            DirectoryError::InvalidConfirmation { confirmed, passes } => {
                write!(f, "confirmed ({confirmed}) cannot exceed passes ({passes})")
            }
            DirectoryError::InvalidFile(reason) => write!(f, "invalid file: {reason}"),
            DirectoryError::Export(reason) => write!(f, "could not export guests: {reason}"),
            DirectoryError::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

// Domain-level errors for the admin sign-in flow.
#[derive(Debug)]
pub enum AdminAuthError {
    InvalidCredentials,
    InvalidToken,
    SessionExpired,
    StorageFailure,
}
