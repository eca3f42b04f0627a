use thiserror::Error;

/// Authentication failures. Shown inline on the login/register form.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredential,
    #[error("no account registered for {0}")]
    UnknownIdentity(String),
    #[error("an account already exists for {0}")]
    IdentityExists(String),
    #[error("password must be at least 8 characters long and include uppercase, lowercase, numbers, and special characters")]
    WeakPassword,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("you must be logged in")]
    NotLoggedIn,
}

/// Input failures. Block the submission before any write is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("obtained marks cannot exceed max marks")]
    MarksExceedMax,
    #[error("marks must be within 0..=maxMarks")]
    MarksOutOfRange,
    #[error("file size exceeds {0}MB limit")]
    FileTooLarge(u64),
    #[error("invalid file type. allowed: {0}")]
    BadFileType(&'static str),
    #[error("{0}")]
    BadParams(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("upload failed: {0}")]
    Upload(#[source] std::io::Error),
    #[error("no workspace selected")]
    NoWorkspace,
    #[error("{0}")]
    Remote(String),
}

impl Error {
    /// Stable wire code for the IPC error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Auth(e) => match e {
                AuthError::InvalidCredential => "invalid_credential",
                AuthError::UnknownIdentity(_) => "unknown_identity",
                AuthError::IdentityExists(_) => "identity_exists",
                AuthError::WeakPassword => "weak_password",
                AuthError::PasswordMismatch => "password_mismatch",
                AuthError::NotLoggedIn => "not_logged_in",
            },
            Error::Validation(e) => match e {
                ValidationError::MissingField(_) => "missing_field",
                ValidationError::MarksExceedMax => "marks_exceed_max",
                ValidationError::MarksOutOfRange => "marks_out_of_range",
                ValidationError::FileTooLarge(_) => "file_too_large",
                ValidationError::BadFileType(_) => "bad_file_type",
                ValidationError::BadParams(_) => "bad_params",
            },
            Error::Store(_) => "store_failed",
            Error::Upload(_) => "upload_failed",
            Error::NoWorkspace => "no_workspace",
            Error::Remote(_) => "remote_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
