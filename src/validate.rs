use crate::error::ValidationError;

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Registration password policy: at least 8 characters with uppercase,
/// lowercase, a digit, and one special character.
pub fn password_is_strong(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| SPECIAL_CHARS.contains(c))
}

/// Size and content-type limits for a file attachment.
#[derive(Debug, Clone, Copy)]
pub struct FileRules {
    pub max_size_mb: u64,
    pub allowed_types: &'static [&'static str],
    allowed_label: &'static str,
}

/// Homework attachments: 5 MB, images or PDF.
pub const HOMEWORK_ATTACHMENT: FileRules = FileRules {
    max_size_mb: 5,
    allowed_types: &["image/jpeg", "image/png", "application/pdf"],
    allowed_label: "JPEG, PNG, PDF",
};

/// Profile photos: 2 MB, images only.
pub const PROFILE_PHOTO: FileRules = FileRules {
    max_size_mb: 2,
    allowed_types: &["image/jpeg", "image/png"],
    allowed_label: "JPEG, PNG",
};

impl FileRules {
    pub fn check(&self, mime_type: &str, size_bytes: u64) -> Result<(), ValidationError> {
        if size_bytes > self.max_size_mb * 1024 * 1024 {
            return Err(ValidationError::FileTooLarge(self.max_size_mb));
        }
        if !self.allowed_types.contains(&mime_type) {
            return Err(ValidationError::BadFileType(self.allowed_label));
        }
        Ok(())
    }
}

/// Guesses a content type from the file extension when the caller does not
/// supply one. Unknown extensions come back as octet-stream and fail the
/// allow-list check downstream.
pub fn mime_from_name(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Sessional-mark invariant: `0 <= marks <= max_marks`.
pub fn check_marks(marks: i64, max_marks: i64) -> Result<(), ValidationError> {
    if marks > max_marks {
        return Err(ValidationError::MarksExceedMax);
    }
    if marks < 0 || max_marks <= 0 {
        return Err(ValidationError::MarksOutOfRange);
    }
    Ok(())
}
