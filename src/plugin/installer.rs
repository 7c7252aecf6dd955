use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("enter plugin code before installing")]
    EmptyCode,
}

/// What the install form hands to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub code: String,
    pub style: Option<String>,
}

impl InstallRequest {
    /// Both fields are trimmed; an empty style field means no style.
    pub fn from_form(code_input: &str, style_input: &str) -> Result<Self, FormError> {
        let code = code_input.trim();
        if code.is_empty() {
            return Err(FormError::EmptyCode);
        }

        let style = style_input.trim();
        Ok(Self {
            code: code.to_string(),
            style: (!style.is_empty()).then(|| style.to_string()),
        })
    }
}
