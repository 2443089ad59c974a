/// Failure of a single call to S3, S3 Control or STS.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct RemoteCallError {
    pub operation: &'static str,
    /// HTTP status of the response, absent for transport and timeout errors.
    pub status_code: Option<u16>,
    /// Service error code such as `AccessDenied` or `NoSuchBucket`.
    pub code: Option<String>,
    pub message: String,
}

impl RemoteCallError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            status_code: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The service answered, but with a non-success status.
    pub fn is_rejection(&self) -> bool {
        self.status_code.is_some_and(|status| status >= 300)
    }
}
