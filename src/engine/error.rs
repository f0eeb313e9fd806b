/// Why a draft appointment was refused. Recoverable, local to one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidInterval,
    OutOfWindow { start_hour: u32, end_hour: u32 },
    TooShort { min_minutes: u32 },
    TooLong { max_minutes: u32 },
    SlotUnavailable,
}

impl ValidationError {
    /// Stable identifier for the failed rule.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidInterval => "invalid_interval",
            ValidationError::OutOfWindow { .. } => "out_of_window",
            ValidationError::TooShort { .. } => "too_short",
            ValidationError::TooLong { .. } => "too_long",
            ValidationError::SlotUnavailable => "slot_unavailable",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "missing field: {field}"),
            ValidationError::InvalidInterval => write!(f, "end must be after start"),
            ValidationError::OutOfWindow {
                start_hour,
                end_hour,
            } => {
                write!(f, "outside working hours [{start_hour}:00, {end_hour}:00]")
            }
            ValidationError::TooShort { min_minutes } => {
                write!(f, "shorter than {min_minutes} minutes")
            }
            ValidationError::TooLong { max_minutes } => {
                write!(f, "longer than {max_minutes} minutes")
            }
            ValidationError::SlotUnavailable => write!(f, "slot unavailable"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Invalid(ValidationError),
    NotFound(String),
    AlreadyExists(String),
    LimitExceeded(&'static str),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Invalid(e) => e.code(),
            EngineError::NotFound(_) => "not_found",
            EngineError::AlreadyExists(_) => "already_exists",
            EngineError::LimitExceeded(_) => "limit_exceeded",
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(e: ValidationError) -> Self {
        EngineError::Invalid(e)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Invalid(e) => write!(f, "{e}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}
