use std::fmt;

/// Machine-readable error codes shared by the server logs and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissing,
    ConfigParseError,
    StoreOpenFailed,
    ValidationFailed,
    BugNotFound,
    MissingId,
    MalformedRequest,
    RouteNotFound,
    SchemaViolation,
    StoreFailure,
    StoreClosed,
    ForcedFailure,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigMissing => "E1001",
            Self::ConfigParseError => "E1002",
            Self::StoreOpenFailed => "E1003",
            Self::ValidationFailed => "E2001",
            Self::BugNotFound => "E2002",
            Self::MissingId => "E2003",
            Self::MalformedRequest => "E2004",
            Self::RouteNotFound => "E2005",
            Self::SchemaViolation => "E3001",
            Self::StoreFailure => "E3002",
            Self::StoreClosed => "E3003",
            Self::ForcedFailure => "E9002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigMissing => "Required configuration missing",
            Self::ConfigParseError => "Config file parse error",
            Self::StoreOpenFailed => "Could not open the document store",
            Self::ValidationFailed => "Validation failed",
            Self::BugNotFound => "Bug not found",
            Self::MissingId => "Bug id is required",
            Self::MalformedRequest => "Malformed request",
            Self::RouteNotFound => "Route not found",
            Self::SchemaViolation => "Record violates the bug schema",
            Self::StoreFailure => "Document store operation failed",
            Self::StoreClosed => "Document store is closed",
            Self::ForcedFailure => "Forced failure for debugging practice",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigMissing => Some("Set DATABASE_URL or pass --database-url."),
            Self::ConfigParseError => Some("Fix syntax in bugtrack.toml and retry."),
            Self::StoreOpenFailed => Some("Check the database path and its permissions."),
            Self::ValidationFailed => Some("Fix the fields listed in `details` and resubmit."),
            Self::BugNotFound => Some("List bugs to find a valid id."),
            Self::MissingId => Some("Include the bug id in the request path."),
            Self::MalformedRequest => Some("Send a JSON object body."),
            Self::RouteNotFound | Self::SchemaViolation => None,
            Self::StoreFailure => Some("Retry once. If persistent, check the server logs."),
            Self::StoreClosed => Some("Restart the server."),
            Self::ForcedFailure => Some("Unset DEBUG_FORCE_CREATE_FAILURE."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// HTTP status the boundary layer answers with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::ValidationFailed => 422,
            Self::BugNotFound | Self::RouteNotFound => 404,
            Self::MissingId | Self::MalformedRequest => 400,
            Self::ConfigMissing
            | Self::ConfigParseError
            | Self::StoreOpenFailed
            | Self::SchemaViolation
            | Self::StoreFailure
            | Self::StoreClosed
            | Self::ForcedFailure
            | Self::InternalUnexpected => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
