use std::fmt;

#[derive(Debug, Clone)]
pub enum IpLocatorError {
    /// Transport-level failure, the provider never responded
    ProviderUnreachable(String),
    /// The provider responded with an explicit error envelope
    ProviderError(String),
    StoreError(String),
    CacheError(String),
    NoAddressAvailable(String),
    InvalidInput(String),
    Cancelled(String),
    Config(String),
    Serialization(String),
}

impl IpLocatorError {
    /// Get the error code
    pub fn code(&self) -> &'static str {
        match self {
            IpLocatorError::ProviderUnreachable(_) => "E001",
            IpLocatorError::ProviderError(_) => "E002",
            IpLocatorError::StoreError(_) => "E003",
            IpLocatorError::CacheError(_) => "E004",
            IpLocatorError::NoAddressAvailable(_) => "E005",
            IpLocatorError::InvalidInput(_) => "E006",
            IpLocatorError::Cancelled(_) => "E007",
            IpLocatorError::Config(_) => "E008",
            IpLocatorError::Serialization(_) => "E009",
        }
    }

    /// Get the error type name
    pub fn error_type(&self) -> &'static str {
        match self {
            IpLocatorError::ProviderUnreachable(_) => "Provider Unreachable",
            IpLocatorError::ProviderError(_) => "Provider Error",
            IpLocatorError::StoreError(_) => "Store Error",
            IpLocatorError::CacheError(_) => "Cache Error",
            IpLocatorError::NoAddressAvailable(_) => "No Address Available",
            IpLocatorError::InvalidInput(_) => "Invalid Input",
            IpLocatorError::Cancelled(_) => "Request Cancelled",
            IpLocatorError::Config(_) => "Configuration Error",
            IpLocatorError::Serialization(_) => "Serialization Error",
        }
    }

    /// Get the error details
    pub fn message(&self) -> &str {
        match self {
            IpLocatorError::ProviderUnreachable(msg) => msg,
            IpLocatorError::ProviderError(msg) => msg,
            IpLocatorError::StoreError(msg) => msg,
            IpLocatorError::CacheError(msg) => msg,
            IpLocatorError::NoAddressAvailable(msg) => msg,
            IpLocatorError::InvalidInput(msg) => msg,
            IpLocatorError::Cancelled(msg) => msg,
            IpLocatorError::Config(msg) => msg,
            IpLocatorError::Serialization(msg) => msg,
        }
    }
}

impl fmt::Display for IpLocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for IpLocatorError {}

// Convenience constructors
impl IpLocatorError {
    pub fn provider_unreachable<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::ProviderUnreachable(msg.into())
    }

    pub fn provider_error<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::ProviderError(msg.into())
    }

    pub fn store_error<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::StoreError(msg.into())
    }

    pub fn cache_error<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::CacheError(msg.into())
    }

    pub fn no_address_available<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::NoAddressAvailable(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::InvalidInput(msg.into())
    }

    pub fn cancelled<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::Cancelled(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::Config(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        IpLocatorError::Serialization(msg.into())
    }
}

// From impls for common error types
impl From<sea_orm::DbErr> for IpLocatorError {
    fn from(err: sea_orm::DbErr) -> Self {
        IpLocatorError::StoreError(err.to_string())
    }
}

impl From<serde_json::Error> for IpLocatorError {
    fn from(err: serde_json::Error) -> Self {
        IpLocatorError::Serialization(err.to_string())
    }
}

impl From<std::net::AddrParseError> for IpLocatorError {
    fn from(err: std::net::AddrParseError) -> Self {
        IpLocatorError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IpLocatorError>;
