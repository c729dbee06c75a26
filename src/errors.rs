use std::fmt;

#[derive(Debug, Clone)]
pub enum BuylinkError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    HttpClient(String),
}

impl BuylinkError {
    /// 错误代码
    pub fn code(&self) -> &'static str {
        match self {
            BuylinkError::DatabaseConfig(_) => "E001",
            BuylinkError::DatabaseConnection(_) => "E002",
            BuylinkError::DatabaseOperation(_) => "E003",
            BuylinkError::Validation(_) => "E004",
            BuylinkError::NotFound(_) => "E005",
            BuylinkError::Serialization(_) => "E006",
            BuylinkError::HttpClient(_) => "E007",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            BuylinkError::DatabaseConfig(_) => "Database Configuration Error",
            BuylinkError::DatabaseConnection(_) => "Database Connection Error",
            BuylinkError::DatabaseOperation(_) => "Database Operation Error",
            BuylinkError::Validation(_) => "Validation Error",
            BuylinkError::NotFound(_) => "Resource Not Found",
            BuylinkError::Serialization(_) => "Serialization Error",
            BuylinkError::HttpClient(_) => "HTTP Client Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BuylinkError::DatabaseConfig(msg) => msg,
            BuylinkError::DatabaseConnection(msg) => msg,
            BuylinkError::DatabaseOperation(msg) => msg,
            BuylinkError::Validation(msg) => msg,
            BuylinkError::NotFound(msg) => msg,
            BuylinkError::Serialization(msg) => msg,
            BuylinkError::HttpClient(msg) => msg,
        }
    }
}

impl fmt::Display for BuylinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for BuylinkError {}

// 便捷的构造函数
impl BuylinkError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        BuylinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        BuylinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        BuylinkError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        BuylinkError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        BuylinkError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        BuylinkError::Serialization(msg.into())
    }

    pub fn http_client<T: Into<String>>(msg: T) -> Self {
        BuylinkError::HttpClient(msg.into())
    }
}

impl From<sea_orm::DbErr> for BuylinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        BuylinkError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for BuylinkError {
    fn from(err: std::io::Error) -> Self {
        BuylinkError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for BuylinkError {
    fn from(err: serde_json::Error) -> Self {
        BuylinkError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for BuylinkError {
    fn from(err: url::ParseError) -> Self {
        BuylinkError::Validation(err.to_string())
    }
}

impl From<reqwest::Error> for BuylinkError {
    fn from(err: reqwest::Error) -> Self {
        BuylinkError::HttpClient(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BuylinkError>;
