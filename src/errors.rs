//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_onsite_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum OnsiteError {
            $($variant(String),)*
        }

        impl OnsiteError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(OnsiteError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(OnsiteError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(OnsiteError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl OnsiteError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        OnsiteError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_onsite_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    FileOperation("E004", "File Operation Error"),
    Validation("E005", "Validation Error"),
    NotFound("E006", "Resource Not Found"),
    Conflict("E007", "Resource Conflict"),
    Serialization("E008", "Serialization Error"),
    DateParse("E009", "Date Parse Error"),
    Scheduler("E010", "Scheduler Error"),
}

impl OnsiteError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for OnsiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for OnsiteError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for OnsiteError {
    fn from(err: sea_orm::DbErr) -> Self {
        OnsiteError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for OnsiteError {
    fn from(err: std::io::Error) -> Self {
        OnsiteError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for OnsiteError {
    fn from(err: serde_json::Error) -> Self {
        OnsiteError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for OnsiteError {
    fn from(err: chrono::ParseError) -> Self {
        OnsiteError::DateParse(err.to_string())
    }
}

impl From<OnsiteError> for std::io::Error {
    fn from(err: OnsiteError) -> Self {
        std::io::Error::other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OnsiteError>;
