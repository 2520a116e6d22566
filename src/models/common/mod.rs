pub mod fields;
pub mod pagination;
pub mod response;

pub use fields::{deserialize_non_blank, deserialize_optional_i64};
pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
