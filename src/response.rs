use serde::Serialize;
use utoipa::ToSchema;

/// Uniform envelope for every endpoint: a human-readable message plus the
/// payload. Error responses reuse the same shape, carrying error detail in
/// `data`. Nothing here paginates; listings return complete result sets.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}
