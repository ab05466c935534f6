use serde::{Deserialize, Serialize};

/// JSON envelope wrapping every API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::ApiResponse;

    #[test]
    fn error_envelope_has_no_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error("Title is required")).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
        assert_eq!(json["message"], "Title is required");
    }

    #[test]
    fn success_envelope_decodes_payload() {
        let raw = r#"{"success":true,"data":[1,2,3],"message":null}"#;
        let response: ApiResponse<Vec<u32>> = serde_json::from_str(raw).unwrap();
        assert!(response.is_success());
        assert_eq!(response.into_data(), Some(vec![1, 2, 3]));
    }
}
