// Builders for envelope bodies returned by the mock users endpoint

use serde_json::{Value, json};

pub struct EnvelopeBuilder {
    success: bool,
    message: String,
    data: Option<Value>,
}

impl EnvelopeBuilder {
    pub fn success() -> Self {
        Self {
            success: true,
            message: "Success".to_string(),
            data: None,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn build(self) -> Value {
        let mut body = json!({
            "success": self.success,
            "message": self.message,
        });

        if let Some(data) = self.data {
            body["data"] = data;
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_builder_omits_missing_data() {
        let body = EnvelopeBuilder::failure("duplicate email").build();
        assert_eq!(body, json!({"success": false, "message": "duplicate email"}));
    }
}
