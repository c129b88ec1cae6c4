use super::models::PostContent;
use crate::common::{ValidationResult, Validator};

impl Validator<PostContent> for PostContent {
    fn validate(&self, data: &PostContent) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.check_length("title", &data.title, 8, 256);
        result.check_length("description", &data.description, 8, 256);

        if !data.pay.is_finite() || data.pay < 0.0 {
            result.add_error("pay", "Pay must be a non-negative amount");
        }

        if data.time_est <= 0 {
            result.add_error("time_est", "Time estimate must be a positive number of minutes");
        }

        result
    }
}
