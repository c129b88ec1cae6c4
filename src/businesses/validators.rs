use super::models::{CreateBusinessRequest, UpdateBusinessRequest};
use crate::common::{ValidationResult, Validator};

fn validate_fields(result: &mut ValidationResult, name: &str, website: &str, description: &str) {
    result.check_length("name", name, 3, 64);
    result.check_http_url("website", website.trim());
    result.check_length("description", description, 8, 256);
}

impl Validator<CreateBusinessRequest> for CreateBusinessRequest {
    fn validate(&self, data: &CreateBusinessRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_fields(&mut result, &data.name, &data.website, &data.description);

        if let Some(logo) = &data.logo {
            if logo.trim().is_empty() || logo.len() > 512 {
                result.add_error("logo", "Logo reference must be between 1 and 512 characters");
            }
        }

        result
    }
}

impl Validator<UpdateBusinessRequest> for UpdateBusinessRequest {
    fn validate(&self, data: &UpdateBusinessRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        validate_fields(&mut result, &data.name, &data.website, &data.description);
        result
    }
}
