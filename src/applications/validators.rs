use super::models::ApplicationNotesRequest;
use crate::common::{ValidationResult, Validator};

const MAX_NOTES_LENGTH: usize = 2048;

impl Validator<ApplicationNotesRequest> for ApplicationNotesRequest {
    fn validate(&self, data: &ApplicationNotesRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        // empty notes clear them
        result.check_length("notes", &data.notes, 0, MAX_NOTES_LENGTH);
        result
    }
}
