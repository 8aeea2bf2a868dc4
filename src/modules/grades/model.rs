use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct GradePurposeDto {
    #[validate(length(min = 1, max = 200, message = "Purpose must be 1 to 200 characters."))]
    pub purpose: String,
}

impl GradePurposeDto {
    pub fn new(purpose: &str) -> Self {
        Self {
            purpose: purpose.trim().to_string(),
        }
    }
}
