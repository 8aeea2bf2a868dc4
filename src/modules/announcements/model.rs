use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct MessageDto {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1 to 2000 characters."))]
    pub text: String,
}

impl MessageDto {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
        }
    }
}
