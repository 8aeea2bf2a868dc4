use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct NewTeacherDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters."))]
    pub name: String,
}

impl NewTeacherDto {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }
}
