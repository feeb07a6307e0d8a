pub mod registration_schemas;

pub use registration_schemas::{RegisterUserRequest, RegisterUserResponse, EMAIL_REGEX};
