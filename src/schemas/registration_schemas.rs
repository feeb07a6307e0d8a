use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("EMAIL_REGEX is a valid regex pattern")
});

pub const REGISTERED_MESSAGE: &str = "User registered successfully";

/// Registration payload.
///
/// Keys match field names case-insensitively and a repeated key overwrites
/// the earlier value. Missing fields stay empty, a `null` value leaves the
/// field unchanged, unknown keys are ignored.
#[derive(Debug, Default, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 3, max = 255))]
    pub username: String,

    #[validate(length(min = 1, max = 320), regex(path = *EMAIL_REGEX))]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

impl RegisterUserRequest {
    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        if key.eq_ignore_ascii_case("username") {
            Some(&mut self.username)
        } else if key.eq_ignore_ascii_case("email") {
            Some(&mut self.email)
        } else if key.eq_ignore_ascii_case("password") {
            Some(&mut self.password)
        } else {
            None
        }
    }
}

impl<'de> Deserialize<'de> for RegisterUserRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RegisterUserRequestVisitor)
    }
}

struct RegisterUserRequestVisitor;

impl<'de> Visitor<'de> for RegisterUserRequestVisitor {
    type Value = RegisterUserRequest;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a registration object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut request = RegisterUserRequest::default();
        while let Some(key) = map.next_key::<String>()? {
            match request.field_mut(&key) {
                Some(field) => {
                    if let Some(value) = map.next_value::<Option<String>>()? {
                        *field = value;
                    }
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(request)
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterUserResponse {
    pub message: String,
}

impl RegisterUserResponse {
    pub fn registered() -> Self {
        Self {
            message: REGISTERED_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn failed_fields(req: &RegisterUserRequest) -> Vec<String> {
        let mut fields: Vec<String> = match req.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.errors().keys().map(|k| k.to_string()).collect(),
        };
        fields.sort();
        fields
    }

    #[test]
    fn test_email_regex_accepts_common_addresses() {
        assert!(EMAIL_REGEX.is_match("user@example.com"));
        assert!(EMAIL_REGEX.is_match("first.last+tag@mail.example.co"));
        assert!(EMAIL_REGEX.is_match("user_%-1@sub-domain.example.org"));
    }

    #[test]
    fn test_email_regex_rejects_malformed_addresses() {
        assert!(!EMAIL_REGEX.is_match("invalidemail"));
        assert!(!EMAIL_REGEX.is_match("@example.com"));
        assert!(!EMAIL_REGEX.is_match("user@"));
        assert!(!EMAIL_REGEX.is_match("user@example"));
        assert!(!EMAIL_REGEX.is_match("user@example.c"));
        assert!(!EMAIL_REGEX.is_match("user@example.c0m"));
        assert!(!EMAIL_REGEX.is_match("us er@example.com"));
        assert!(!EMAIL_REGEX.is_match(""));
    }

    #[test]
    fn test_valid_request_passes() {
        let req = request("validuser", "user@example.com", "validpass");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_username_length_bounds() {
        let email = "user@example.com";
        assert_eq!(failed_fields(&request("ab", email, "validpass")), ["username"]);
        assert!(failed_fields(&request("abc", email, "validpass")).is_empty());
        assert!(failed_fields(&request(&"a".repeat(255), email, "validpass")).is_empty());
        assert_eq!(
            failed_fields(&request(&"a".repeat(256), email, "validpass")),
            ["username"]
        );
    }

    #[test]
    fn test_email_length_bounds() {
        // "a@" + local domain + ".com"
        let at_limit = format!("a@{}.com", "a".repeat(314));
        assert_eq!(at_limit.len(), 320);
        assert!(failed_fields(&request("validuser", &at_limit, "validpass")).is_empty());

        let over_limit = format!("a@{}.com", "a".repeat(315));
        assert_eq!(
            failed_fields(&request("validuser", &over_limit, "validpass")),
            ["email"]
        );
        assert_eq!(
            failed_fields(&request("validuser", "", "validpass")),
            ["email"]
        );
    }

    #[test]
    fn test_password_length_bounds() {
        let email = "user@example.com";
        assert_eq!(failed_fields(&request("validuser", email, "12345")), ["password"]);
        assert!(failed_fields(&request("validuser", email, "123456")).is_empty());
        assert!(failed_fields(&request("validuser", email, &"p".repeat(128))).is_empty());
        assert_eq!(
            failed_fields(&request("validuser", email, &"p".repeat(129))),
            ["password"]
        );
    }

    #[test]
    fn test_all_empty_reports_every_field() {
        let req = RegisterUserRequest::default();
        assert_eq!(failed_fields(&req), ["email", "password", "username"]);
    }

    #[test]
    fn test_deserialize_defaults_missing_and_null_fields() {
        let req: RegisterUserRequest =
            serde_json::from_str(r#"{"username":null,"extra":42}"#).unwrap();
        assert_eq!(req.username, "");
        assert_eq!(req.email, "");
        assert_eq!(req.password, "");
    }

    #[test]
    fn test_deserialize_last_duplicate_key_wins() {
        let req: RegisterUserRequest =
            serde_json::from_str(r#"{"username":"ab","username":"validuser"}"#).unwrap();
        assert_eq!(req.username, "validuser");
    }

    #[test]
    fn test_deserialize_null_keeps_earlier_value() {
        let req: RegisterUserRequest =
            serde_json::from_str(r#"{"email":"user@example.com","email":null}"#).unwrap();
        assert_eq!(req.email, "user@example.com");
    }

    #[test]
    fn test_deserialize_matches_keys_ignoring_case() {
        let req: RegisterUserRequest = serde_json::from_str(
            r#"{"Username":"validuser","EMAIL":"user@example.com","PassWord":"validpass"}"#,
        )
        .unwrap();
        assert_eq!(req.username, "validuser");
        assert_eq!(req.email, "user@example.com");
        assert_eq!(req.password, "validpass");

        let req: RegisterUserRequest =
            serde_json::from_str(r#"{"username":"first","USERNAME":"second"}"#).unwrap();
        assert_eq!(req.username, "second");
    }

    #[test]
    fn test_deserialize_rejects_non_object() {
        assert!(serde_json::from_str::<RegisterUserRequest>("[]").is_err());
        assert!(serde_json::from_str::<RegisterUserRequest>(r#"["a","b","c"]"#).is_err());
    }

    #[test]
    fn test_deserialize_rejects_wrong_field_type() {
        let result = serde_json::from_str::<RegisterUserRequest>(r#"{"username":123}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_serializes_to_exact_body() {
        let body = serde_json::to_string(&RegisterUserResponse::registered()).unwrap();
        assert_eq!(body, r#"{"message":"User registered successfully"}"#);
    }
}
