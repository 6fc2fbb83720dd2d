use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::AppError,
    models::account::{CreateAccount, LoginPayload},
};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn registration(payload: &CreateAccount) -> Result<(), AppError> {
    let fields = [
        ("firstName", &payload.first_name),
        ("lastName", &payload.last_name),
        ("email", &payload.email),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::validation(format!("{} must not be empty", name)));
    }
    // Passwords are taken byte for byte, the same way login checks them.
    if payload.password.is_empty() {
        return Err(AppError::validation("password must not be empty"));
    }
    if !is_valid_email(&payload.email) {
        return Err(AppError::validation("Invalid email provided"));
    }
    Ok(())
}

pub fn login(payload: &LoginPayload) -> Result<(), AppError> {
    if !is_valid_email(&payload.email) || payload.password.is_empty() {
        return Err(AppError::validation("Invalid request"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice@x.com", true)]
    #[case("first.last+tag@sub.example.org", true)]
    #[case("a_b%c-d@host-name.io", true)]
    #[case("", false)]
    #[case("alice", false)]
    #[case("alice@x", false)]
    #[case("alice@x.c", false)]
    #[case("@x.com", false)]
    #[case("alice@@x.com", false)]
    #[case("alice smith@x.com", false)]
    fn email_shape(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(email), valid);
    }

    fn create(first: &str, last: &str, email: &str, password: &str) -> CreateAccount {
        CreateAccount {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn registration_requires_every_field() {
        assert!(registration(&create("Alice", "L", "alice@x.com", "pw")).is_ok());

        let err = registration(&create("", "L", "alice@x.com", "pw")).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("firstName")));

        let err = registration(&create("Alice", "L", "alice@x.com", "")).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("password")));
    }

    #[test]
    fn whitespace_password_is_accepted_like_login_does() {
        let payload = create("Alice", "L", "alice@x.com", "   ");
        assert!(registration(&payload).is_ok());
        assert!(login(&LoginPayload {
            email: payload.email.clone(),
            password: payload.password.clone(),
        })
        .is_ok());
    }

    #[test]
    fn registration_rejects_malformed_email() {
        let err = registration(&create("Alice", "L", "not-an-email", "pw")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn login_requires_email_and_password() {
        let ok = LoginPayload {
            email: "alice@x.com".into(),
            password: "pw".into(),
        };
        assert!(login(&ok).is_ok());

        let no_password = LoginPayload {
            email: "alice@x.com".into(),
            password: String::new(),
        };
        assert!(login(&no_password).is_err());

        let bad_email = LoginPayload {
            email: "alice".into(),
            password: "pw".into(),
        };
        assert!(login(&bad_email).is_err());
    }
}
