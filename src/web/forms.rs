//! urlencoded form decoding and validation.

use std::collections::HashMap;

use thiserror::Error;

use crate::request::Request;
use crate::validator::{
    matches, max_chars, min_chars, not_blank, permitted_value, Validator, EMAIL_RX,
};

/// Why a form body could not be decoded. Always answered with `400`.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("expected an application/x-www-form-urlencoded body")]
    ContentType,

    #[error("form body is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("field `{0}` is not an integer")]
    Integer(&'static str),
}

const BLANK: &str = "This field cannot be blank";
const PERMITTED_EXPIRES: [i64; 3] = [1, 7, 365];

/// Decoded form fields. Repeated keys keep the last value.
struct Fields(HashMap<String, String>);

impl Fields {
    fn parse(req: &Request) -> Result<Self, FormError> {
        let urlencoded = req
            .header("content-type")
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"));
        if !urlencoded {
            return Err(FormError::ContentType);
        }
        let body = std::str::from_utf8(req.body())?;
        Ok(Self(
            url::form_urlencoded::parse(body.as_bytes())
                .into_owned()
                .collect(),
        ))
    }

    fn string(&self, key: &str) -> String {
        self.0.get(key).cloned().unwrap_or_default()
    }

    fn int(&self, key: &'static str) -> Result<i64, FormError> {
        self.0
            .get(key)
            .and_then(|v| v.trim().parse().ok())
            .ok_or(FormError::Integer(key))
    }
}

#[derive(Debug, Default)]
pub(crate) struct SnippetCreateForm {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) expires: i64,
    pub(crate) validator: Validator,
}

impl SnippetCreateForm {
    /// An empty form preselecting a one-year expiry.
    pub(crate) fn blank() -> Self {
        Self { expires: 365, ..Self::default() }
    }

    pub(crate) fn parse(req: &Request) -> Result<Self, FormError> {
        let fields = Fields::parse(req)?;
        Ok(Self {
            title: fields.string("title"),
            content: fields.string("content"),
            expires: fields.int("expires")?,
            validator: Validator::default(),
        })
    }

    pub(crate) fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", BLANK);
        v.check_field(
            max_chars(&self.title, 100),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(not_blank(&self.content), "content", BLANK);
        v.check_field(
            permitted_value(&self.expires, &PERMITTED_EXPIRES),
            "expires",
            "This field must equal 1, 7 or 365",
        );
    }
}

#[derive(Debug, Default)]
pub(crate) struct UserSignupForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) validator: Validator,
}

impl UserSignupForm {
    pub(crate) fn parse(req: &Request) -> Result<Self, FormError> {
        let fields = Fields::parse(req)?;
        Ok(Self {
            name: fields.string("name"),
            email: fields.string("email"),
            password: fields.string("password"),
            validator: Validator::default(),
        })
    }

    pub(crate) fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.name), "name", BLANK);
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(
            matches(&self.email, &EMAIL_RX),
            "email",
            "This field must be a valid email address",
        );
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.check_field(
            min_chars(&self.password, 8),
            "password",
            "This field must be at least 8 characters long",
        );
    }
}

#[derive(Debug, Default)]
pub(crate) struct UserLoginForm {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) validator: Validator,
}

impl UserLoginForm {
    pub(crate) fn parse(req: &Request) -> Result<Self, FormError> {
        let fields = Fields::parse(req)?;
        Ok(Self {
            email: fields.string("email"),
            password: fields.string("password"),
            validator: Validator::default(),
        })
    }

    pub(crate) fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(
            matches(&self.email, &EMAIL_RX),
            "email",
            "This field must be a valid email address",
        );
        v.check_field(not_blank(&self.password), "password", BLANK);
    }
}

#[derive(Debug, Default)]
pub(crate) struct AccountPasswordUpdateForm {
    pub(crate) current_password: String,
    pub(crate) new_password: String,
    pub(crate) new_password_confirmation: String,
    pub(crate) validator: Validator,
}

impl AccountPasswordUpdateForm {
    pub(crate) fn parse(req: &Request) -> Result<Self, FormError> {
        let fields = Fields::parse(req)?;
        Ok(Self {
            current_password: fields.string("currentPassword"),
            new_password: fields.string("newPassword"),
            new_password_confirmation: fields.string("newPasswordConfirmation"),
            validator: Validator::default(),
        })
    }

    pub(crate) fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.current_password), "currentPassword", BLANK);
        v.check_field(not_blank(&self.new_password), "newPassword", BLANK);
        v.check_field(
            min_chars(&self.new_password, 8),
            "newPassword",
            "This field must be at least 8 characters long",
        );
        v.check_field(
            not_blank(&self.new_password_confirmation),
            "newPasswordConfirmation",
            BLANK,
        );
        v.check_field(
            self.new_password == self.new_password_confirmation,
            "newPasswordConfirmation",
            "Passwords do not match",
        );
    }
}
