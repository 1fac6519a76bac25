use serde::Deserialize;

use crate::validation::validator::{Validator, max_chars, not_blank, permitted_value};

/// The lifetimes, in days, a snippet may be given.
pub const PERMITTED_EXPIRES: [i32; 3] = [1, 7, 365];

/// The longest accepted title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// The snippet creation form as submitted.
///
/// Missing fields decode to their zero value, so an absent `expires` fails
/// validation rather than picking up the 365 shown on a fresh form.
#[derive(Deserialize, Debug, Clone)]
pub struct SnippetCreateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub expires: i32,
    #[serde(skip)]
    pub validator: Validator,
}

impl Default for SnippetCreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: 365,
            validator: Validator::new(),
        }
    }
}

impl SnippetCreateForm {
    /// Runs the field checks, recording failures on the form's validator.
    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", "This field cannot be blank");
        v.check_field(
            max_chars(&self.title, MAX_TITLE_CHARS),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(not_blank(&self.content), "content", "This field cannot be blank");
        v.check_field(
            permitted_value(&self.expires, &PERMITTED_EXPIRES),
            "expires",
            "This field must equal 1, 7 or 365",
        );
    }
}
