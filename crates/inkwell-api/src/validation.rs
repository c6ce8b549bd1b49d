//! Form validation. Each function returns the cleaned value together with the
//! messages to show on the originating form; an empty list means valid.

use inkwell_types::api::{LoginForm, PostForm, RegisterForm};

use crate::markup::Markup;

pub const INVALID_LOGIN: &str = "Invalid username/password";
pub const DUPLICATE_USERNAME: &str = "That username already exists";

const MIN_LEN: usize = 6;
const MAX_LEN: usize = 12;

/// Returns the trimmed username and any problems with it or the password.
/// Uniqueness is checked by the store, not here.
pub fn registration(form: &RegisterForm) -> (String, Vec<String>) {
    let username = form.username.trim().to_string();
    let mut errors = username_errors(&username);
    errors.extend(password_errors(&form.password));
    (username, errors)
}

pub fn username_errors(username: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let len = username.chars().count();

    if username.is_empty() {
        errors.push("You must provide a username".to_string());
        return errors;
    }
    if len < MIN_LEN {
        errors.push("Username must be at least 6 characters long".to_string());
    }
    if len > MAX_LEN {
        errors.push("Username can't exceed 12 characters".to_string());
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Username can only contain letters and numbers".to_string());
    }
    errors
}

/// Length only; any characters are allowed.
pub fn password_errors(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let len = password.chars().count();

    if password.is_empty() {
        errors.push("You must provide a password".to_string());
        return errors;
    }
    if len < MIN_LEN {
        errors.push("Password must be at least 6 characters long".to_string());
    }
    if len > MAX_LEN {
        errors.push("Password can't exceed 12 characters".to_string());
    }
    errors
}

/// A blank username fails before any lookup. Everything else is decided
/// against the stored account, with the same generic message.
pub fn login(form: &LoginForm) -> Vec<String> {
    if form.username.trim().is_empty() {
        vec![INVALID_LOGIN.to_string()]
    } else {
        Vec::new()
    }
}

/// Strip all markup from title and body, trimming on both sides of the strip
/// so cleaning stored content again leaves it unchanged; report empties.
pub fn post(form: &PostForm, markup: Markup) -> (PostForm, Vec<String>) {
    let cleaned = PostForm {
        title: markup.strip(form.title.trim()).trim().to_string(),
        body: markup.strip(form.body.trim()).trim().to_string(),
    };

    let mut errors = Vec::new();
    if cleaned.title.is_empty() {
        errors.push("You must provide a title".to_string());
    }
    if cleaned.body.is_empty() {
        errors.push("You must provide content".to_string());
    }
    (cleaned, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str) -> (String, Vec<String>) {
        registration(&RegisterForm {
            username: username.into(),
            password: password.into(),
        })
    }

    #[test]
    fn valid_registration() {
        let (username, errors) = register("  alice01 ", "secret1");
        assert_eq!(username, "alice01");
        assert!(errors.is_empty());
    }

    #[test]
    fn username_rules() {
        assert_eq!(register("", "secret1").1, vec!["You must provide a username"]);
        assert_eq!(
            register("al", "secret1").1,
            vec!["Username must be at least 6 characters long"]
        );
        assert_eq!(
            register("abcdefghijklm", "secret1").1,
            vec!["Username can't exceed 12 characters"]
        );
        assert_eq!(
            register("alice_01", "secret1").1,
            vec!["Username can only contain letters and numbers"]
        );
        assert_eq!(register("abcdefghijkl", "secret1").1, Vec::<String>::new());
    }

    #[test]
    fn non_ascii_letters_are_rejected() {
        assert_eq!(
            register("alicé01", "secret1").1,
            vec!["Username can only contain letters and numbers"]
        );
    }

    #[test]
    fn password_rules() {
        assert_eq!(register("alice01", "").1, vec!["You must provide a password"]);
        assert_eq!(
            register("alice01", "12345").1,
            vec!["Password must be at least 6 characters long"]
        );
        assert_eq!(
            register("alice01", "1234567890123").1,
            vec!["Password can't exceed 12 characters"]
        );
        // no charset rule
        assert!(register("alice01", "!! ??  ##").1.is_empty());
    }

    #[test]
    fn errors_accumulate_across_fields() {
        let (_, errors) = register("a b", "");
        assert_eq!(
            errors,
            vec![
                "Username must be at least 6 characters long",
                "Username can only contain letters and numbers",
                "You must provide a password",
            ]
        );
    }

    #[test]
    fn blank_login_is_generic() {
        let errors = login(&LoginForm {
            username: "   ".into(),
            password: "secret1".into(),
        });
        assert_eq!(errors, vec![INVALID_LOGIN]);
    }

    #[test]
    fn post_is_trimmed_and_stripped() {
        let (cleaned, errors) = post(
            &PostForm {
                title: "  <b>Hi</b> ".into(),
                body: " **hello** <script>x()</script>".into(),
            },
            Markup,
        );
        assert!(errors.is_empty());
        assert_eq!(cleaned.title, "Hi");
        assert_eq!(cleaned.body, "**hello**");
    }

    #[test]
    fn cleaning_stored_post_again_is_stable() {
        let (stored, _) = post(
            &PostForm {
                title: "<i>a</i> &amp; b <script>x()</script>".into(),
                body: "**hello** <style>p{}</style>\n".into(),
            },
            Markup,
        );
        assert_eq!(stored.title, "a &amp; b");
        assert_eq!(stored.body, "**hello**");

        let (again, errors) = post(&stored, Markup);
        assert!(errors.is_empty());
        assert_eq!(again.title, stored.title);
        assert_eq!(again.body, stored.body);
    }

    #[test]
    fn post_that_is_only_markup_is_empty() {
        let (_, errors) = post(
            &PostForm {
                title: "<script>x()</script>".into(),
                body: "   ".into(),
            },
            Markup,
        );
        assert_eq!(errors, vec!["You must provide a title", "You must provide content"]);
    }
}
