//! Placeholder substitution for message templates.
//!
//! Tokens use the literal `{token}` syntax and are case-sensitive. Every
//! occurrence of a known token is replaced; unknown tokens and stray
//! braces are copied through verbatim. Substituted values are never
//! scanned again.

use std::collections::HashMap;

use crate::contact::Contact;

pub const NAME: &str = "name";
pub const REGISTRANT_NAME: &str = "registrant_name";
pub const REGISTRATION_NUMBER: &str = "registration_number";

/// Replace every `{token}` found in `fields`.
pub fn render(template: &str, fields: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        match after_open.find(['{', '}']) {
            Some(end) if after_open.as_bytes()[end] == b'}' => {
                let token = &after_open[..end];
                match fields.get(token) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after_open[end + 1..];
            }
            // Another `{` before any `}`: this brace is literal.
            Some(end) => {
                out.push('{');
                out.push_str(&after_open[..end]);
                rest = &after_open[end..];
            }
            None => {
                out.push('{');
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Placeholder values for one contact. Missing fields render as "".
pub fn contact_fields<'a>(contact: &Contact, fallback_name: &str) -> HashMap<&'a str, String> {
    HashMap::from([
        (NAME, contact.name_or(fallback_name).to_string()),
        (
            REGISTRANT_NAME,
            contact.registrant_name().unwrap_or_default().to_string(),
        ),
        (
            REGISTRATION_NUMBER,
            contact.registration_number().unwrap_or_default().to_string(),
        ),
    ])
}

/// Render `template` for `contact`.
pub fn render_for(template: &str, contact: &Contact, fallback_name: &str) -> String {
    render(template, &contact_fields(contact, fallback_name))
}
