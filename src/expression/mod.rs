//! Attribute references inside configuration values.
//!
//! A value such as `${lang}-Latn` is evaluated against the attributes of the
//! record being processed. `$$` produces a literal dollar sign; a reference to
//! an attribute the record does not carry evaluates to the empty string.

use indexmap::IndexMap;

use crate::core::error::ConfigError;

pub fn has_references(template: &str) -> bool {
    template.contains("${")
}

pub fn evaluate(
    field: &'static str,
    template: &str,
    attributes: &IndexMap<String, String>,
) -> Result<String, ConfigError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(position) = rest.find('$') {
        rendered.push_str(&rest[..position]);
        let tail = &rest[position + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            rendered.push('$');
            rest = after;
        } else if let Some(body) = tail.strip_prefix('{') {
            let end = body.find('}').ok_or_else(|| ConfigError::InvalidExpression {
                field,
                reason: format!("unterminated reference in {template:?}"),
            })?;
            let name = body[..end].trim();
            if name.is_empty() {
                return Err(ConfigError::InvalidExpression {
                    field,
                    reason: "empty attribute reference".to_string(),
                });
            }
            if let Some(value) = attributes.get(name) {
                rendered.push_str(value);
            }
            rest = &body[end + 1..];
        } else {
            rendered.push('$');
            rest = tail;
        }
    }

    rendered.push_str(rest);
    Ok(rendered)
}
