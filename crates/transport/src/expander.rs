//! Parameter expansion: turning argument values into template text.

use serde_json::Value;

/// Renders one non-null argument value for substitution into a template.
///
/// `null` arguments never reach an expander; they leave their variable
/// without a value.
pub trait Expander: Send + Sync {
    /// Renders `value`.
    fn expand(&self, value: &Value) -> String;
}

impl<F> Expander for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn expand(&self, value: &Value) -> String {
        self(value)
    }
}

/// Default rendering used when a parameter has no expander.
///
/// Strings render raw (no quotes), numbers and booleans via `Display`,
/// arrays and objects as compact JSON, and `null` as no value.
pub fn render_default(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Lower-cases the default rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerCase;

impl Expander for LowerCase {
    fn expand(&self, value: &Value) -> String {
        render_default(value).unwrap_or_default().to_lowercase()
    }
}

/// Caps numeric values at `max`. Non-numeric values render unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Clamp {
    /// Largest value rendered as-is.
    pub max: i64,
}

impl Clamp {
    /// Creates a clamp with the given upper bound.
    pub fn new(max: i64) -> Self {
        Self { max }
    }
}

impl Expander for Clamp {
    fn expand(&self, value: &Value) -> String {
        match value.as_f64() {
            // i64 -> f64 is exact for realistic limits.
            Some(n) if n > self.max as f64 => self.max.to_string(),
            _ => render_default(value).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_rendering_by_type() {
        assert_eq!(render_default(&json!("store_1")).as_deref(), Some("store_1"));
        assert_eq!(render_default(&json!(42.1)).as_deref(), Some("42.1"));
        assert_eq!(render_default(&json!(2)).as_deref(), Some("2"));
        assert_eq!(render_default(&json!(true)).as_deref(), Some("true"));
        assert_eq!(render_default(&json!(["a", 1])).as_deref(), Some(r#"["a",1]"#));
        assert_eq!(render_default(&Value::Null), None);
    }

    #[test]
    fn lower_case_expander() {
        assert_eq!(LowerCase.expand(&json!("AnYFirsTName")), "anyfirstname");
    }

    #[test]
    fn clamp_caps_large_numbers_only() {
        let clamp = Clamp::new(10);
        assert_eq!(clamp.expand(&json!(20)), "10");
        assert_eq!(clamp.expand(&json!(10)), "10");
        assert_eq!(clamp.expand(&json!(3)), "3");
        assert_eq!(clamp.expand(&json!(10.5)), "10");
        assert_eq!(clamp.expand(&json!("twenty")), "twenty");
    }

    #[test]
    fn closures_are_expanders() {
        let upper = |value: &Value| render_default(value).unwrap_or_default().to_uppercase();
        assert_eq!(upper.expand(&json!("sku")), "SKU");
    }
}
