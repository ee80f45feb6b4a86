//! Sensitive data marker for automatic redaction
//!
//! Account passwords and BrickLink secrets travel inside `Sensitive<T>` so
//! that `Debug` output of a model never leaks them into logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// Serialization is transparent: the wrapper only guards formatting.
///
/// # Example
///
/// ```
/// use briventory_core_types::Sensitive;
///
/// let password = Sensitive::new("secret123");
/// assert_eq!(format!("{:?}", password), "***REDACTED***");
/// assert_eq!(password.expose(), &"secret123");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    ///
    /// Only call this where the raw value is actually needed, such as when
    /// binding it into a statement.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let secret = Sensitive::new("my-secret-password");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, "***REDACTED***");
        assert!(!debug_str.contains("my-secret-password"));
    }

    #[test]
    fn test_sensitive_display_redaction() {
        let secret = Sensitive::new("consumer-secret");
        assert_eq!(format!("{}", secret), "***REDACTED***");
    }

    #[test]
    fn test_sensitive_equality_compares_inner_value() {
        assert_eq!(Sensitive::new(1), Sensitive::new(1));
        assert_ne!(Sensitive::new(1), Sensitive::new(2));
    }

    #[test]
    fn test_sensitive_serializes_transparently() {
        let secret = Sensitive::new(String::from("token"));
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"token\"");
        let back: Sensitive<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_inner(), "token");
    }

    #[test]
    fn test_sensitive_inside_struct_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Credentials {
            email: String,
            password: Sensitive<String>,
        }

        let credentials = Credentials {
            email: "alice@example.org".to_string(),
            password: Sensitive::new("secret123".to_string()),
        };

        let debug_str = format!("{:?}", credentials);
        assert!(debug_str.contains("alice@example.org"));
        assert!(!debug_str.contains("secret123"));
    }
}
