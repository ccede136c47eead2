//! Composite cache key generation.

use std::any::type_name;
use std::fmt::Display;

/// Separator placed between key segments.
pub const KEY_SEPARATOR: char = '|';

/// Build a cache key namespaced by the type `T`.
///
/// The key is `type|key|arg1|arg2...`, lower-cased. Argument order matters
/// and no trimming is applied.
///
/// ```rust
/// use profile_cache::cache_key;
///
/// let key = cache_key::<String>("abc", &[&"X", &"y"]);
/// assert_eq!(key, "alloc::string::string|abc|x|y");
/// ```
pub fn cache_key<T: ?Sized>(key: impl Display, args: &[&dyn Display]) -> String {
    cache_key_tagged(type_name::<T>(), key, args)
}

/// Build a cache key namespaced by an explicit type tag.
pub fn cache_key_tagged(tag: &str, key: impl Display, args: &[&dyn Display]) -> String {
    let mut out = format!("{tag}{KEY_SEPARATOR}{key}");
    for arg in args {
        out.push(KEY_SEPARATOR);
        out.push_str(&arg.to_string());
    }
    out.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_case_insensitive() {
        let a = cache_key::<String>("abc", &[&"X", &"y"]);
        let b = cache_key::<String>("abc", &[&"x", &"Y"]);

        assert_eq!(a, b);
    }

    #[test]
    fn test_extra_args_change_key() {
        let short = cache_key::<String>("abc", &[&"x"]);
        let long = cache_key::<String>("abc", &[&"x", &"extra"]);

        assert_ne!(short, long);
    }

    #[test]
    fn test_arg_order_matters() {
        let a = cache_key::<String>("abc", &[&"x", &"y"]);
        let b = cache_key::<String>("abc", &[&"y", &"x"]);

        assert_ne!(a, b);
    }

    #[test]
    fn test_type_namespaces_key() {
        let as_string = cache_key::<String>(1, &[]);
        let as_int = cache_key::<i64>(1, &[]);

        assert_eq!(as_int, "i64|1");
        assert_ne!(as_string, as_int);
    }

    #[test]
    fn test_tagged_key_keeps_whitespace() {
        let key = cache_key_tagged("User", " Id ", &[&7]);
        assert_eq!(key, "user| id |7");
    }
}
