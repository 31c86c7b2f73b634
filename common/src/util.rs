use std::{env, str::FromStr};

use crate::Error;

/// reads and parses a required env variable
pub fn parse_env<T: FromStr>(name: &str) -> Result<T, Error> {
    let raw = env::var(name).map_err(|_| format!("Could not find env variable {}", name))?;
    raw.trim()
        .parse()
        .map_err(|_| format!("Could not parse env variable {}", name).into())
}

/// reads an optional env variable, falling back to `default` when it is unset
pub fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(_) => parse_env(name),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(Box::new(e)),
    }
}

/// reads an optional boolean env variable
pub fn env_flag(name: &str, default: bool) -> Result<bool, Error> {
    match env::var(name) {
        Ok(raw) => parse_flag(&raw).ok_or_else(|| {
            format!("Env variable {} is not a boolean: {:?}", name, raw).into()
        }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(Box::new(e)),
    }
}

/// accepts the usual spellings of true / false
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("meow"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_env_helpers() {
        env::set_var("COMMON_UTIL_TEST_PORT", " 8080 ");
        env::set_var("COMMON_UTIL_TEST_BAD", "eight");
        env::set_var("COMMON_UTIL_TEST_FLAG", "no");

        assert_eq!(parse_env::<u16>("COMMON_UTIL_TEST_PORT").unwrap(), 8080);
        assert!(parse_env::<u16>("COMMON_UTIL_TEST_BAD").is_err());
        assert!(parse_env::<u16>("COMMON_UTIL_TEST_MISSING").is_err());

        assert_eq!(env_or("COMMON_UTIL_TEST_MISSING", 7u16).unwrap(), 7);
        assert_eq!(env_or("COMMON_UTIL_TEST_PORT", 7u16).unwrap(), 8080);
        assert!(env_or("COMMON_UTIL_TEST_BAD", 7u16).is_err());

        assert!(!env_flag("COMMON_UTIL_TEST_FLAG", true).unwrap());
        assert!(env_flag("COMMON_UTIL_TEST_MISSING", true).unwrap());
        assert!(env_flag("COMMON_UTIL_TEST_BAD", true).is_err());
    }
}
