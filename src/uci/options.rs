//! UCI options understood by the engine

use thiserror::Error;

pub const HASH_DEFAULT_MB: usize = 16;
pub const HASH_MIN_MB: usize = 1;
pub const HASH_MAX_MB: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),
    #[error("option {0} requires a value")]
    MissingValue(String),
    #[error("invalid value for option {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Engine configuration settable through "setoption"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciOptions {
    /// Transposition table size in MB
    pub hash_mb: usize,
}

impl Default for UciOptions {
    fn default() -> Self {
        Self {
            hash_mb: HASH_DEFAULT_MB,
        }
    }
}

/// What changed after a successful `set_option`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChange {
    Hash(usize),
}

impl UciOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines announcing the options in reply to "uci"
    pub fn declarations() -> Vec<String> {
        vec![format!(
            "option name Hash type spin default {} min {} max {}",
            HASH_DEFAULT_MB, HASH_MIN_MB, HASH_MAX_MB
        )]
    }

    /// Option names are matched case-insensitively
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<OptionChange, OptionError> {
        if !name.eq_ignore_ascii_case("hash") {
            return Err(OptionError::Unknown(name.to_string()));
        }
        let raw = value.ok_or_else(|| OptionError::MissingValue(name.to_string()))?;
        let mb = raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|mb| (HASH_MIN_MB..=HASH_MAX_MB).contains(mb))
            .ok_or_else(|| OptionError::InvalidValue {
                name: name.to_string(),
                value: raw.to_string(),
            })?;
        self.hash_mb = mb;
        Ok(OptionChange::Hash(mb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_defaults() {
        let options = UciOptions::new();
        assert_eq!(options.hash_mb, 16);
        assert_eq!(
            UciOptions::declarations(),
            vec!["option name Hash type spin default 16 min 1 max 1024".to_string()]
        );
    }

    #[test]
    fn hash_is_validated() {
        let mut options = UciOptions::new();
        assert_eq!(options.set_option("Hash", Some("128")), Ok(OptionChange::Hash(128)));
        assert_eq!(options.hash_mb, 128);

        assert!(matches!(
            options.set_option("Hash", Some("0")),
            Err(OptionError::InvalidValue { .. })
        ));
        assert!(matches!(
            options.set_option("hash", Some("lots")),
            Err(OptionError::InvalidValue { .. })
        ));
        assert_eq!(
            options.set_option("Hash", None),
            Err(OptionError::MissingValue("Hash".to_string()))
        );
        assert_eq!(
            options.set_option("Threads", Some("4")),
            Err(OptionError::Unknown("Threads".to_string()))
        );
        assert_eq!(options.hash_mb, 128);
    }
}
