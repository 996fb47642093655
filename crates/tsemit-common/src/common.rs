//! Shared enums for emit targets and output formatting.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// ECMAScript language level the emitted code must run on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptTarget {
    ES3,
    #[default]
    ES5,
    ES2015,
    ES2016,
    ES2017,
    ES2018,
    ES2019,
    ES2020,
    ESNext,
}

impl ScriptTarget {
    /// True when classes, block scoping, destructuring and friends must be lowered.
    pub const fn needs_es2015_lowering(self) -> bool {
        matches!(self, ScriptTarget::ES3 | ScriptTarget::ES5)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ScriptTarget::ES3 => "es3",
            ScriptTarget::ES5 => "es5",
            ScriptTarget::ES2015 => "es2015",
            ScriptTarget::ES2016 => "es2016",
            ScriptTarget::ES2017 => "es2017",
            ScriptTarget::ES2018 => "es2018",
            ScriptTarget::ES2019 => "es2019",
            ScriptTarget::ES2020 => "es2020",
            ScriptTarget::ESNext => "esnext",
        }
    }
}

impl fmt::Display for ScriptTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "es3" => Ok(ScriptTarget::ES3),
            "es5" => Ok(ScriptTarget::ES5),
            "es6" | "es2015" => Ok(ScriptTarget::ES2015),
            "es2016" => Ok(ScriptTarget::ES2016),
            "es2017" => Ok(ScriptTarget::ES2017),
            "es2018" => Ok(ScriptTarget::ES2018),
            "es2019" => Ok(ScriptTarget::ES2019),
            "es2020" => Ok(ScriptTarget::ES2020),
            "esnext" | "latest" => Ok(ScriptTarget::ESNext),
            other => Err(format!("unknown target '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for ScriptTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Line terminator written between output lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NewLineKind {
    CarriageReturnLineFeed,
    #[default]
    LineFeed,
}

impl NewLineKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NewLineKind::CarriageReturnLineFeed => "\r\n",
            NewLineKind::LineFeed => "\n",
        }
    }
}

impl FromStr for NewLineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crlf" => Ok(NewLineKind::CarriageReturnLineFeed),
            "lf" => Ok(NewLineKind::LineFeed),
            other => Err(format!("unknown newLine '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for NewLineKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_parsing_is_case_insensitive() {
        assert_eq!("ES5".parse::<ScriptTarget>(), Ok(ScriptTarget::ES5));
        assert_eq!("es6".parse::<ScriptTarget>(), Ok(ScriptTarget::ES2015));
        assert!("es1".parse::<ScriptTarget>().is_err());
    }

    #[test]
    fn only_es3_and_es5_need_class_lowering() {
        assert!(ScriptTarget::ES5.needs_es2015_lowering());
        assert!(!ScriptTarget::ES2015.needs_es2015_lowering());
        assert!(ScriptTarget::ES5 < ScriptTarget::ESNext);
    }
}
