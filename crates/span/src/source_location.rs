use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    #[error("invalid source location '{0}', expected 'start:length[:file]'")]
    Malformed(String),
    #[error("invalid source location '{src}', {field} '{value}' is not a valid offset")]
    InvalidOffset {
        src: String,
        field: &'static str,
        value: String,
    },
}

/// A byte range inside one source file, encoded by the compiler as
/// `start:length:fileIndex`. A file index of `-1` means the location is not
/// attached to any source. A negative start or length, as the compiler emits
/// for generated nodes, decodes to an unlocated range that contains no
/// offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub start: usize,
    pub length: usize,
    pub file: Option<usize>,
}

impl SourceLocation {
    const UNLOCATED_START: usize = usize::MAX;

    #[inline]
    pub fn new(start: usize, length: usize, file: Option<usize>) -> Self {
        Self {
            start,
            length,
            file,
        }
    }

    /// Build a location from an inclusive-exclusive byte range.
    #[inline]
    pub fn from_range(start: usize, end: usize, file: Option<usize>) -> Self {
        Self::new(start, end.saturating_sub(start), file)
    }

    /// A location with no byte range, still attributed to `file`.
    #[inline]
    pub fn unlocated(file: Option<usize>) -> Self {
        Self::new(Self::UNLOCATED_START, 0, file)
    }

    #[inline]
    pub fn is_located(&self) -> bool {
        self.start != Self::UNLOCATED_START
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    /// Check if `offset` falls inside the location. Both ends are inclusive so
    /// that a cursor placed right after an identifier still hits it.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        self.is_located() && self.start <= offset && offset <= self.end()
    }

    /// Check if `other` lies entirely inside `self`.
    #[inline]
    pub fn encloses(&self, other: &SourceLocation) -> bool {
        self.is_located()
            && other.is_located()
            && self.start <= other.start
            && other.end() <= self.end()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_located() {
            write!(f, "{}:{}:", self.start, self.length)?;
        } else {
            f.write_str("-1:-1:")?;
        }
        match self.file {
            Some(file) => write!(f, "{}", file),
            None => f.write_str("-1"),
        }
    }
}

fn parse_offset(src: &str, field: &'static str, value: &str) -> Result<usize, SpanError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| SpanError::InvalidOffset {
            src: src.to_string(),
            field,
            value: value.to_string(),
        })
}

/// Parse a start or length, `None` for a negative one.
fn parse_signed_offset(
    src: &str,
    field: &'static str,
    value: &str,
) -> Result<Option<usize>, SpanError> {
    let invalid = || SpanError::InvalidOffset {
        src: src.to_string(),
        field,
        value: value.to_string(),
    };
    let offset = value.trim().parse::<i64>().map_err(|_| invalid())?;
    if offset < 0 {
        return Ok(None);
    }
    usize::try_from(offset).map(Some).map_err(|_| invalid())
}

impl FromStr for SourceLocation {
    type Err = SpanError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let mut parts = src.split(':');
        let (start, length) = match (parts.next(), parts.next()) {
            (Some(start), Some(length)) => (start, length),
            _ => return Err(SpanError::Malformed(src.to_string())),
        };
        let start = parse_signed_offset(src, "start", start)?;
        let length = parse_signed_offset(src, "length", length)?;
        let file = match parts.next().map(str::trim) {
            None | Some("-1") => None,
            Some(file) => Some(parse_offset(src, "file", file)?),
        };
        if parts.next().is_some() {
            return Err(SpanError::Malformed(src.to_string()));
        }
        Ok(match (start, length) {
            (Some(start), Some(length)) => Self::new(start, length, file),
            _ => Self::unlocated(file),
        })
    }
}

impl Serialize for SourceLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SourceLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let src = String::deserialize(deserializer)?;
        src.parse().map_err(de::Error::custom)
    }
}
