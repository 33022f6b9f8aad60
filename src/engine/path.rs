//! Field name resolution into nested paths.
//!
//! With dot notation enabled a field name such as `data.person[0].name` is
//! split into the segments `data`, `person`, `0` (an index) and `name`.
//! Bracket segments hold either an index or a quoted key (`a["b.c"]`), which
//! allows keys that contain dots. With dot notation disabled the name is used
//! literally as a single key.
//!
//! Resolution only looks at the name itself, never at the data it will be
//! written into.

use std::fmt;

use crate::constants::MAX_ARRAY_INDEX;
use crate::errors::PathError;

/// One step of a resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        PathSegment::Key(key.into())
    }

    /// The array position this segment addresses, if any.
    ///
    /// Plain keys made only of digits (`items.0`) address array positions too
    /// when a container has to be created for them. Positions above
    /// `MAX_ARRAY_INDEX` never do; such keys stay object keys.
    pub fn as_index(&self) -> Option<usize> {
        let index = match self {
            PathSegment::Index(index) => Some(*index),
            PathSegment::Key(key) => {
                let canonical = key == "0" || !key.starts_with('0');
                if canonical && !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
                    key.parse().ok()
                } else {
                    None
                }
            }
        };
        index.filter(|index| *index <= MAX_ARRAY_INDEX)
    }

    /// The object key this segment writes to when the container is an object.
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Resolves a field name into path segments.
pub fn resolve(path: &str, dot_notation: bool) -> Result<Vec<PathSegment>, PathError> {
    if path.is_empty() {
        return Err(PathError::EmptyPath);
    }
    if !dot_notation {
        return Ok(vec![PathSegment::key(path)]);
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    // A '.' was seen and no segment has followed it yet.
    let mut pending_dot = false;
    // The previous segment was a bracket, so only '.', '[' or the end may follow.
    let mut after_bracket = false;
    let mut chars = path.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '.' => {
                if current.is_empty() && !after_bracket {
                    return Err(PathError::EmptySegment {
                        path: path.to_string(),
                        offset,
                    });
                }
                if !current.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current)));
                }
                pending_dot = true;
                after_bracket = false;
            }
            '[' => {
                if pending_dot {
                    return Err(PathError::EmptySegment {
                        path: path.to_string(),
                        offset,
                    });
                }
                if !current.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current)));
                }
                segments.push(read_bracket(path, &mut chars)?);
                after_bracket = true;
            }
            ']' => {
                return Err(PathError::InvalidBracket {
                    path: path.to_string(),
                    content: current,
                });
            }
            _ => {
                if after_bracket {
                    return Err(PathError::MissingSeparator {
                        path: path.to_string(),
                        offset,
                    });
                }
                current.push(c);
                pending_dot = false;
                after_bracket = false;
            }
        }
    }

    if !current.is_empty() {
        segments.push(PathSegment::Key(current));
    } else if pending_dot {
        return Err(PathError::EmptySegment {
            path: path.to_string(),
            offset: path.len(),
        });
    }

    Ok(segments)
}

/// Reads the content of a bracket segment; the opening `[` is already consumed.
fn read_bracket(
    path: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<PathSegment, PathError> {
    let quote = match chars.peek() {
        Some((_, q @ ('"' | '\''))) => Some(*q),
        _ => None,
    };

    if let Some(quote) = quote {
        chars.next();
        let mut key = String::new();
        loop {
            match chars.next() {
                Some((_, '\\')) => match chars.next() {
                    Some((_, escaped)) => key.push(escaped),
                    None => {
                        return Err(PathError::UnclosedBracket {
                            path: path.to_string(),
                        });
                    }
                },
                Some((_, c)) if c == quote => break,
                Some((_, c)) => key.push(c),
                None => {
                    return Err(PathError::UnclosedBracket {
                        path: path.to_string(),
                    });
                }
            }
        }
        return match chars.next() {
            Some((_, ']')) if !key.is_empty() => Ok(PathSegment::Key(key)),
            Some((_, ']')) => Err(PathError::InvalidBracket {
                path: path.to_string(),
                content: format!("{quote}{quote}"),
            }),
            Some(_) => Err(PathError::InvalidBracket {
                path: path.to_string(),
                content: format!("{quote}{key}{quote}"),
            }),
            None => Err(PathError::UnclosedBracket {
                path: path.to_string(),
            }),
        };
    }

    let mut content = String::new();
    while let Some((_, c)) = chars.next() {
        if c == ']' {
            let trimmed = content.trim();
            if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return match trimmed.parse::<usize>() {
                    Ok(index) if index <= MAX_ARRAY_INDEX => Ok(PathSegment::Index(index)),
                    _ => Err(PathError::IndexTooLarge {
                        path: path.to_string(),
                        index: trimmed.to_string(),
                        max: MAX_ARRAY_INDEX,
                    }),
                };
            }
            return Err(PathError::InvalidBracket {
                path: path.to_string(),
                content,
            });
        }
        content.push(c);
    }

    Err(PathError::UnclosedBracket {
        path: path.to_string(),
    })
}
