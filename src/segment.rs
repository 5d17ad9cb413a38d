//! Segment tokenization for EDIFACT-style interchanges.
//!
//! Splits raw interchange text into segment lines and each line into its
//! elements and components. Release characters are resolved here so that
//! everything downstream works with plain component values.

use serde::{Deserialize, Serialize};

/// Service characters used to tokenize an interchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delimiters {
    /// Separates components inside an element (default `:`)
    pub component: char,

    /// Separates elements inside a segment (default `+`)
    pub element: char,

    /// Escapes the next character (default `?`)
    pub release: char,

    /// Terminates a segment (default `'`)
    pub terminator: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            component: ':',
            element: '+',
            release: '?',
            terminator: '\'',
        }
    }
}

impl Delimiters {
    /// Read delimiters from a `UNA` service string advice.
    ///
    /// The advice is `UNA` followed by six characters: component separator,
    /// element separator, decimal mark, release character, reserved, segment
    /// terminator. Returns `None` if `text` does not start with a complete advice.
    pub fn from_una(text: &str) -> Option<Self> {
        let rest = text.strip_prefix("UNA")?;
        let chars: Vec<char> = rest.chars().take(6).collect();
        if chars.len() < 6 {
            return None;
        }

        Some(Self {
            component: chars[0],
            element: chars[1],
            release: chars[3],
            terminator: chars[5],
        })
    }
}

/// One segment of the flat format: an ordered list of elements, each an
/// ordered list of components. Element 0, component 0 is the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    elements: Vec<Vec<String>>,
}

impl Line {
    /// Build a line from already-split elements.
    pub fn new(elements: Vec<Vec<String>>) -> Self {
        Self { elements }
    }

    /// Parse one segment using the default delimiters.
    ///
    /// # Example
    ///
    /// ```
    /// use edifact_inbound::Line;
    ///
    /// let line = Line::parse("RFF+TN:17'");
    /// assert_eq!(line.tag(), "RFF");
    /// assert_eq!(line.qualifier(), Some("TN"));
    /// assert_eq!(line.value(1, Some(1)).as_deref(), Some("17"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self::parse_with(raw, &Delimiters::default())
    }

    /// Parse one segment with explicit delimiters.
    ///
    /// A trailing unreleased terminator and surrounding whitespace are removed.
    pub fn parse_with(raw: &str, delimiters: &Delimiters) -> Self {
        let trimmed = strip_terminator(raw.trim(), delimiters);

        let elements = split_released(trimmed, delimiters.element, delimiters.release)
            .into_iter()
            .map(|element| {
                split_released(element, delimiters.component, delimiters.release)
                    .into_iter()
                    .map(|component| unescape(component, delimiters.release))
                    .collect()
            })
            .collect();

        Self { elements }
    }

    /// The segment tag, or an empty string for an empty line.
    pub fn tag(&self) -> &str {
        self.elements
            .first()
            .and_then(|e| e.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Qualifier of the segment: element 1, component 0.
    pub fn qualifier(&self) -> Option<&str> {
        self.elements
            .get(1)
            .and_then(|e| e.first())
            .map(String::as_str)
    }

    /// Number of elements including the tag.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Components of the element at `index`.
    pub fn element(&self, index: usize) -> Option<&[String]> {
        self.elements.get(index).map(Vec::as_slice)
    }

    /// Value at an element/component position.
    ///
    /// With `component == None` the whole element is returned, its components
    /// joined by `:` whatever component separator the input used. Formats
    /// applied to whole elements (such as `%y%m%d:%H%M`) rely on this.
    pub fn value(&self, element: usize, component: Option<usize>) -> Option<String> {
        let components = self.elements.get(element)?;
        match component {
            Some(index) => components.get(index).cloned(),
            None => Some(components.join(":")),
        }
    }
}

/// Split interchange text into segment lines.
///
/// A leading `UNA` advice overrides `fallback` (the advice itself is not
/// returned as a line). Splits on unreleased terminators and skips blank
/// segments.
pub fn segments_from_text(text: &str, fallback: &Delimiters) -> (Delimiters, Vec<Line>) {
    let trimmed = text.trim_start();
    let (delimiters, body) = match Delimiters::from_una(trimmed) {
        Some(delimiters) => {
            // "UNA" plus six service characters
            let advice_end = trimmed
                .char_indices()
                .nth(9)
                .map_or(trimmed.len(), |(i, _)| i);
            (delimiters, &trimmed[advice_end..])
        }
        None => (*fallback, trimmed),
    };

    let lines = split_released(body, delimiters.terminator, delimiters.release)
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| Line::parse_with(segment, &delimiters))
        .collect();

    (delimiters, lines)
}

/// Tokenize one raw text line per segment.
///
/// The result has one entry per raw line so positions stay aligned with the
/// input: blank lines become empty lines. If the first non-blank line is a
/// `UNA` advice it also becomes an empty line, and its delimiters replace
/// `fallback` for everything after it.
pub fn lines_from_raw<S: AsRef<str>>(raw: &[S], fallback: &Delimiters) -> Vec<Line> {
    let mut delimiters = *fallback;
    let mut seen_segment = false;
    let mut lines = Vec::with_capacity(raw.len());

    for line in raw {
        let line: &str = line.as_ref();
        if line.trim().is_empty() {
            lines.push(Line::new(Vec::new()));
            continue;
        }

        if !seen_segment {
            seen_segment = true;
            if let Some(advised) = Delimiters::from_una(line.trim_start()) {
                delimiters = advised;
                lines.push(Line::new(Vec::new()));
                continue;
            }
        }

        lines.push(Line::parse_with(line, &delimiters));
    }

    lines
}

fn strip_terminator<'a>(input: &'a str, delimiters: &Delimiters) -> &'a str {
    match input.strip_suffix(delimiters.terminator) {
        Some(stripped) if !ends_with_release(stripped, delimiters.release) => stripped,
        _ => input,
    }
}

/// True if `input` ends with an odd number of release characters, i.e. the
/// character after it would be escaped.
fn ends_with_release(input: &str, release: char) -> bool {
    input.chars().rev().take_while(|&c| c == release).count() % 2 == 1
}

/// Split on `separator`, ignoring separators preceded by `release`.
/// Returned slices still contain their release characters.
fn split_released(input: &str, separator: char, release: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == release {
            escaped = true;
        } else if c == separator {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&input[start..]);

    parts
}

fn unescape(input: &str, release: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == release {
            // dangling release at the end is kept literally
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }

    out
}
