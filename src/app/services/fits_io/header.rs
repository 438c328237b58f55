//! FITS header cards
//!
//! A card is 80 ASCII characters: an 8-character keyword, an optional
//! `= ` value indicator, then a value and an optional `/ comment`.

use crate::constants::FITS_CARD_SIZE;
use std::fmt;

/// Typed value written to, or interpreted from, a header card
#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    Text(String),
    Int(i64),
    Float(f64),
    Logical(bool),
}

impl CardValue {
    /// Text as it appears in the value field of a card
    fn to_card_text(&self) -> String {
        match self {
            CardValue::Text(s) => {
                let escaped = s.replace('\'', "''");
                // String values are at least 8 characters between the quotes
                format!("'{:<8}'", escaped)
            }
            CardValue::Int(v) => format!("{:>20}", v),
            CardValue::Float(v) => format!("{:>20}", format_float(*v)),
            CardValue::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
        }
    }
}

impl fmt::Display for CardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardValue::Text(s) => write!(f, "'{}'", s),
            CardValue::Int(v) => write!(f, "{}", v),
            CardValue::Float(v) => write!(f, "{}", format_float(*v)),
            CardValue::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
        }
    }
}

/// Float text that always carries a decimal point
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{:.15E}", value)
    }
}

/// One parsed header card
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCard {
    pub keyword: String,
    /// Value text; quotes removed and `''` unescaped for string values
    pub value: Option<String>,
    /// True when the value was a quoted string
    pub quoted: bool,
    pub comment: Option<String>,
}

impl HeaderCard {
    /// Parse an 80-byte card image
    pub fn parse(card: &[u8]) -> Self {
        let text = String::from_utf8_lossy(card);
        let keyword = text.get(..8).unwrap_or(&text).trim().to_string();

        let has_value = text.get(8..10) == Some("= ");
        if !has_value {
            let comment = text.get(8..).map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
            return Self {
                keyword,
                value: None,
                quoted: false,
                comment,
            };
        }

        let field = text.get(10..).unwrap_or_default();
        let trimmed = field.trim_start();

        if let Some(rest) = trimmed.strip_prefix('\'') {
            let (value, remainder) = parse_quoted(rest);
            Self {
                keyword,
                value: Some(value),
                quoted: true,
                comment: parse_comment(remainder),
            }
        } else {
            let (value, comment) = match trimmed.find('/') {
                Some(idx) => (&trimmed[..idx], parse_comment(&trimmed[idx..])),
                None => (trimmed, None),
            };
            let value = value.trim();
            Self {
                keyword,
                value: (!value.is_empty()).then(|| value.to_string()),
                quoted: false,
                comment,
            }
        }
    }

    /// Interpret the value with FITS free-format rules
    pub fn typed_value(&self) -> Option<CardValue> {
        let value = self.value.as_deref()?;
        if self.quoted {
            return Some(CardValue::Text(value.to_string()));
        }
        match value {
            "T" => return Some(CardValue::Logical(true)),
            "F" => return Some(CardValue::Logical(false)),
            _ => {}
        }
        if let Ok(i) = value.parse::<i64>() {
            return Some(CardValue::Int(i));
        }
        if let Ok(f) = value.replace(['D', 'd'], "E").parse::<f64>() {
            return Some(CardValue::Float(f));
        }
        Some(CardValue::Text(value.to_string()))
    }

    /// Build an 80-character card image
    pub fn format(keyword: &str, value: Option<&CardValue>, comment: Option<&str>) -> String {
        let mut card = format!("{:<8}", truncate(keyword, 8));
        if let Some(value) = value {
            card.push_str("= ");
            card.push_str(&value.to_card_text());
        }
        if let Some(comment) = comment {
            card.push_str(if value.is_some() { " / " } else { "  " });
            card.push_str(comment);
        }
        let mut card = truncate(&card, FITS_CARD_SIZE).to_string();
        while card.len() < FITS_CARD_SIZE {
            card.push(' ');
        }
        card
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Read a quoted string body; returns the value and the text after the closing quote
fn parse_quoted(body: &str) -> (String, &str) {
    let mut value = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c == '\'' {
            if matches!(chars.peek(), Some((_, '\''))) {
                value.push('\'');
                chars.next();
                continue;
            }
            return (value.trim_end().to_string(), &body[idx + 1..]);
        }
        value.push(c);
    }
    // Unterminated string: keep what was read
    (value.trim_end().to_string(), "")
}

fn parse_comment(text: &str) -> Option<String> {
    text.trim_start()
        .strip_prefix('/')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Ordered header of one HDU
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    cards: Vec<HeaderCard>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: HeaderCard) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[HeaderCard] {
        &self.cards
    }

    /// First valued card with this keyword
    pub fn get(&self, keyword: &str) -> Option<&HeaderCard> {
        self.cards
            .iter()
            .find(|c| c.keyword == keyword && c.value.is_some())
    }

    pub fn contains_key(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    pub fn value(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(|c| c.value.as_deref())
    }

    /// Trimmed string value
    pub fn text(&self, keyword: &str) -> Option<&str> {
        self.value(keyword).map(str::trim)
    }

    pub fn int(&self, keyword: &str) -> Option<i64> {
        self.value(keyword).and_then(|v| v.trim().parse::<i64>().ok())
    }
}
