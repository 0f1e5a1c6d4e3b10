//! Core document types.

use std::fmt;
use std::str::FromStr;

use ropey::Rope;
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Stable paragraph identity, assigned at creation and never reused.
pub type ParagraphId = u64;

/// Structural role of a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Title,
    Heading,
    Subheading,
    #[default]
    Body,
}

impl Style {
    /// The lowercase name used by the tool layer and the save format.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Heading => "heading",
            Self::Subheading => "subheading",
            Self::Body => "body",
        }
    }
}

impl FromStr for Style {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "heading" => Ok(Self::Heading),
            "subheading" => Ok(Self::Subheading),
            "body" => Ok(Self::Body),
            other => Err(DocumentError::InvalidArgument(format!(
                "unknown style '{other}'"
            ))),
        }
    }
}

/// Formatting carried by a whole paragraph.
///
/// Two paragraphs may only be merged when their formats are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Format {
    pub bold: bool,
    pub italic: bool,
    pub subscript: bool,
    pub superscript: bool,
    pub style: Style,
}

impl Format {
    /// Apply `attribute` as a toggle.
    ///
    /// Booleans are inverted. Turning subscript on clears superscript and
    /// the other way round. A style flips between itself and [`Style::Body`].
    pub fn toggle(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Bold => self.bold = !self.bold,
            Attribute::Italic => self.italic = !self.italic,
            Attribute::Subscript => {
                self.subscript = !self.subscript;
                if self.subscript {
                    self.superscript = false;
                }
            }
            Attribute::Superscript => {
                self.superscript = !self.superscript;
                if self.superscript {
                    self.subscript = false;
                }
            }
            Attribute::Style(style) => {
                self.style = if self.style == style {
                    Style::Body
                } else {
                    style
                };
            }
        }
    }
}

/// A formatting attribute accepted by `toggle_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Bold,
    Italic,
    Subscript,
    Superscript,
    Style(Style),
}

impl FromStr for Attribute {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(Self::Bold),
            "italic" => Ok(Self::Italic),
            // Older tool clients send "lowerscript".
            "subscript" | "lowerscript" => Ok(Self::Subscript),
            "superscript" => Ok(Self::Superscript),
            other => other
                .parse::<Style>()
                .map(Self::Style)
                .map_err(|_| DocumentError::InvalidArgument(format!("unknown attribute '{other}'"))),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bold => f.write_str("bold"),
            Self::Italic => f.write_str("italic"),
            Self::Subscript => f.write_str("subscript"),
            Self::Superscript => f.write_str("superscript"),
            Self::Style(style) => f.write_str(style.as_str()),
        }
    }
}

/// One of the four page margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarginSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl FromStr for MarginSide {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(DocumentError::InvalidArgument(format!(
                "unknown margin '{other}'"
            ))),
        }
    }
}

impl fmt::Display for MarginSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        })
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    /// Margin applied to every side of a fresh document.
    pub const DEFAULT_MM: f64 = 25.0;

    pub const fn get(&self, side: MarginSide) -> f64 {
        match side {
            MarginSide::Left => self.left,
            MarginSide::Right => self.right,
            MarginSide::Top => self.top,
            MarginSide::Bottom => self.bottom,
        }
    }

    pub const fn set(&mut self, side: MarginSide, value_mm: f64) {
        match side {
            MarginSide::Left => self.left = value_mm,
            MarginSide::Right => self.right = value_mm,
            MarginSide::Top => self.top = value_mm,
            MarginSide::Bottom => self.bottom = value_mm,
        }
    }

    /// True when every margin is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.left, self.right, self.top, self.bottom]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: Self::DEFAULT_MM,
            right: Self::DEFAULT_MM,
            top: Self::DEFAULT_MM,
            bottom: Self::DEFAULT_MM,
        }
    }
}

/// A paragraph record.
///
/// `start`/`end` are the paragraph's half-open range in the document's flat
/// character index. They are owned by the buffer and rewritten after every
/// mutation; a paragraph on its own cannot know them.
#[derive(Debug, Clone)]
pub struct Paragraph {
    id: ParagraphId,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) content: Rope,
    pub(crate) format: Format,
}

impl Paragraph {
    pub(crate) fn new(id: ParagraphId, content: &str, format: Format) -> Self {
        let content = Rope::from_str(content);
        let end = content.len_chars();
        Self {
            id,
            start: 0,
            end,
            content,
            format,
        }
    }

    pub(crate) const fn from_rope(id: ParagraphId, content: Rope, format: Format) -> Self {
        Self {
            id,
            start: 0,
            end: 0,
            content,
            format,
        }
    }

    pub const fn id(&self) -> ParagraphId {
        self.id
    }

    /// First flat index covered by this paragraph.
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last flat index covered by this paragraph.
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.content.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.content.len_chars() == 0
    }

    /// The paragraph's text.
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    pub const fn format(&self) -> Format {
        self.format
    }

    pub const fn is_bold(&self) -> bool {
        self.format.bold
    }

    pub const fn is_italic(&self) -> bool {
        self.format.italic
    }

    pub const fn is_subscript(&self) -> bool {
        self.format.subscript
    }

    pub const fn is_superscript(&self) -> bool {
        self.format.superscript
    }

    pub const fn style(&self) -> Style {
        self.format.style
    }

    /// A serializable snapshot of this paragraph.
    pub fn view(&self) -> ParagraphView {
        ParagraphView {
            id: self.id,
            start: self.start,
            end: self.end,
            content: self.text(),
            bold: self.format.bold,
            italic: self.format.italic,
            subscript: self.format.subscript,
            superscript: self.format.superscript,
            style: self.format.style,
        }
    }
}

/// Flat, serializable summary of a paragraph.
///
/// This is both what the tool layer lists to the agent and the record
/// shape of the save format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphView {
    pub id: ParagraphId,
    pub start: usize,
    pub end: usize,
    pub content: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub subscript: bool,
    #[serde(default)]
    pub superscript: bool,
    #[serde(default)]
    pub style: Style,
}

impl ParagraphView {
    pub const fn format(&self) -> Format {
        Format {
            bold: self.bold,
            italic: self.italic,
            subscript: self.subscript,
            superscript: self.superscript,
            style: self.style,
        }
    }
}
