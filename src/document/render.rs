//! Plain-text and HTML projections of a paragraph list.

use std::fmt::Write;

use super::types::{Margins, Paragraph, Style};

/// Concatenate paragraph contents in order.
///
/// Paragraph boundaries occupy no index positions, so the result has exactly
/// one character per flat index.
pub fn plain_text(paragraphs: &[Paragraph]) -> String {
    let mut out = String::with_capacity(paragraphs.iter().map(Paragraph::len).sum());
    for para in paragraphs {
        for chunk in para.content.chunks() {
            out.push_str(chunk);
        }
    }
    out
}

/// Render paragraphs as HTML.
///
/// Each paragraph becomes one block element chosen by its style; inline
/// formatting nests bold inside italic inside subscript/superscript.
pub fn to_html(paragraphs: &[Paragraph], margins: &Margins) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<main style=\"padding: {}mm {}mm {}mm {}mm\">",
        margins.top, margins.right, margins.bottom, margins.left
    );
    for para in paragraphs {
        let tag = block_tag(para.style());
        let mut inner = escape_html(&para.text());
        if para.is_bold() {
            inner = format!("<b>{inner}</b>");
        }
        if para.is_italic() {
            inner = format!("<i>{inner}</i>");
        }
        if para.is_subscript() {
            inner = format!("<sub>{inner}</sub>");
        }
        if para.is_superscript() {
            inner = format!("<sup>{inner}</sup>");
        }
        let _ = write!(out, "<{tag}>{inner}</{tag}>");
    }
    out.push_str("</main>");
    out
}

const fn block_tag(style: Style) -> &'static str {
    match style {
        Style::Title => "h1",
        Style::Heading => "h2",
        Style::Subheading => "h3",
        Style::Body => "p",
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Format;

    fn para(text: &str, format: Format) -> Paragraph {
        Paragraph::new(0, text, format)
    }

    #[test]
    fn test_plain_text_concatenates_without_separator() {
        let paras = vec![
            para("Hello", Format::default()),
            para(" world", Format::default()),
        ];
        assert_eq!(plain_text(&paras), "Hello world");
    }

    #[test]
    fn test_html_wraps_blocks_by_style() {
        let title = Format {
            style: Style::Title,
            ..Format::default()
        };
        let paras = vec![para("Report", title), para("Body", Format::default())];
        let html = to_html(&paras, &Margins::default());
        assert!(html.contains("<h1>Report</h1><p>Body</p>"));
        assert!(html.starts_with("<main style=\"padding: 25mm 25mm 25mm 25mm\">"));
        assert!(html.ends_with("</main>"));
    }

    #[test]
    fn test_html_nests_inline_formatting() {
        let format = Format {
            bold: true,
            italic: true,
            superscript: true,
            ..Format::default()
        };
        let html = to_html(&[para("x", format)], &Margins::default());
        assert!(html.contains("<p><sup><i><b>x</b></i></sup></p>"));
    }

    #[test]
    fn test_html_escapes_content() {
        let html = to_html(&[para("a<b & \"c\"", Format::default())], &Margins::default());
        assert!(html.contains("<p>a&lt;b &amp; &quot;c&quot;</p>"));
    }

    #[test]
    fn test_html_margins_follow_css_order() {
        let margins = Margins {
            left: 4.0,
            right: 2.0,
            top: 1.0,
            bottom: 3.0,
        };
        let html = to_html(&[], &margins);
        assert_eq!(html, "<main style=\"padding: 1mm 2mm 3mm 4mm\"></main>");
    }
}
