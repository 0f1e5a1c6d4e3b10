use ropey::Rope;

use crate::document::{
    self, Attribute, Format, MarginSide, Margins, Paragraph, ParagraphId, SavedDocument,
};
use crate::error::DocumentError;

/// A paragraph-structured text buffer addressed by a flat character index.
///
/// Paragraphs are kept in document order; each record carries its stable id,
/// so splits and merges are edits of the ordered list. Paragraph boundaries
/// take no room in the index space: paragraph `i` starts where paragraph
/// `i - 1` ends.
///
/// Every operation validates its arguments before touching any field, so a
/// failed call leaves both content and [`version`](Self::version) unchanged.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    paragraphs: Vec<Paragraph>,
    next_id: ParagraphId,
    margins: Margins,
    version: u64,
}

impl TextBuffer {
    /// Create an empty buffer: a single empty paragraph at version 0.
    pub fn new() -> Self {
        Self {
            paragraphs: vec![Paragraph::new(0, "", Format::default())],
            next_id: 1,
            margins: Margins::default(),
            version: 0,
        }
    }

    /// Create a buffer from text, one paragraph per line.
    ///
    /// Blank lines do not produce paragraphs. The result is at version 0.
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        let lines: Vec<&str> = text.split('\n').filter(|l| !l.is_empty()).collect();
        if !lines.is_empty() {
            buffer.paragraphs = lines
                .iter()
                .enumerate()
                .map(|(i, line)| Paragraph::new(i as ParagraphId, line, Format::default()))
                .collect();
            buffer.next_id = lines.len() as ParagraphId;
        }
        buffer.reindex_from(0);
        buffer
    }

    /// The start-up document the word processor has always greeted users with.
    pub fn sample() -> Self {
        let mut buffer =
            Self::from_text("This is a sample document.\nAnd i am trying out some stuff right here.");
        let start = "This is a ".chars().count();
        let end = start + "sample ".chars().count();
        for pos in [start, end] {
            buffer.split_at(pos);
        }
        if let Some(para) = buffer.paragraphs.get_mut(1) {
            para.format.toggle(Attribute::Bold);
        }
        buffer
    }

    /// Rebuild a buffer from already validated parts.
    pub(crate) fn from_parts(paragraphs: Vec<Paragraph>, margins: Margins) -> Self {
        let next_id = paragraphs
            .iter()
            .map(|p| p.id().saturating_add(1))
            .max()
            .unwrap_or(0);
        let mut buffer = Self {
            paragraphs,
            next_id,
            margins,
            version: 0,
        };
        if buffer.paragraphs.is_empty() {
            buffer.paragraphs.push(Paragraph::new(next_id, "", Format::default()));
            buffer.next_id += 1;
        }
        buffer.reindex_from(0);
        buffer
    }

    /// Number of mutations applied since creation or load.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Total length of the document in characters.
    pub fn len(&self) -> usize {
        self.paragraphs.last().map_or(0, Paragraph::end)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paragraphs in document order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Look up a paragraph by id.
    pub fn paragraph(&self, id: ParagraphId) -> Option<&Paragraph> {
        self.paragraphs.iter().find(|p| p.id() == id)
    }

    pub const fn margins(&self) -> &Margins {
        &self.margins
    }

    /// Map a flat index to its paragraph and the offset inside it.
    ///
    /// `index == len()` resolves to the end of the last paragraph.
    ///
    /// # Errors
    /// Returns [`DocumentError::OutOfRange`] when `index > len()`.
    pub fn resolve(&self, index: usize) -> Result<(&Paragraph, usize), DocumentError> {
        let (pos, offset) = self.locate(index)?;
        Ok((&self.paragraphs[pos], offset))
    }

    /// Insert `text` at flat index `index`.
    ///
    /// A `'\n'` in `text` splits the paragraph; every resulting paragraph
    /// keeps the formatting of the paragraph that was split. Empty pieces
    /// are dropped.
    ///
    /// # Errors
    /// [`DocumentError::InvalidArgument`] for empty text,
    /// [`DocumentError::OutOfRange`] when `index > len()`.
    pub fn insert(&mut self, text: &str, index: usize) -> Result<(), DocumentError> {
        if text.is_empty() {
            return Err(DocumentError::InvalidArgument(
                "cannot insert empty text".to_string(),
            ));
        }
        let (pos, offset) = self.locate(index)?;

        if text.contains('\n') {
            self.insert_with_breaks(text, pos, offset);
        } else {
            self.paragraphs[pos].content.insert(offset, text);
        }

        self.prune_empty();
        self.reindex_from(pos.min(self.paragraphs.len() - 1));
        self.bump();
        Ok(())
    }

    fn insert_with_breaks(&mut self, text: &str, pos: usize, offset: usize) {
        let format = self.paragraphs[pos].format;
        let tail = self.paragraphs[pos].content.split_off(offset);

        let mut pieces: Vec<&str> = text.split('\n').collect();
        // `text` contains a break, so there are at least two pieces.
        let last = pieces.pop().unwrap_or_default();
        let mut pieces = pieces.into_iter();
        if let Some(first) = pieces.next() {
            let head = &mut self.paragraphs[pos].content;
            let at = head.len_chars();
            head.insert(at, first);
        }

        let mut created: Vec<Paragraph> = pieces
            .map(|piece| Paragraph::new(self.alloc_id(), piece, format))
            .collect();
        let mut rope = Rope::from_str(last);
        rope.append(tail);
        created.push(Paragraph::from_rope(self.alloc_id(), rope, format));

        let rest = self.paragraphs.split_off(pos + 1);
        self.paragraphs.extend(created);
        self.paragraphs.extend(rest);
    }

    /// Delete the characters in `start..end`.
    ///
    /// Paragraphs emptied by the deletion are removed unless they are the
    /// only paragraph left. When the range crosses a paragraph boundary or
    /// swallows a whole paragraph, the paragraphs left on either side of the
    /// gap become neighbours and merge if their formatting matches.
    ///
    /// # Errors
    /// [`DocumentError::InvalidRange`] unless `start < end <= len()`.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<(), DocumentError> {
        self.check_range(start, end)?;
        let (first, start_offset) = self.locate_unchecked(start);
        let (last, end_offset) = self.locate_unchecked(end - 1);
        let end_offset = end_offset + 1;
        let count = self.paragraphs.len();

        if first == last {
            self.paragraphs[first]
                .content
                .remove(start_offset..end_offset);
        } else {
            self.paragraphs[first].content.remove(start_offset..);
            self.paragraphs[last].content.remove(..end_offset);
            self.paragraphs.drain(first + 1..last);
        }

        self.prune_empty();
        self.reindex_from(first.min(self.paragraphs.len() - 1));
        if first != last || self.paragraphs.len() < count {
            self.merge_at(start);
        }
        self.bump();
        Ok(())
    }

    /// Every non-overlapping occurrence of `term`, as flat `(start, end)` pairs.
    ///
    /// Matching is exact and case-sensitive over the concatenated text, so a
    /// match may span paragraphs. An empty term matches nothing.
    pub fn find(&self, term: &str) -> Vec<(usize, usize)> {
        if term.is_empty() {
            return Vec::new();
        }
        let text = self.plain_text();
        let term_chars = term.chars().count();
        let mut matches = Vec::new();
        let mut byte_cursor = 0;
        let mut char_cursor = 0;
        for (byte_idx, _) in text.match_indices(term) {
            char_cursor += text[byte_cursor..byte_idx].chars().count();
            matches.push((char_cursor, char_cursor + term_chars));
            char_cursor += term_chars;
            byte_cursor = byte_idx + term.len();
        }
        matches
    }

    /// Toggle `attribute` on every paragraph inside `start..end`.
    ///
    /// Paragraphs straddling either bound are split first so that formatting
    /// stays paragraph-granular.
    ///
    /// # Errors
    /// [`DocumentError::InvalidRange`] unless `start < end <= len()`.
    pub fn toggle_format(
        &mut self,
        start: usize,
        end: usize,
        attribute: Attribute,
    ) -> Result<(), DocumentError> {
        self.check_range(start, end)?;
        let first = self.split_at(start);
        let last = self.split_at(end);
        for para in &mut self.paragraphs[first..last] {
            para.format.toggle(attribute);
        }
        self.bump();
        Ok(())
    }

    /// Set one page margin.
    ///
    /// # Errors
    /// [`DocumentError::InvalidArgument`] for negative or non-finite values.
    pub fn set_margin(&mut self, side: MarginSide, value_mm: f64) -> Result<(), DocumentError> {
        if !value_mm.is_finite() || value_mm < 0.0 {
            return Err(DocumentError::InvalidArgument(format!(
                "margin {side} must be a non-negative number of millimetres, got {value_mm}"
            )));
        }
        self.margins.set(side, value_mm);
        self.bump();
        Ok(())
    }

    /// Replace the whole document with `other`, as a single mutation.
    pub fn replace(&mut self, other: Self) {
        let version = self.version;
        *self = other;
        self.version = version;
        self.bump();
    }

    /// All paragraph contents concatenated; indices from [`find`](Self::find)
    /// address this string by character.
    pub fn plain_text(&self) -> String {
        document::plain_text(&self.paragraphs)
    }

    /// HTML rendering: one block per paragraph inside a margin-padded `<main>`.
    pub fn markup(&self) -> String {
        document::to_html(&self.paragraphs, &self.margins)
    }

    /// Encode paragraphs and margins in the save format.
    ///
    /// # Errors
    /// Only fails if JSON encoding fails, which plain data never does.
    pub fn serialize(&self) -> Result<Vec<u8>, DocumentError> {
        SavedDocument::capture(&self.paragraphs, &self.margins).encode()
    }

    /// Rebuild a buffer from [`serialize`](Self::serialize) output.
    ///
    /// Offsets are recomputed; the stored ones are ignored.
    ///
    /// # Errors
    /// [`DocumentError::Deserialization`] for malformed or inconsistent input.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DocumentError> {
        let saved = SavedDocument::decode(bytes)?;
        let (paragraphs, margins) = saved.into_parts()?;
        Ok(Self::from_parts(paragraphs, margins))
    }

    /// Whether offsets, emptiness and formatting invariants all hold.
    pub fn is_consistent(&self) -> bool {
        let Some(first) = self.paragraphs.first() else {
            return false;
        };
        if first.start() != 0 {
            return false;
        }
        let lone = self.paragraphs.len() == 1;
        self.paragraphs.windows(2).all(|w| w[0].end() == w[1].start())
            && self.paragraphs.iter().all(|p| {
                p.start() + p.len() == p.end()
                    && (lone || !p.is_empty())
                    && !(p.is_subscript() && p.is_superscript())
            })
    }

    fn locate(&self, index: usize) -> Result<(usize, usize), DocumentError> {
        let len = self.len();
        if index > len {
            return Err(DocumentError::OutOfRange { index, len });
        }
        Ok(self.locate_unchecked(index))
    }

    /// Position and local offset of `index`, which must be `<= len()`.
    fn locate_unchecked(&self, index: usize) -> (usize, usize) {
        let last = self.paragraphs.len() - 1;
        let pos = self
            .paragraphs
            .partition_point(|p| p.end() <= index)
            .min(last);
        (pos, index - self.paragraphs[pos].start())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), DocumentError> {
        let len = self.len();
        if start >= end || end > len {
            return Err(DocumentError::InvalidRange { start, end, len });
        }
        Ok(())
    }

    /// Make `index` a paragraph boundary and return the position of the
    /// paragraph starting there (`paragraphs.len()` at the document end).
    fn split_at(&mut self, index: usize) -> usize {
        if index >= self.len() {
            return self.paragraphs.len();
        }
        let (pos, offset) = self.locate_unchecked(index);
        if offset == 0 {
            return pos;
        }
        let format = self.paragraphs[pos].format;
        let right = self.paragraphs[pos].content.split_off(offset);
        let id = self.alloc_id();
        self.paragraphs
            .insert(pos + 1, Paragraph::from_rope(id, right, format));
        self.reindex_from(pos);
        pos + 1
    }

    /// Merge the paragraph at `pos + 1` into the one at `pos`.
    ///
    /// Only identically formatted neighbours merge; the earlier id survives.
    fn merge_adjacent(&mut self, pos: usize) {
        let mergeable = self
            .paragraphs
            .get(pos + 1)
            .is_some_and(|next| next.format == self.paragraphs[pos].format);
        if !mergeable {
            return;
        }
        let next = self.paragraphs.remove(pos + 1);
        self.paragraphs[pos].content.append(next.content);
        self.reindex_from(pos);
    }

    /// Merge the two paragraphs meeting at flat index `index`, if any.
    fn merge_at(&mut self, index: usize) {
        let pos = self.paragraphs.partition_point(|p| p.start() < index);
        if pos > 0 && self.paragraphs.get(pos).is_some_and(|p| p.start() == index) {
            self.merge_adjacent(pos - 1);
        }
    }

    /// Drop empty paragraphs, keeping one if nothing else is left.
    fn prune_empty(&mut self) {
        if self.paragraphs.iter().all(Paragraph::is_empty) {
            self.paragraphs.truncate(1);
        } else {
            self.paragraphs.retain(|p| !p.is_empty());
        }
    }

    fn reindex_from(&mut self, pos: usize) {
        let mut offset = match pos.checked_sub(1) {
            Some(prev) => self.paragraphs[prev].end(),
            None => 0,
        };
        for para in self.paragraphs.iter_mut().skip(pos) {
            para.start = offset;
            offset += para.len();
            para.end = offset;
        }
    }

    const fn alloc_id(&mut self) -> ParagraphId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn bump(&mut self) {
        debug_assert!(self.is_consistent(), "buffer invariants broken: {self:?}");
        self.version += 1;
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
