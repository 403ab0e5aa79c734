//! Positional metadata attached by generated code to parsed fields, for
//! debugging/visualization consumers. Not used internally by [`crate::stream::Stream`].

/// `{offset, start, end}` describing where a field was read from, relative
/// to the root stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Absolute position of this stream's origin within the root stream.
    pub offset: u64,
    /// Start position relative to `offset`.
    pub start: u64,
    /// End position relative to `offset`, or `None` if the field's end was
    /// never recorded (e.g. parsing failed before it closed).
    pub end: Option<u64>,
}

impl Span {
    pub fn new(offset: u64, start: u64, end: Option<u64>) -> Self {
        Self { offset, start, end }
    }

    /// Absolute start position within the root stream.
    pub fn absolute_start(&self) -> u64 {
        self.offset + self.start
    }

    /// Absolute end position within the root stream, if known.
    pub fn absolute_end(&self) -> Option<u64> {
        self.end.map(|e| self.offset + e)
    }
}

/// A [`Span`] plus the ordered per-item spans of an array-typed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySpan {
    pub span: Span,
    pub items: Vec<Span>,
}

impl ArraySpan {
    pub fn new(span: Span) -> Self {
        Self {
            span,
            items: Vec::new(),
        }
    }

    pub fn push_item(&mut self, item: Span) {
        self.items.push(item);
    }
}
