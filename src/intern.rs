use ahash::RandomState;
use hashbrown::raw::RawTable;

/// A line represented as an interned integer.
///
/// Tokens are the smallest unit of change during the line-level diff. All
/// algorithms operate on interned tokens instead of the line data directly,
/// which amortizes the cost of hashing/equality: after interning, two lines
/// are equal if and only if their tokens are equal.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[repr(transparent)]
pub(crate) struct Token(pub u32);

/// Strips leading and trailing ASCII spaces and tabs.
///
/// This is the exact trimming applied before interning and when building
/// character sequences. It intentionally leaves `\r` alone so that a change
/// of line terminator is never mistaken for a whitespace-only change.
pub(crate) fn trim_ws(line: &str) -> &str {
    line.trim_matches(|c| c == ' ' || c == '\t')
}

/// A perfect interner: every distinct line maps to a distinct dense id.
///
/// The hash only locates the bucket; candidate entries are compared by full
/// string equality before a token is reused. A plain bit-mixing hash would
/// not be an adequate substitute, since token equality is the only equality
/// primitive used by the algorithms and a collision would silently corrupt
/// the diff.
///
/// Ids are assigned in insertion order starting at zero, so the mapping is
/// deterministic across runs for identical input.
pub(crate) struct Interner<'a> {
    lines: Vec<&'a str>,
    table: RawTable<Token>,
    hasher: RandomState,
}

impl<'a> Interner<'a> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Interner {
            lines: Vec::with_capacity(capacity),
            table: RawTable::with_capacity(capacity),
            hasher: RandomState::new(),
        }
    }

    /// Returns the token for `line`, interning it first if it is new.
    ///
    /// Callers are expected to pass lines already trimmed with [`trim_ws`].
    pub(crate) fn intern(&mut self, line: &'a str) -> Token {
        let hash = self.hasher.hash_one(line);
        if let Some(&token) = self
            .table
            .get(hash, |&it| self.lines[it.0 as usize] == line)
        {
            token
        } else {
            let token = Token(self.lines.len() as u32);
            self.table.insert(hash, token, |&token| {
                self.hasher.hash_one(self.lines[token.0 as usize])
            });
            self.lines.push(line);
            token
        }
    }

    /// The number of distinct lines interned so far; token ids are dense in
    /// `[0, len)`.
    pub(crate) fn len(&self) -> u32 {
        self.lines.len() as u32
    }
}
