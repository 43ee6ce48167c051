use thiserror::Error;

pub const DEFAULT_MAX_SIZE: usize = 1000;
pub const DEFAULT_OVERLAP: usize = 200;

/// Break points tried in order before falling back to a hard cut.
/// A cut lands just after the separator, so the separator stays with the
/// earlier piece.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " "];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkerError {
    #[error("max_size must be greater than zero")]
    ZeroMaxSize,
    #[error("overlap ({overlap}) must be smaller than max_size ({max_size})")]
    OverlapTooLarge { overlap: usize, max_size: usize },
}

/// A piece of the input, as half-open char and byte ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub byte_start: usize,
    pub byte_end: usize,
}

impl Span {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.byte_start..self.byte_end]
    }

    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// Splits text into overlapping pieces of at most `max_size` chars.
///
/// Guarantees, for any input:
/// - pieces are contiguous substrings, produced left to right
/// - every char of the input is in at least one piece
/// - no piece is longer than `max_size` chars
/// - consecutive pieces share at most `overlap` chars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl Chunker {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self, ChunkerError> {
        if max_size == 0 {
            return Err(ChunkerError::ZeroMaxSize);
        }
        if overlap >= max_size {
            return Err(ChunkerError::OverlapTooLarge { overlap, max_size });
        }
        Ok(Self { max_size, overlap })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.spans(text)
            .iter()
            .map(|span| span.slice(text).to_string())
            .collect()
    }

    pub fn spans(&self, text: &str) -> Vec<Span> {
        // offsets[i] is the byte position of char i; the last entry is text.len()
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = offsets.len() - 1;

        let span = |start: usize, end: usize| Span {
            start,
            end,
            byte_start: offsets[start],
            byte_end: offsets[end],
        };

        if char_len == 0 {
            return Vec::new();
        }
        if char_len <= self.max_size {
            return vec![span(0, char_len)];
        }

        let chars: Vec<char> = text.chars().collect();
        let mut spans = Vec::with_capacity(char_len / (self.max_size - self.overlap) + 1);
        let mut start = 0;

        loop {
            if char_len - start <= self.max_size {
                spans.push(span(start, char_len));
                break;
            }

            let window_end = start + self.max_size;
            // A natural cut must leave the piece at least half full and must
            // move past the overlap, otherwise the next piece would not advance.
            let min_cut = start + self.overlap.max(self.max_size / 2);
            let window = &text[offsets[start]..offsets[window_end]];
            let (cut, at_boundary) = match natural_cut(window, start, min_cut)
                .or_else(|| last_word_boundary(window, start))
            {
                Some(cut) => (cut, true),
                None => (window_end, false),
            };

            spans.push(span(start, cut));
            start = next_start(&chars, start, cut, self.overlap, at_boundary);
        }

        debug_assert!(spans.windows(2).all(|w| w[1].start > w[0].start && w[1].start <= w[0].end));
        spans
    }
}

/// Split with explicit parameters.
pub fn split(text: &str, max_size: usize, overlap: usize) -> Result<Vec<String>, ChunkerError> {
    Ok(Chunker::new(max_size, overlap)?.split(text))
}

fn natural_cut(window: &str, window_start: usize, min_cut: usize) -> Option<usize> {
    SEPARATORS.iter().find_map(|sep| {
        let at = window.rfind(sep)?;
        let cut = window_start + window[..at].chars().count() + sep.chars().count();
        (cut > min_cut).then_some(cut)
    })
}

/// Cut just after the last whitespace in the window. Used when no separator
/// leaves the piece half full, so a word that fits in the next piece is not
/// cut in two.
fn last_word_boundary(window: &str, window_start: usize) -> Option<usize> {
    let at = window.rfind(char::is_whitespace)?;
    Some(window_start + window[..at].chars().count() + 1)
}

/// Start of the next piece: `overlap` chars before the cut, moved forward to
/// the first word start inside the overlap region when there is one.
///
/// After a cut at a word boundary, a region holding no word start is skipped
/// and the next piece begins at the cut.
fn next_start(chars: &[char], start: usize, cut: usize, overlap: usize, at_boundary: bool) -> usize {
    let earliest = cut.saturating_sub(overlap);
    (earliest..cut)
        .find(|&p| p > start && chars[p - 1].is_whitespace() && !chars[p].is_whitespace())
        .unwrap_or(if at_boundary { cut } else { earliest })
}
