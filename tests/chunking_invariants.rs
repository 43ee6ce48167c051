use docqa_core::document::chunk::build_chunks;
use docqa_core::document::chunker::{self, Chunker, ChunkerError};

fn lease_text() -> String {
    let mut text = String::new();
    for i in 0..40 {
        text.push_str(&format!(
            "Clause {i}. The tenant shall keep the premises in good repair and report defects promptly. "
        ));
        if i % 5 == 4 {
            text.push_str("\n\n");
        }
        if i % 7 == 6 {
            text.push('\n');
        }
    }
    text.push_str("Signed:AVERYLONGSIGNATURETOKENWITHOUTANYBREAKSATALLTHATKEEPSGOING");
    text
}

#[test]
fn invariant_every_char_covered_in_order() {
    let text = lease_text();
    let chars: Vec<char> = text.chars().collect();

    for (max_size, overlap) in [(1000, 200), (300, 50), (120, 0), (64, 63), (25, 5)] {
        let chunker = Chunker::new(max_size, overlap).unwrap();
        let spans = chunker.spans(&text);
        let pieces = chunker.split(&text);
        assert_eq!(spans.len(), pieces.len());

        let mut covered = vec![false; chars.len()];
        let mut previous_start = None;
        for (span, piece) in spans.iter().zip(&pieces) {
            assert!(span.char_len() <= max_size, "piece of {} chars exceeds {max_size}", span.char_len());
            let expected: String = chars[span.start..span.end].iter().collect();
            assert_eq!(piece, &expected);
            if let Some(prev) = previous_start {
                assert!(span.start > prev, "pieces out of order");
            }
            previous_start = Some(span.start);
            for slot in &mut covered[span.start..span.end] {
                *slot = true;
            }
        }
        assert!(covered.iter().all(|c| *c), "uncovered chars for ({max_size}, {overlap})");
    }
}

#[test]
fn invariant_default_parameters() {
    let chunker = Chunker::default();
    assert_eq!(chunker.max_size(), 1000);
    assert_eq!(chunker.overlap(), 200);

    let text = lease_text();
    let spans = chunker.spans(&text);
    assert!(spans.len() > 1);
    for pair in spans.windows(2) {
        let shared = pair[0].end - pair[1].start;
        assert!(shared <= 200);
    }
}

#[test]
fn invariant_natural_boundaries_preferred() {
    let text = lease_text();
    let pieces = Chunker::new(300, 50).unwrap().split(&text);
    // every piece but the last ends on a separator, never mid-word
    for piece in &pieces[..pieces.len() - 1] {
        let last = piece.chars().last().unwrap();
        assert!(last.is_whitespace(), "piece ends mid-word: {piece:?}");
    }
}

/// Char ranges of the whitespace-delimited words in `text`.
fn word_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut word_start = None;
    for (i, c) in text.chars().chain(std::iter::once(' ')).enumerate() {
        match (c.is_whitespace(), word_start) {
            (false, None) => word_start = Some(i),
            (true, Some(s)) => {
                ranges.push((s, i));
                word_start = None;
            }
            _ => {}
        }
    }
    ranges
}

#[test]
fn invariant_words_that_fit_are_never_split() {
    let uneven = format!(
        "{} short {} x {}\n\n{} tail",
        "a".repeat(300),
        "b".repeat(800),
        "c".repeat(450),
        "d".repeat(999)
    );
    let texts = [lease_text(), uneven, "abc defghijk lmnopqrstu v wxyzabcdefg".to_string()];

    for text in &texts {
        for (max_size, overlap) in [(1000, 200), (300, 50), (120, 0), (25, 5), (10, 0), (12, 11)] {
            let spans = Chunker::new(max_size, overlap).unwrap().spans(text);
            for (ws, we) in word_ranges(text) {
                if we - ws > max_size {
                    continue;
                }
                assert!(
                    spans.iter().any(|s| s.start <= ws && we <= s.end),
                    "word at {ws}..{we} split with ({max_size}, {overlap})"
                );
            }
        }
    }
}

#[test]
fn invariant_parameter_validation() {
    assert_eq!(chunker::split("abc", 0, 0), Err(ChunkerError::ZeroMaxSize));
    assert_eq!(
        chunker::split("abc", 5, 7),
        Err(ChunkerError::OverlapTooLarge { overlap: 7, max_size: 5 })
    );
    assert_eq!(chunker::split("", 5, 1), Ok(Vec::new()));
    assert_eq!(chunker::split("abc", 5, 1), Ok(vec!["abc".to_string()]));
}

#[test]
fn chunk_metadata_points_back_into_source() {
    let text = lease_text();
    let chunker = Chunker::new(300, 50).unwrap();
    let spans = chunker.spans(&text);
    let chunks = build_chunks(&text, &spans, "lease.txt");
    let chars: Vec<char> = text.chars().collect();

    for chunk in &chunks {
        let start = chunk.start_char().unwrap();
        let end = chunk.end_char().unwrap();
        let expected: String = chars[start..end].iter().collect();
        assert_eq!(chunk.text, expected);
        assert_eq!(chunk.source_metadata.get_str("source"), Some("lease.txt"));
        let from = chunk.source_metadata.get_number("line_from").unwrap();
        let to = chunk.source_metadata.get_number("line_to").unwrap();
        assert!(from >= 1 && to >= from);
    }
}
