//! Line chunker: packs formatted lines into messages under a size limit.
//!
//! Telegram caps a message at 4096 characters; the bot packs example lines
//! greedily into as few messages as possible while staying under a working
//! limit that leaves headroom for delivery-layer overhead. A logical line is
//! never split across messages.

/// Working per-message limit, safely under Telegram's 4096 ceiling.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4000;

/// Pack `lines` into chunks of at most `max_size` characters each.
///
/// Every line is emitted exactly once, in order, with exactly one `\n`
/// appended. A line is added to the current chunk while the running length
/// (separators included) stays within `max_size`; otherwise the chunk is
/// closed and a new one starts. A single line that alone exceeds `max_size`
/// occupies its own oversized chunk rather than being split, since splitting
/// would corrupt a formatted sentence pair. Empty input yields no chunks.
///
/// Lengths are counted in characters, matching how Telegram measures its
/// message limit for practical purposes.
pub fn chunk_lines<S: AsRef<str>>(lines: &[S], max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in lines {
        let line = line.as_ref();
        let line_len = line.chars().count() + 1;

        if current_len > 0 && current_len + line_len > max_size {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        current.push_str(line);
        current.push('\n');
        current_len += line_len;
    }

    if current_len > 0 {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    // ==================== Basic Packing Tests ====================

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let lines: Vec<String> = Vec::new();
        assert!(chunk_lines(&lines, 100).is_empty());
    }

    #[test]
    fn test_single_short_line() {
        let chunks = chunk_lines(&["*Short* message"], 100);
        assert_eq!(chunks, vec!["*Short* message\n"]);
    }

    #[test]
    fn test_all_lines_fit_in_one_chunk() {
        let chunks = chunk_lines(&["a", "b", "c"], 100);
        assert_eq!(chunks, vec!["a\nb\nc\n"]);
    }

    #[test]
    fn test_greedy_split_at_limit() {
        // Each line costs 5 chars with its separator; three fit in 16, the
        // fourth opens a new chunk.
        let lines = ["aaaa", "bbbb", "cccc", "dddd"];
        let chunks = chunk_lines(&lines, 16);

        assert_eq!(chunks, vec!["aaaa\nbbbb\ncccc\n", "dddd\n"]);
    }

    #[test]
    fn test_telegram_sized_packing() {
        // 130 identical lines, 32 chars each with separator, limit 4096:
        // 128 per chunk, remainder in the second.
        let line = "x".repeat(31);
        let lines = vec![line; 130];
        let chunks = chunk_lines(&lines, 4096);

        assert_eq!(chunks.len(), 2);
        assert_eq!(char_len(&chunks[0]), 4096);
        assert_eq!(char_len(&chunks[1]), 64);
    }

    // ==================== Boundary Tests ====================

    #[test]
    fn test_line_exactly_at_limit_gets_own_chunk() {
        // The line plus its separator exceeds max_size, so it cannot merge
        // with any neighbor.
        let exact = "y".repeat(10);
        let chunks = chunk_lines(&[exact.as_str(), "z"], 10);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], format!("{}\n", exact));
        assert_eq!(chunks[1], "z\n");
    }

    #[test]
    fn test_line_filling_limit_with_separator_does_not_merge() {
        let nine = "y".repeat(9);
        let chunks = chunk_lines(&[nine.as_str(), "z"], 10);

        // nine + separator == 10 == max, the next line must not fit
        assert_eq!(chunks.len(), 2);
        assert_eq!(char_len(&chunks[0]), 10);
    }

    #[test]
    fn test_oversized_line_is_not_split() {
        let huge = "h".repeat(50);
        let chunks = chunk_lines(&["ok", huge.as_str(), "ok"], 10);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "ok\n");
        assert_eq!(chunks[1], format!("{}\n", huge));
        assert_eq!(chunks[2], "ok\n");
    }

    #[test]
    fn test_oversized_line_first_does_not_emit_empty_chunk() {
        let huge = "h".repeat(50);
        let chunks = chunk_lines(&[huge.as_str()], 10);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], format!("{}\n", huge));
    }

    #[test]
    fn test_length_counted_in_chars_not_bytes() {
        // Cyrillic with combining accents: multi-byte, few chars
        let line = "у́хо";
        let cost = char_len(line) + 1;
        let chunks = chunk_lines(&[line, line], cost * 2);

        assert_eq!(chunks.len(), 1, "both lines fit when counting chars");
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_concat_preserves_all_lines(
            lines in proptest::collection::vec("[a-zа-я ]{0,40}", 0..50),
            max_size in 1usize..200,
        ) {
            let chunks = chunk_lines(&lines, max_size);

            let expected: String = lines
                .iter()
                .map(|l| format!("{}\n", l))
                .collect();
            let actual: String = chunks.concat();

            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_chunks_respect_limit_or_are_single_line(
            lines in proptest::collection::vec("[a-z]{0,30}", 1..40),
            max_size in 1usize..60,
        ) {
            for chunk in chunk_lines(&lines, max_size) {
                let len = chunk.chars().count();
                let line_count = chunk.matches('\n').count();
                prop_assert!(
                    len <= max_size || line_count == 1,
                    "oversized chunk with {} lines", line_count
                );
            }
        }

        #[test]
        fn prop_no_empty_chunks(
            lines in proptest::collection::vec("[a-z]{0,10}", 0..20),
            max_size in 1usize..30,
        ) {
            for chunk in chunk_lines(&lines, max_size) {
                prop_assert!(!chunk.is_empty());
            }
        }
    }
}
