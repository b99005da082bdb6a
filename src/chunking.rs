//! Boundary-aware text chunking with overlap.
//!
//! Splits long text into windows of at most `chunk_size` characters. When a
//! sentence boundary sits in the last 30% of a window the cut moves back to
//! it, so chunks end on sentence boundaries whenever one is close enough and
//! tolerate mid-sentence cuts otherwise. Adjacent chunks share up to
//! `overlap` characters of redundant context.
//!
//! All offsets are character offsets, never byte offsets, so text containing
//! multi-byte glyphs (₹, Devanagari) cannot be split inside a code point.

use crate::types::RagError;

/// Markers that count as a sentence boundary, searched back-to-front.
const BOUNDARY_MARKERS: [&str; 4] = [". ", ".\n", "! ", "?\n"];

/// Fraction of the window a boundary must clear before it is preferred over
/// a raw cut at the window edge.
const BOUNDARY_THRESHOLD: f64 = 0.7;

/// Splits `text` into overlapping, sentence-boundary-aware segments.
///
/// Returns `[text]` untouched when it already fits in one window. Every
/// produced segment is trimmed and non-empty. `overlap >= chunk_size` would
/// make the window stall and is rejected as a configuration error.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>, RagError> {
    if chunk_size == 0 {
        return Err(RagError::Configuration(
            "chunk_size must be greater than zero".into(),
        ));
    }
    if overlap >= chunk_size {
        return Err(RagError::Configuration(format!(
            "chunk overlap {overlap} must be smaller than chunk size {chunk_size}"
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return Ok(vec![text.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());

        if end < chars.len() {
            let window: String = chars[start..end].iter().collect();
            for marker in BOUNDARY_MARKERS {
                if let Some(byte_pos) = window.rfind(marker) {
                    let char_pos = window[..byte_pos].chars().count();
                    if char_pos as f64 > chunk_size as f64 * BOUNDARY_THRESHOLD {
                        end = start + char_pos + marker.chars().count();
                        break;
                    }
                }
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        let next = if end < chars.len() {
            end.saturating_sub(overlap)
        } else {
            end
        };
        // A boundary cut close to the overlap width could stall the window;
        // fall forward to the raw window edge instead.
        start = if next > start { next } else { end };
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_text_returned_verbatim() {
        let text = "A compact 1BHK near the metro.";
        let chunks = chunk_text(text, 512, 50).unwrap();
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn exact_window_size_is_a_single_chunk() {
        let text = "x".repeat(64);
        let chunks = chunk_text(&text, 64, 10).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn prefers_sentence_boundary_near_window_end() {
        // Boundary at ~80% of the window: the cut should land just after it.
        let first = format!("{}. ", "a".repeat(78));
        let text = format!("{}{}", first, "b".repeat(80));
        let chunks = chunk_text(&text, 100, 10).unwrap();
        assert!(chunks[0].ends_with('.'), "chunk was: {:?}", chunks[0]);
        assert!(chunks[1].starts_with('b') || chunks[1].contains('b'));
    }

    #[test]
    fn ignores_boundary_too_early_in_window() {
        // Boundary at 20% of the window: too far back, raw cut wins.
        let text = format!("{}. {}", "a".repeat(18), "b".repeat(200));
        let chunks = chunk_text(&text, 100, 10).unwrap();
        assert_eq!(chunks[0].chars().count(), 100);
    }

    #[test]
    fn overlap_repeats_trailing_context() {
        let text: String = "abcdefghij".chars().cycle().take(250).collect();
        let chunks = chunk_text(&text, 100, 20).unwrap();
        assert!(chunks.len() >= 2);
        let tail: String = chunks[0].chars().rev().take(20).collect();
        let head: String = chunks[1].chars().take(20).collect();
        let tail: String = tail.chars().rev().collect();
        assert_eq!(tail, head);
    }

    #[test]
    fn overlap_not_smaller_than_chunk_size_is_rejected() {
        assert!(matches!(
            chunk_text("some text", 50, 50),
            Err(RagError::Configuration(_))
        ));
        assert!(matches!(
            chunk_text("some text", 50, 80),
            Err(RagError::Configuration(_))
        ));
    }

    #[test]
    fn multibyte_text_splits_cleanly() {
        let text = "₹ 75 Lakh की कीमत में। ".repeat(40);
        let chunks = chunk_text(&text, 100, 10).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }

    proptest! {
        #[test]
        fn no_chunk_is_empty_and_count_is_bounded(
            text in "[a-z .!?\n]{1,600}",
            chunk_size in 20usize..200,
            overlap in 0usize..10,
        ) {
            let chunks = chunk_text(&text, chunk_size, overlap).unwrap();
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= chunk_size);
            }
            // A boundary cut never lands before 70% of the window, so every
            // iteration advances by at least this stride.
            let min_stride = (7 * chunk_size / 10 + 3 - overlap).max(1);
            let bound = text.chars().count().div_ceil(min_stride) + 1;
            prop_assert!(chunks.len() <= bound);
        }

        #[test]
        fn every_non_space_char_survives_chunking(
            body in "[a-z]{150,400}",
        ) {
            // Without boundary markers the windows are raw cuts, so
            // concatenation minus the overlap regions is exactly the input.
            let chunks = chunk_text(&body, 100, 10).unwrap();
            let mut rebuilt = String::new();
            for (i, chunk) in chunks.iter().enumerate() {
                let skip = if i == 0 { 0 } else { 10 };
                rebuilt.extend(chunk.chars().skip(skip));
            }
            prop_assert_eq!(rebuilt, body);
        }
    }
}
