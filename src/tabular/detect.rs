//! Sniffing of separator and text encoding from a file sample.
//!
//! Detection never fails: an undecidable sample falls back to UTF-8 and to the
//! configured default separator.

use std::io::{self, Read};

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Candidate separators, in tie-break order.
pub const SEPARATOR_CANDIDATES: [u8; 4] = [b';', b',', b'\t', b'|'];

/// Number of leading bytes inspected for detection.
pub const SAMPLE_BYTES: usize = 64 * 1024;

/// Picks an encoding from a byte sample: BOM first, then UTF-8 validity, then
/// windows-1252 which accepts any byte sequence.
///
/// Only the sample is inspected. For a file longer than the sample, a UTF-8
/// verdict must be confirmed with `is_utf8_stream`.
pub fn detect_encoding(sample: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_length)) = Encoding::for_bom(sample) {
        return encoding;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => UTF_8,
        // A multi-byte sequence cut by the end of the sample is still UTF-8.
        Err(err) if err.error_len().is_none() => UTF_8,
        Err(_) => WINDOWS_1252,
    }
}

/// True when everything `reader` yields is valid UTF-8.
///
/// Reads in `SAMPLE_BYTES` blocks, carrying a multi-byte sequence cut by a block
/// boundary over to the next block.
pub fn is_utf8_stream<R: Read>(mut reader: R) -> io::Result<bool> {
    let mut buffer = vec![0u8; SAMPLE_BYTES];
    let mut carried = 0;
    loop {
        let read = match reader.read(&mut buffer[carried..]) {
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if read == 0 {
            return Ok(carried == 0);
        }
        let filled = carried + read;
        match std::str::from_utf8(&buffer[..filled]) {
            Ok(_) => carried = 0,
            Err(err) if err.error_len().is_none() => {
                let valid = err.valid_up_to();
                buffer.copy_within(valid..filled, 0);
                carried = filled - valid;
            }
            Err(_) => return Ok(false),
        }
    }
}

/// Picks the separator from decoded sample text.
///
/// A candidate appearing the same non-zero number of times on every line wins
/// (highest count first). Otherwise the most frequent candidate wins, and with
/// no candidate present at all the `default` is returned.
pub fn detect_separator(sample: &str, default: u8) -> u8 {
    let lines: Vec<&str> = sample
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(64)
        .collect();
    if lines.is_empty() {
        return default;
    }

    let mut consistent: Option<(u8, usize)> = None;
    let mut most_frequent: Option<(u8, usize)> = None;

    for candidate in SEPARATOR_CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, candidate))
            .collect();
        let total: usize = counts.iter().sum();
        if total == 0 {
            continue;
        }
        let first = counts[0];
        if first > 0 && counts.iter().all(|&count| count == first) {
            if consistent.map_or(true, |(_, best)| first > best) {
                consistent = Some((candidate, first));
            }
        }
        if most_frequent.map_or(true, |(_, best)| total > best) {
            most_frequent = Some((candidate, total));
        }
    }

    consistent
        .or(most_frequent)
        .map(|(candidate, _)| candidate)
        .unwrap_or(default)
}

/// Counts `needle` outside double-quoted sections of a line.
fn count_unquoted(line: &str, needle: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == needle && !in_quotes {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_16LE;

    #[test]
    fn test_consistent_separator_beats_frequent_one() {
        // Commas are more frequent overall, but only semicolons are consistent.
        let sample = "a;b;c\n1,1,1,1;2;3\n4;5;6\n";
        assert_eq!(detect_separator(sample, b','), b';');
    }

    #[test]
    fn test_separator_inside_quotes_is_ignored() {
        let sample = "name|city\n\"Dupont, Jean\"|Paris\n\"Durand, Paul\"|Lyon\n";
        assert_eq!(detect_separator(sample, b','), b'|');
    }

    #[test]
    fn test_tab_separator() {
        let sample = "a\tb\n1\t2\n";
        assert_eq!(detect_separator(sample, b','), b'\t');
    }

    #[test]
    fn test_single_column_falls_back_to_default() {
        let sample = "name\nDupont\nDurand\n";
        assert_eq!(detect_separator(sample, b';'), b';');
    }

    #[test]
    fn test_utf8_stream_check_spans_block_boundaries() {
        // "é" straddles the first block boundary.
        let mut split = vec![b'a'; SAMPLE_BYTES - 1];
        split.extend_from_slice("é;x\n".as_bytes());
        assert!(is_utf8_stream(split.as_slice()).unwrap());

        let mut late_latin1 = vec![b'a'; SAMPLE_BYTES + 10];
        late_latin1.extend_from_slice(b"h\xe9llo\n");
        assert!(!is_utf8_stream(late_latin1.as_slice()).unwrap());

        assert!(!is_utf8_stream(&b"abc\xc3"[..]).unwrap());
        assert!(is_utf8_stream(&b""[..]).unwrap());
    }

    #[test]
    fn test_encoding_detection() {
        assert_eq!(detect_encoding("héllo".as_bytes()), UTF_8);
        assert_eq!(detect_encoding(b"h\xe9llo"), WINDOWS_1252);
        assert_eq!(detect_encoding(b"\xef\xbb\xbfname"), UTF_8);
        assert_eq!(detect_encoding(b"\xff\xfen\x00"), UTF_16LE);
        // "é" cut in half by the sample boundary.
        assert_eq!(detect_encoding(b"abc\xc3"), UTF_8);
    }
}
