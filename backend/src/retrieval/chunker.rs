//! Text cleaning and chunking for the offline index builder

/// Target chunk length in characters
pub const CHUNK_SIZE: usize = 1200;
/// Characters shared between consecutive chunks
pub const CHUNK_OVERLAP: usize = 200;
/// Documents at or below this length (after cleaning) are skipped
pub const MIN_DOCUMENT_CHARS: usize = 200;

/// Page text that marks a scrape of an error or paywall page
const BOILERPLATE_MARKERS: [&str; 3] = ["subscription", "sorry something went wrong", "retry"];

/// Break points, best first
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200b}'..='\u{200d}' | '\u{feff}')
}

/// Normalize whitespace while keeping paragraph breaks
///
/// Runs of spaces collapse to one, lines are trimmed, and any run of blank
/// lines becomes a single empty line.
pub fn clean_text(text: &str) -> String {
    let without_zero_width: String = text.chars().filter(|c| !is_zero_width(*c)).collect();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in without_zero_width.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(collapsed);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs.join("\n\n")
}

/// Whether a cleaned document carries enough text to index
pub fn is_substantial(cleaned: &str) -> bool {
    cleaned.chars().count() > MIN_DOCUMENT_CHARS
}

/// Whether a raw document looks like an error or paywall page
pub fn is_boilerplate(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    BOILERPLATE_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn rfind_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .rev()
        .find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Split text into overlapping chunks of at most `size` characters
///
/// Each cut prefers the last paragraph break in the second half of the
/// window, then a line break, a sentence end, and finally a space.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    assert!(size > overlap, "chunk size must exceed overlap");

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + size).min(chars.len());

        if end < chars.len() {
            let window_floor = start + size / 2;
            for separator in SEPARATORS {
                let needle: Vec<char> = separator.chars().collect();
                if let Some(pos) = rfind_chars(&chars[window_floor..end], &needle) {
                    end = window_floor + pos + needle.len();
                    break;
                }
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end >= chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}
