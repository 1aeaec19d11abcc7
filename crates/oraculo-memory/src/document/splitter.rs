use super::types::{Chunk, Document};

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub sentence_aware: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            sentence_aware: true,
        }
    }
}

/// Splits document text into overlapping chunks, recording each chunk's
/// char offset into the source text. Offsets are strictly increasing.
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let text = &document.content;
        if text.is_empty() {
            return Vec::new();
        }

        let chunks = if self.config.sentence_aware {
            let pieces = split_pieces(text);
            merge_pieces(&pieces, self.config.chunk_size, self.config.chunk_overlap)
        } else {
            split_chars(text, self.config.chunk_size, self.config.chunk_overlap)
        };

        chunks
            .into_iter()
            .map(|(start_offset, content)| Chunk {
                content,
                start_offset,
                metadata: document.metadata.clone(),
            })
            .collect()
    }
}

/// A sentence or paragraph piece with its char offset into the source text.
struct Piece {
    start: usize,
    text: String,
}

/// Split on sentence endings (`.`/`?`/`!` followed by a space) and on
/// paragraph breaks (blank lines). Whitespace-only pieces are dropped.
fn split_pieces(text: &str) -> Vec<Piece> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut piece_start = 0;
    let mut i = 0;

    while i < chars.len() {
        if current.is_empty() {
            piece_start = i;
        }
        current.push(chars[i]);

        if chars[i] == '\n' && i + 1 < chars.len() && chars[i + 1] == '\n' {
            current.push(chars[i + 1]);
            i += 1;
            flush_piece(&mut pieces, &mut current, piece_start);
        } else if (chars[i] == '.' || chars[i] == '?' || chars[i] == '!')
            && i + 1 < chars.len()
            && chars[i + 1] == ' '
        {
            flush_piece(&mut pieces, &mut current, piece_start);
        }

        i += 1;
    }

    flush_piece(&mut pieces, &mut current, piece_start);
    pieces
}

fn flush_piece(pieces: &mut Vec<Piece>, current: &mut String, start: usize) {
    if current.trim().is_empty() {
        current.clear();
    } else {
        pieces.push(Piece {
            start,
            text: std::mem::take(current),
        });
    }
}

/// Merge pieces into chunks of at most `chunk_size` chars, carrying at most
/// `chunk_overlap` chars of piece-aligned overlap into the next chunk.
///
/// Overlap walk-back never reaches back to the first piece of the previous
/// chunk, so each chunk starts at a strictly later piece than the one before
/// it. A single piece longer than `chunk_size` becomes its own chunk.
fn merge_pieces(pieces: &[Piece], chunk_size: usize, chunk_overlap: usize) -> Vec<(usize, String)> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut window_start = 0;

    for (idx, piece) in pieces.iter().enumerate() {
        let piece_len = piece.text.chars().count();

        if !current.is_empty() && current_len + piece_len > chunk_size {
            chunks.push((pieces[window_start].start, std::mem::take(&mut current)));

            let mut overlap_len = 0;
            let mut overlap_start = idx;
            for i in (window_start + 1..idx).rev() {
                let len = pieces[i].text.chars().count();
                if overlap_len + len > chunk_overlap {
                    break;
                }
                overlap_len += len;
                overlap_start = i;
            }
            for p in &pieces[overlap_start..idx] {
                current.push_str(&p.text);
            }
            current_len = overlap_len;
            window_start = overlap_start;
        }

        current.push_str(&piece.text);
        current_len += piece_len;
    }

    if !current.is_empty() {
        chunks.push((pieces[window_start].start, current));
    }

    chunks
}

fn split_chars(text: &str, chunk_size: usize, overlap: usize) -> Vec<(usize, String)> {
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push((start, chars[start..end].iter().collect()));
        start += step;
    }

    chunks
}
