//! Fenced tracker blocks inside a note.

use serde::Serialize;

/// Body of one fenced block whose info string is the tracker tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Position among the tracker blocks of the note, from 0
    pub index: usize,
    /// 1-based line of the opening fence
    pub start_line: usize,
    pub source: String,
}

impl Block {
    /// Key used for per-block surface elements such as error placeholders.
    pub fn key(&self) -> String {
        self.index.to_string()
    }
}

struct Fence {
    marker: char,
    len: usize,
}

fn opening_fence(line: &str) -> Option<(Fence, &str)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let info = trimmed[len..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some((Fence { marker, len }, info))
}

fn closes(fence: &Fence, line: &str) -> bool {
    let trimmed = line.trim();
    let len = trimmed.chars().take_while(|c| *c == fence.marker).count();
    len >= fence.len && len == trimmed.chars().count()
}

/// Extract every fenced block tagged `tag`, in document order.
///
/// An unterminated fence runs to the end of the text.
pub fn extract_blocks(text: &str, tag: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let Some((fence, info)) = opening_fence(line) else {
            continue;
        };
        let wanted = info.split_whitespace().next() == Some(tag);

        let mut body = Vec::new();
        for (_, inner) in lines.by_ref() {
            if closes(&fence, inner) {
                break;
            }
            body.push(inner);
        }

        if wanted {
            let mut source = body.join("\n");
            if !body.is_empty() {
                source.push('\n');
            }
            blocks.push(Block {
                index: blocks.len(),
                start_line: index + 1,
                source,
            });
        }
    }

    blocks
}
