use std::io::{BufRead, Read};
use std::path::Path;

fn is_binary_file(path: &Path) -> std::io::Result<bool> {
    let mut f = std::fs::File::open(path)?;
    let mut buf = [0u8; 1024];
    let read = f.read(&mut buf)?;
    Ok(buf[..read].contains(&0))
}

pub fn read_text_file(path: &Path) -> std::io::Result<Option<String>> {
    if is_binary_file(path)? {
        return Ok(None);
    }

    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Ok(None),
        Err(e) => Err(e),
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Identifier under (or immediately before) the byte `offset`.
pub fn word_at(text: &str, offset: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());

    let on_word = bytes.get(offset).copied().is_some_and(is_word_byte);
    let after_word = offset > 0 && is_word_byte(bytes[offset - 1]);
    if !on_word && !after_word {
        return None;
    }

    let start = bytes[..offset]
        .iter()
        .rposition(|b| !is_word_byte(*b))
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = bytes[offset..]
        .iter()
        .position(|b| !is_word_byte(*b))
        .map(|i| offset + i)
        .unwrap_or(bytes.len());

    Some(&text[start..end])
}

/// Byte offset where the 1-based `line` starts. `None` past end of file.
pub fn line_start_offset(path: &Path, line: u32) -> std::io::Result<Option<u64>> {
    if line == 0 {
        return Ok(None);
    }

    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let mut offset = 0u64;
    let mut buf = Vec::new();

    for _ in 1..line {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 || buf.last() != Some(&b'\n') {
            return Ok(None);
        }
        offset += read as u64;
    }

    Ok(Some(offset))
}

/// 1-based line containing the byte `offset`.
pub fn offset_to_line(path: &Path, offset: u64) -> std::io::Result<u32> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut line = 1u32;
    for byte in reader.bytes().take(offset as usize) {
        if byte? == b'\n' {
            line += 1;
        }
    }
    Ok(line)
}
