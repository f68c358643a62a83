/// 自动机使用的核酸字母表（小写）：a c g t n
pub const ALPHABET: &[u8; 5] = b"acgtn";

#[inline]
pub fn canonical_base(b: u8) -> u8 {
    match b.to_ascii_lowercase() {
        b'a' => b'a',
        b'c' => b'c',
        b'g' => b'g',
        b't' | b'u' => b't',
        _ => b'n', // map others to n
    }
}

#[inline]
fn is_blank(b: u8) -> bool {
    matches!(b, b'\n' | b'\r' | b' ' | b'\t')
}

/// 规范化一行核酸序列：去掉空白，转小写，U -> T，其余非 ACGT 字符记为 n。
pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq {
        if !is_blank(b) {
            out.push(canonical_base(b));
        }
    }
    out
}

/// 规范化一行普通文本：去掉首尾空白并转 ASCII 小写，内部空白保留。
pub fn normalize_text(line: &[u8]) -> Vec<u8> {
    let start = line.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(line.len());
    let end = line.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    line[start..end].to_ascii_lowercase()
}
