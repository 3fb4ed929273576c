use std::borrow::Cow;

use percent_encoding::percent_decode_str;

// Escapes that would change URL structure (or introduce a bare `%`) if decoded.
const RESERVED: &[u8] = b";/?:@&=+$,#%";

/// Decode percent-escapes like `decodeURI`: escapes of reserved characters stay as written.
///
/// A run of escapes that is not valid UTF-8 (e.g. Latin-1 `%E9`) is also kept as written.
pub fn decode_uri(input: &str) -> String {
    let mut decoded = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = next_reserved_escape(rest) {
        decoded.push_str(&decode_run(&rest[..start]));
        decoded.push_str(&rest[start..start + 3]);
        rest = &rest[start + 3..];
    }
    decoded.push_str(&decode_run(rest));
    decoded
}

fn next_reserved_escape(input: &str) -> Option<usize> {
    input.match_indices('%').find_map(|(index, _)| {
        let hex = input.get(index + 1..index + 3)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u8::from_str_radix(hex, 16).ok()?;
        RESERVED.contains(&value).then_some(index)
    })
}

fn decode_run(run: &str) -> Cow<'_, str> {
    percent_decode_str(run)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(run))
}
