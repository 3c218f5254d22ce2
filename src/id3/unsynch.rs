use std::borrow::Cow;

use memchr::memmem;

/// Reverse unsynchronisation: every `FF 00` pair becomes a single `FF`.
///
/// Data without any `FF 00` pair is returned borrowed.
pub fn decode(data: &[u8]) -> Cow<'_, [u8]> {
    let Some(first) = memmem::find(data, b"\xFF\x00") else {
        return Cow::Borrowed(data);
    };

    let mut output = Vec::with_capacity(data.len());
    output.extend_from_slice(&data[..=first]);
    let mut i = first + 2;
    while i < data.len() {
        output.push(data[i]);
        if data[i] == 0xFF && data.get(i + 1) == Some(&0x00) {
            i += 2;
        } else {
            i += 1;
        }
    }
    Cow::Owned(output)
}
