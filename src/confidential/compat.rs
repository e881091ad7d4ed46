//! Compatibility shim for byte arrays printed as ASCII decimals.
//!
//! Some RPC stacks format a `bytes` revert argument with their default
//! slice formatting, so the message ends like `...: '[72 101 108 108 111]'`.
//! This is incidental formatting, not a wire contract: only use it after
//! structured decoding has failed, and expect it to stop matching if the
//! node's error formatting changes.

/// Rebuild `context + text` from a message ending in `[<decimals>]'`.
///
/// Returns `None` unless every token between the last `[` and the trailing
/// `]'` is a decimal byte.
pub fn reconstruct_inner_revert(message: &str) -> Option<String> {
    let body = message.strip_suffix("]'")?;
    let open = body.rfind('[')?;
    let bytes = parse_ascii_decimals(&body[open + 1..])?;
    Some(format!("{}{}", &body[..open], String::from_utf8_lossy(&bytes)))
}

/// Parse `"72 101 108"` into `[72, 101, 108]`. Empty or malformed input is `None`.
pub fn parse_ascii_decimals(decimals: &str) -> Option<Vec<u8>> {
    let bytes = decimals
        .split_whitespace()
        .map(|token| token.parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;
    (!bytes.is_empty()).then_some(bytes)
}
