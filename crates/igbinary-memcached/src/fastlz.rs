//! FastLZ block decompression.
//!
//! PHP's memcached extension compresses cache values with FastLZ by
//! default. Only decompression is needed here; both block formats are
//! supported, with the level taken from the top three bits of the first
//! block byte as the C reference does.

use thiserror::Error;

/// Maximum match distance encodable without the level-2 extended form.
const MAX_L2_DISTANCE: usize = 8191;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FastlzError {
    #[error("truncated fastlz block")]
    Truncated,
    #[error("unsupported fastlz level {0}")]
    BadLevel(u8),
    #[error("match offset before start of output")]
    BadOffset,
    #[error("output exceeds declared size")]
    Overrun,
}

/// Decompresses one FastLZ block into at most `max_out` bytes.
pub fn decompress(input: &[u8], max_out: usize) -> Result<Vec<u8>, FastlzError> {
    let first = *input.first().ok_or(FastlzError::Truncated)?;
    match first >> 5 {
        0 => decompress_block(input, max_out, Level::One),
        1 => decompress_block(input, max_out, Level::Two),
        level => Err(FastlzError::BadLevel(level)),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Level {
    One,
    Two,
}

// Pre-allocation cap; `max_out` comes from an attacker-controlled header.
const MAX_PREALLOC: usize = 1 << 20;

fn decompress_block(input: &[u8], max_out: usize, level: Level) -> Result<Vec<u8>, FastlzError> {
    let mut out: Vec<u8> = Vec::with_capacity(max_out.min(MAX_PREALLOC));
    let mut ip = 1usize;
    // The level bits of the first byte are masked off; its low five bits
    // are the first (always literal) control word.
    let mut ctrl = (input[0] & 31) as usize;

    loop {
        if ctrl >= 32 {
            let mut len = (ctrl >> 5) - 1;
            let base = (ctrl & 31) << 8;

            if len == 6 {
                // Extended match length. Level 2 chains 255-bytes; level 1
                // has a single extension byte.
                loop {
                    let code = next(input, &mut ip)?;
                    len += code as usize;
                    if level == Level::One || code != 255 {
                        break;
                    }
                }
            }
            len += 3;

            let code = next(input, &mut ip)?;
            let mut dist = base + code as usize + 1;
            if level == Level::Two && code == 255 && base == (31 << 8) {
                // Extended 16-bit distance.
                let hi = next(input, &mut ip)? as usize;
                let lo = next(input, &mut ip)? as usize;
                dist = (hi << 8) + lo + MAX_L2_DISTANCE + 1;
            }

            copy_match(&mut out, dist, len, max_out)?;
        } else {
            let count = ctrl + 1;
            if out.len() + count > max_out {
                return Err(FastlzError::Overrun);
            }
            let literals = input.get(ip..ip + count).ok_or(FastlzError::Truncated)?;
            out.extend_from_slice(literals);
            ip += count;
        }

        if ip >= input.len() {
            break;
        }
        ctrl = input[ip] as usize;
        ip += 1;
    }
    Ok(out)
}

#[inline]
fn next(input: &[u8], ip: &mut usize) -> Result<u8, FastlzError> {
    let byte = *input.get(*ip).ok_or(FastlzError::Truncated)?;
    *ip += 1;
    Ok(byte)
}

/// Appends `len` bytes copied from `dist` bytes back in `out`. Byte-wise
/// so overlapping matches (runs) replicate correctly.
fn copy_match(
    out: &mut Vec<u8>,
    dist: usize,
    len: usize,
    max_out: usize,
) -> Result<(), FastlzError> {
    if dist == 0 || dist > out.len() {
        return Err(FastlzError::BadOffset);
    }
    if out.len() + len > max_out {
        return Err(FastlzError::Overrun);
    }
    let mut src = out.len() - dist;
    for _ in 0..len {
        let byte = out[src];
        out.push(byte);
        src += 1;
    }
    Ok(())
}
