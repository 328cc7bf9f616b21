// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Value formatting and address helpers
//!

use core::fmt::Write;

use heapless::String;

use crate::engine::Error;

mod address;
pub use address::*;

/// Decimal places between Qa (smallest unit) and ZIL
pub const QA_ZIL_SHIFT: usize = 12;

/// Maximum decimal digits in a `u128`
pub const U128_DIGITS_MAX: usize = 39;

/// Maximum length of a formatted ZIL value (digits plus decimal point)
pub const ZIL_STR_MAX: usize = U128_DIGITS_MAX + 2;

/// Big-endian 128-bit amount as encoded in transactions
pub type RawAmount = [u8; 16];

/// Write the decimal digits of a big-endian 128-bit amount
pub fn amount_digits(raw: &RawAmount) -> String<U128_DIGITS_MAX> {
    let v = u128::from_be_bytes(*raw);

    let mut s = String::new();
    // u128::MAX fits U128_DIGITS_MAX
    let _ = write!(&mut s, "{}", v);
    s
}

/// Format a big-endian 128-bit Qa amount as ZIL
pub fn fmt_amount<const N: usize>(raw: &RawAmount, out: &mut String<N>) -> Result<(), Error> {
    let digits = amount_digits(raw);
    qa_to_zil(&digits, out)
}

/// Convert a Qa decimal digit string to ZIL, shifting by [`QA_ZIL_SHIFT`] places
///
/// This is an exact string transform, trailing fractional zeros and a bare
/// decimal point are removed. Leading zeros in the input are ignored and
/// non-digit input is rejected.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn qa_to_zil<const N: usize>(qa: &str, out: &mut String<N>) -> Result<(), Error> {
    out.clear();

    if qa.is_empty() || !qa.bytes().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidDigits);
    }

    let digits = match qa.trim_start_matches('0') {
        "" => "0",
        d => d,
    };

    if digits.len() > U128_DIGITS_MAX {
        return Err(Error::InvalidDigits);
    }

    let r = if digits.len() <= QA_ZIL_SHIFT {
        out.push_str("0.").and_then(|_| {
            for _ in digits.len()..QA_ZIL_SHIFT {
                out.push('0')?;
            }
            out.push_str(digits)
        })
    } else {
        let (whole, frac) = digits.split_at(digits.len() - QA_ZIL_SHIFT);
        out.push_str(whole)
            .and_then(|_| out.push('.'))
            .and_then(|_| out.push_str(frac))
    };
    r.map_err(|_| Error::DisplayOverflow)?;

    // Strip trailing fractional zeros then any bare decimal point
    let n = out.trim_end_matches('0').trim_end_matches('.').len();
    out.truncate(n);

    Ok(())
}

/// Write `v` as lowercase hex
pub fn fmt_hex<const N: usize>(v: &[u8], out: &mut String<N>) -> Result<(), Error> {
    out.clear();

    let mut buff = [0u8; 64];
    for c in v.chunks(buff.len() / 2) {
        let b = &mut buff[..c.len() * 2];
        hex::encode_to_slice(c, b).map_err(|_| Error::DisplayOverflow)?;

        let s = core::str::from_utf8(b).map_err(|_| Error::DisplayOverflow)?;
        out.push_str(s).map_err(|_| Error::DisplayOverflow)?;
    }

    Ok(())
}
