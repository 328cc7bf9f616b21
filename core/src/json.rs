// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Bounded JSON tokenizer and contract call parameter extraction
//!
//! Contract calls carry a JSON message in the transaction `data` field:
//!
//! ```text
//! {"_tag":"Transfer","params":[{"vname":"to","type":"ByStr20","value":"0x..."}, ...]}
//! ```
//!
//! [`Tokens`] splits the message into at most `N` spans over the original
//! buffer (no copying), [`extract_params`] then renders each parameter as
//! `vname:value`, re-encoding `ByStr20` addresses as bech32.
//!
//! Failures are reported as [`JsonError`]s, these only disable display of the
//! contract message and never the signature.

use core::str::from_utf8;

use heapless::{String, Vec};
use strum::Display;

use crate::helpers::{decode_hex_address, encode_address, AddressStr};

/// Maximum tokens per contract message
pub const MAX_TOKENS: usize = 32;

/// Contract parameter types rendered as addresses
const ADDRESS_TYPES: &[&str] = &["ByStr20"];

/// Token kinds
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum TokenKind {
    Object,
    Array,
    String,
    Primitive,
}

/// Token span over a JSON buffer
///
/// For containers `size` counts direct children (keys for objects), object
/// keys have a `size` of one (their value).
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub size: usize,
    parent: Option<usize>,
    closed: bool,
}

/// JSON extraction errors
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum JsonError {
    /// Token budget exceeded
    NoTokens,
    /// Invalid character at the provided offset
    Invalid(usize),
    /// Input ended inside a token
    Partial,
    /// Root value is not an object
    NotObject,
    /// No `params` key
    MissingParams,
    /// `params` value is not an array
    ParamsNotArray,
    /// Parameter entry is not an object with string `vname`, `type` and `value`
    InvalidParam,
    /// Object key is not a string
    InvalidKey,
    /// Parameter is not valid UTF-8
    Utf8,
    /// Output buffer too small
    Overflow,
}

/// Fixed-capacity token table
pub struct Tokens<const N: usize = MAX_TOKENS> {
    tokens: Vec<Token, N>,
}

impl<const N: usize> Tokens<N> {
    /// Create a new (empty) token table
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Fetch parsed tokens
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Allocate a new token, failing if the budget is exhausted
    fn alloc(&mut self, kind: TokenKind, start: usize, parent: Option<usize>) -> Result<usize, JsonError> {
        let t = Token {
            kind,
            start,
            end: start,
            size: 0,
            parent,
            closed: false,
        };
        self.tokens.push(t).map_err(|_| JsonError::NoTokens)?;

        // Count child against parent
        if let Some(p) = parent {
            self.tokens[p].size += 1;
        }

        Ok(self.tokens.len() - 1)
    }

    /// Tokenize `js`, replacing any prior tokens
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(&mut self, js: &[u8]) -> Result<usize, JsonError> {
        self.tokens.clear();

        // Current container (or key awaiting its value)
        let mut sup: Option<usize> = None;
        let mut i = 0;

        while i < js.len() {
            let c = js[i];
            match c {
                b'{' | b'[' => {
                    let kind = match c {
                        b'{' => TokenKind::Object,
                        _ => TokenKind::Array,
                    };
                    sup = Some(self.alloc(kind, i, sup)?);
                }
                b'}' | b']' => {
                    let kind = match c {
                        b'}' => TokenKind::Object,
                        _ => TokenKind::Array,
                    };

                    // Close the innermost open container
                    let n = self
                        .tokens
                        .iter()
                        .rposition(|t| !t.closed && matches!(t.kind, TokenKind::Object | TokenKind::Array))
                        .ok_or(JsonError::Invalid(i))?;

                    let t = &mut self.tokens[n];
                    if t.kind != kind {
                        return Err(JsonError::Invalid(i));
                    }
                    t.closed = true;
                    t.end = i + 1;
                    sup = t.parent;
                }
                b'"' => {
                    let end = scan_string(js, i)?;
                    let n = self.alloc(TokenKind::String, i + 1, sup)?;
                    let t = &mut self.tokens[n];
                    t.end = end;
                    t.closed = true;
                    i = end;
                }
                b':' => {
                    // Following value belongs to the preceding key
                    let n = self.tokens.len().checked_sub(1).ok_or(JsonError::Invalid(i))?;
                    if self.tokens[n].kind != TokenKind::String {
                        return Err(JsonError::Invalid(i));
                    }
                    sup = Some(n);
                }
                b',' => {
                    // Return from a key to its containing object
                    if let Some(s) = sup {
                        if !matches!(self.tokens[s].kind, TokenKind::Object | TokenKind::Array) {
                            sup = self.tokens[s].parent;
                        }
                    }
                }
                b' ' | b'\t' | b'\r' | b'\n' => (),
                b'-' | b'0'..=b'9' | b't' | b'f' | b'n' => {
                    let end = scan_primitive(js, i)?;
                    let n = self.alloc(TokenKind::Primitive, i, sup)?;
                    let t = &mut self.tokens[n];
                    t.end = end;
                    t.closed = true;
                    i = end - 1;
                }
                _ => return Err(JsonError::Invalid(i)),
            }

            i += 1;
        }

        if self.tokens.iter().any(|t| !t.closed) {
            return Err(JsonError::Partial);
        }

        Ok(self.tokens.len())
    }

    /// Index of the token following `i` and all of its descendants
    ///
    /// Iterative, each token contributes its child count to the pending total.
    pub fn skip(&self, i: usize) -> Result<usize, JsonError> {
        let mut j = i;
        let mut pending = 1;

        while pending > 0 {
            let t = self.tokens.get(j).ok_or(JsonError::Partial)?;
            pending = pending - 1 + t.size;
            j += 1;
        }

        Ok(j)
    }

    /// Find the value for `key` in the object at index `obj`
    fn find_value(&self, js: &[u8], obj: usize, key: &str) -> Result<Option<usize>, JsonError> {
        let o = &self.tokens[obj];
        if o.kind != TokenKind::Object {
            return Err(JsonError::NotObject);
        }

        let mut k = obj + 1;
        for _ in 0..o.size {
            let t = self.tokens.get(k).ok_or(JsonError::Partial)?;
            if t.kind != TokenKind::String || t.size != 1 {
                return Err(JsonError::InvalidKey);
            }

            if &js[t.start..t.end] == key.as_bytes() {
                return Ok(Some(k + 1));
            }

            // Skip key and value
            k = self.skip(k + 1)?;
        }

        Ok(None)
    }

    /// Fetch the string value for `key` in the object at `obj`
    fn string_value<'a>(&self, js: &'a [u8], obj: usize, key: &str) -> Result<&'a str, JsonError> {
        let v = self.find_value(js, obj, key)?.ok_or(JsonError::InvalidParam)?;

        let t = &self.tokens[v];
        if t.kind != TokenKind::String {
            return Err(JsonError::InvalidParam);
        }

        from_utf8(&js[t.start..t.end]).map_err(|_| JsonError::Utf8)
    }
}

impl<const N: usize> Default for Tokens<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the closing quote for the string starting at `start`, handling escapes
fn scan_string(js: &[u8], start: usize) -> Result<usize, JsonError> {
    let mut i = start + 1;

    while i < js.len() {
        match js[i] {
            b'"' => return Ok(i),
            b'\\' => {
                match js.get(i + 1) {
                    Some(b'"' | b'/' | b'\\' | b'b' | b'f' | b'r' | b'n' | b't') => i += 1,
                    Some(b'u') => {
                        let h = js.get(i + 2..i + 6).ok_or(JsonError::Partial)?;
                        if !h.iter().all(|c| c.is_ascii_hexdigit()) {
                            return Err(JsonError::Invalid(i));
                        }
                        i += 5;
                    }
                    Some(_) => return Err(JsonError::Invalid(i)),
                    None => return Err(JsonError::Partial),
                }
            }
            c if c < 0x20 => return Err(JsonError::Invalid(i)),
            _ => (),
        }
        i += 1;
    }

    Err(JsonError::Partial)
}

/// Find the end of the primitive starting at `start`
fn scan_primitive(js: &[u8], start: usize) -> Result<usize, JsonError> {
    for (i, c) in js.iter().enumerate().skip(start) {
        match c {
            b' ' | b'\t' | b'\r' | b'\n' | b',' | b']' | b'}' | b':' => return Ok(i),
            c if *c < 0x20 || *c >= 0x7f => return Err(JsonError::Invalid(i)),
            _ => (),
        }
    }

    Err(JsonError::Partial)
}

/// Extract contract call parameters from `js` as space separated `vname:value` pairs
#[cfg_attr(feature = "noinline", inline(never))]
pub fn extract_params<const N: usize, const M: usize>(
    js: &[u8],
    tokens: &mut Tokens<N>,
    out: &mut String<M>,
) -> Result<(), JsonError> {
    out.clear();

    let r = render_params(js, tokens, out);
    if r.is_err() {
        out.clear();
    }
    r
}

fn render_params<const N: usize, const M: usize>(
    js: &[u8],
    tokens: &mut Tokens<N>,
    out: &mut String<M>,
) -> Result<(), JsonError> {
    if tokens.parse(js)? == 0 {
        return Err(JsonError::NotObject);
    }

    let params = tokens
        .find_value(js, 0, "params")?
        .ok_or(JsonError::MissingParams)?;

    let p = tokens.tokens[params];
    if p.kind != TokenKind::Array {
        return Err(JsonError::ParamsNotArray);
    }

    let mut index = params + 1;
    for n in 0..p.size {
        if tokens.tokens.get(index).map(|t| t.kind) != Some(TokenKind::Object) {
            return Err(JsonError::InvalidParam);
        }

        let vname = tokens.string_value(js, index, "vname")?;
        let kind = tokens.string_value(js, index, "type")?;
        let value = tokens.string_value(js, index, "value")?;

        if n > 0 {
            out.push(' ').map_err(|_| JsonError::Overflow)?;
        }
        out.push_str(vname).map_err(|_| JsonError::Overflow)?;
        out.push(':').map_err(|_| JsonError::Overflow)?;

        // Re-encode hex addresses as bech32 where possible
        let mut addr = AddressStr::new();
        let is_addr = ADDRESS_TYPES.contains(&kind)
            && decode_hex_address(value)
                .and_then(|a| encode_address(&a, &mut addr))
                .is_ok();

        let value = if is_addr { addr.as_str() } else { value };
        out.push_str(value).map_err(|_| JsonError::Overflow)?;

        index = tokens.skip(index)?;
    }

    Ok(())
}
