// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Chunked transaction byte source
//!
//! Transactions are delivered as a sequence of chunks no larger than
//! [`TXN_CHUNK_MAX`], the [`ByteSource`] presents these as a continuous stream
//! to the decoder, requesting refills from the host via an [`Exchange`] when the
//! local buffer is exhausted.
//!
//! Every chunk is passed to the signing [`Accumulator`] as it is loaded, so
//! the bytes observed by the decoder are always exactly the bytes signed.

use encdec::Decode;
use ledger_zil_apdu::{
    sign_txn::{SignTxnNext, NEXT_HEADER_LEN},
    APDU_PAYLOAD_MAX, TXN_CHUNK_MAX, TXN_SIZE_MAX,
};

use crate::{
    engine::{Error, Exchange},
    signer::Accumulator,
};

// Any chunk carried by a single refill APDU fits the local buffer
static_assertions::const_assert!(APDU_PAYLOAD_MAX - NEXT_HEADER_LEN <= TXN_CHUNK_MAX);

/// Sequential byte reader used by the transaction decoder
pub trait ByteRead {
    /// Read exactly `buff.len()` bytes
    fn read_exact(&mut self, buff: &mut [u8]) -> Result<(), Error>;

    /// Consume `n` bytes without retaining them
    fn skip(&mut self, n: usize) -> Result<(), Error>;

    /// Bytes remaining in the stream
    fn remaining(&self) -> usize;

    /// Read a single byte
    fn read_u8(&mut self) -> Result<u8, Error> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }
}

impl<T: ByteRead> ByteRead for &mut T {
    fn read_exact(&mut self, buff: &mut [u8]) -> Result<(), Error> {
        T::read_exact(self, buff)
    }

    fn skip(&mut self, n: usize) -> Result<(), Error> {
        T::skip(self, n)
    }

    fn remaining(&self) -> usize {
        T::remaining(self)
    }
}

/// Check a declared transaction size against [`TXN_SIZE_MAX`]
pub fn check_txn_size(chunk_len: usize, bytes_owed: u32) -> Result<u32, Error> {
    if chunk_len > TXN_CHUNK_MAX {
        return Err(Error::ChunkTooLarge);
    }

    match bytes_owed.checked_add(chunk_len as u32) {
        Some(n) if n <= TXN_SIZE_MAX => Ok(n),
        _ => Err(Error::TxnTooLarge),
    }
}

/// Stream cursor over the local chunk buffer
///
/// Invariant: `offset <= len <= TXN_CHUNK_MAX`
pub struct StreamCursor {
    buff: [u8; TXN_CHUNK_MAX],
    offset: usize,
    len: usize,
    owed: u32,
}

impl StreamCursor {
    /// Create a new (empty) stream cursor
    pub const fn new() -> Self {
        Self {
            buff: [0u8; TXN_CHUNK_MAX],
            offset: 0,
            len: 0,
            owed: 0,
        }
    }

    /// Reset the cursor with the first chunk of a transaction
    pub fn reset(&mut self, chunk: &[u8], bytes_owed: u32) -> Result<(), Error> {
        self.offset = 0;
        self.len = 0;
        self.owed = 0;

        check_txn_size(chunk.len(), bytes_owed)?;
        self.load(chunk, bytes_owed)
    }

    /// Load a chunk into the local buffer, replacing any unread data
    fn load(&mut self, chunk: &[u8], bytes_owed: u32) -> Result<(), Error> {
        if chunk.len() > self.buff.len() {
            return Err(Error::ChunkTooLarge);
        }

        self.buff[..chunk.len()].copy_from_slice(chunk);
        self.offset = 0;
        self.len = chunk.len();
        self.owed = bytes_owed;

        Ok(())
    }

    /// Unread bytes in the local buffer
    pub fn unread(&self) -> &[u8] {
        &self.buff[self.offset..self.len]
    }

    /// Bytes still owed by the host
    pub fn owed(&self) -> u32 {
        self.owed
    }

    /// Total bytes remaining in the transaction
    pub fn remaining(&self) -> usize {
        (self.len - self.offset) + self.owed as usize
    }

    /// Take up to `n` buffered bytes
    fn take(&mut self, n: usize) -> &[u8] {
        let n = n.min(self.len - self.offset);
        let start = self.offset;
        self.offset += n;
        &self.buff[start..][..n]
    }
}

impl Default for StreamCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// [ByteRead] implementation pulling transaction chunks from the host
///
/// The first chunk must already be loaded into the [StreamCursor] and
/// offered to the [Accumulator].
pub struct ByteSource<'a, H: Exchange, A: Accumulator> {
    cursor: &'a mut StreamCursor,
    host: &'a mut H,
    signer: &'a mut A,
    refills: usize,
}

impl<'a, H: Exchange, A: Accumulator> ByteSource<'a, H, A> {
    /// Create a new byte source over a primed [StreamCursor]
    pub fn new(cursor: &'a mut StreamCursor, host: &'a mut H, signer: &'a mut A) -> Self {
        Self {
            cursor,
            host,
            signer,
            refills: 0,
        }
    }

    /// Number of refill round trips performed
    pub fn refills(&self) -> usize {
        self.refills
    }

    /// Request the next chunk from the host, validate it, and
    /// pass it to the signer before it is available to the reader
    #[cfg_attr(feature = "noinline", inline(never))]
    fn refill(&mut self) -> Result<(), Error> {
        let owed = self.cursor.owed;
        if owed == 0 {
            return Err(Error::HostExhausted);
        }

        let payload = self.host.request_more()?;
        if payload.len() < NEXT_HEADER_LEN {
            return Err(Error::InvalidLength);
        }

        // With a complete header the only decode failure is a declared
        // chunk length disagreeing with the bytes received
        let (next, _) =
            SignTxnNext::decode(payload).map_err(|_| Error::ChunkLengthMismatch)?;

        if next.chunk.len() > TXN_CHUNK_MAX {
            return Err(Error::ChunkTooLarge);
        }

        let chunk_len = next.chunk.len() as u32;
        if chunk_len == 0 {
            return Err(Error::EmptyChunk);
        }

        // Owed count must shrink by exactly the bytes delivered
        if next.bytes_owed.checked_add(chunk_len) != Some(owed) {
            return Err(Error::OwedMismatch);
        }

        self.cursor.load(next.chunk, next.bytes_owed)?;
        self.signer.update(self.cursor.unread());
        self.refills += 1;

        #[cfg(feature = "log")]
        log::trace!("refill {}: {} bytes, {} owed", self.refills, chunk_len, next.bytes_owed);

        Ok(())
    }

    /// Consume `n` bytes, passing each buffered run to `f`
    fn consume(&mut self, mut n: usize, mut f: impl FnMut(&[u8])) -> Result<(), Error> {
        if n > self.cursor.remaining() {
            return Err(Error::Truncated);
        }

        while n > 0 {
            if self.cursor.offset == self.cursor.len {
                self.refill()?;
            }

            let b = self.cursor.take(n);
            n -= b.len();
            f(b);
        }

        Ok(())
    }
}

impl<'a, H: Exchange, A: Accumulator> ByteRead for ByteSource<'a, H, A> {
    fn read_exact(&mut self, buff: &mut [u8]) -> Result<(), Error> {
        let mut index = 0;
        self.consume(buff.len(), |b| {
            buff[index..][..b.len()].copy_from_slice(b);
            index += b.len();
        })
    }

    fn skip(&mut self, n: usize) -> Result<(), Error> {
        self.consume(n, |_| ())
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

/// [ByteRead] implementation over an in-memory slice
pub struct SliceReader<'a> {
    buff: &'a [u8],
    index: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(buff: &'a [u8]) -> Self {
        Self { buff, index: 0 }
    }
}

impl<'a> ByteRead for SliceReader<'a> {
    fn read_exact(&mut self, buff: &mut [u8]) -> Result<(), Error> {
        if buff.len() > self.remaining() {
            return Err(Error::Truncated);
        }

        buff.copy_from_slice(&self.buff[self.index..][..buff.len()]);
        self.index += buff.len();

        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<(), Error> {
        if n > self.remaining() {
            return Err(Error::Truncated);
        }

        self.index += n;

        Ok(())
    }

    fn remaining(&self) -> usize {
        self.buff.len() - self.index
    }
}

/// [ByteRead] wrapper limiting reads to a declared field length
pub struct Limited<'r, R: ByteRead> {
    inner: &'r mut R,
    left: usize,
}

impl<'r, R: ByteRead> Limited<'r, R> {
    /// Limit reads from `inner` to `len` bytes, failing if `inner` holds fewer
    pub fn new(inner: &'r mut R, len: usize) -> Result<Self, Error> {
        if len > inner.remaining() {
            return Err(Error::Truncated);
        }

        Ok(Self { inner, left: len })
    }

    /// Skip any bytes not consumed within the limit
    pub fn finish(self) -> Result<(), Error> {
        self.inner.skip(self.left)
    }
}

impl<'r, R: ByteRead> ByteRead for Limited<'r, R> {
    fn read_exact(&mut self, buff: &mut [u8]) -> Result<(), Error> {
        if buff.len() > self.left {
            return Err(Error::FieldOverrun);
        }

        self.inner.read_exact(buff)?;
        self.left -= buff.len();

        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<(), Error> {
        if n > self.left {
            return Err(Error::FieldOverrun);
        }

        self.inner.skip(n)?;
        self.left -= n;

        Ok(())
    }

    fn remaining(&self) -> usize {
        self.left
    }
}
