// Copyright (c) 2022-2023 The MobileCoin Foundation

/// encdec helper module for fixed length byte arrays
pub(crate) mod arr {
    use encdec::Error;

    pub fn enc<const N: usize>(d: &[u8; N], buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < N {
            return Err(Error::Length);
        }

        buff[..N].copy_from_slice(&d[..]);

        Ok(N)
    }

    pub fn enc_len<const N: usize>(_d: &[u8; N]) -> Result<usize, Error> {
        Ok(N)
    }

    pub fn dec<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), Error> {
        if buff.len() < N {
            return Err(Error::Length);
        }

        let mut d = [0u8; N];
        d.copy_from_slice(&buff[..N]);

        Ok((d, N))
    }
}
