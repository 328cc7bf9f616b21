// Copyright (c) 2022-2023 The MobileCoin Foundation

use super::Error;

/// Synchronous request / response exchange with the host, used to pull
/// transaction chunks mid-command
pub trait Exchange {
    /// Reply with an empty [`StatusWord::Ok`](crate::apdu::StatusWord::Ok)
    /// and block for the next host request, returning its payload
    ///
    /// Implementations return [`Error::TransportReset`] if the host aborts
    /// the command.
    fn request_more(&mut self) -> Result<&[u8], Error>;
}

impl<T: Exchange> Exchange for &mut T {
    fn request_more(&mut self) -> Result<&[u8], Error> {
        T::request_more(self)
    }
}

/// [Exchange] for single-chunk transactions, any refill request fails
pub struct NoExchange;

impl Exchange for NoExchange {
    fn request_more(&mut self) -> Result<&[u8], Error> {
        Err(Error::HostExhausted)
    }
}
