//! Module for iteration over the netlink messages packed into one
//! datagram

use crate::{
    consts::alignto,
    err::DeError,
    nl::{NlPayload, Nlmsghdr, NLMSG_HDRLEN},
};

/// Iterator over the messages in a received datagram.
///
/// Each item is the message header together with its classified
/// payload. A message whose length field does not fit the remaining
/// bytes yields [`DeError::Truncated`] and ends the iteration, since
/// the position of any following message is unknown.
pub struct NlBufferIter<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> NlBufferIter<'a> {
    /// Create a new iterator over the bytes of one datagram.
    pub fn new(buf: &'a [u8]) -> Self {
        NlBufferIter { buf, position: 0 }
    }

    fn next_message(&mut self) -> Result<(Nlmsghdr, NlPayload<'a>), DeError> {
        let remaining = &self.buf[self.position..];
        let header = Nlmsghdr::parse(remaining)?;
        let len = header.nl_len() as usize;
        if len < NLMSG_HDRLEN || len > remaining.len() {
            return Err(DeError::Truncated);
        }
        let payload = NlPayload::parse(header, &remaining[NLMSG_HDRLEN..len])?;
        self.position += alignto(len);
        Ok((header, payload))
    }
}

impl<'a> Iterator for NlBufferIter<'a> {
    type Item = Result<(Nlmsghdr, NlPayload<'a>), DeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.buf.len() {
            return None;
        }
        let next = self.next_message();
        if next.is_err() {
            self.position = self.buf.len();
        }
        Some(next)
    }
}
