//! Netlink attribute parsing and validation.
//!
//! Attributes are type-length-value records following the generic
//! netlink header. Each message kind this crate consumes is described
//! by a static [`Policy`]: the highest attribute ID of interest and a
//! list of [`AttrRule`]s giving the expected wire type and, where the
//! kernel guarantees one, the exact payload length.
//!
//! [`AttrTable::parse`] walks the attributes of a message once and
//! records a borrowed [`Attr`] per ID. Payloads are never copied; the
//! table borrows the buffer the message was received into.
//!
//! Validation is strict in the same way as `libmnl`:
//! * An attribute with an ID above the policy maximum is skipped.
//! * An attribute with a rule must pass it or the whole message is
//!   rejected.
//! * An attribute without a rule is recorded unchecked.
//! * If an ID appears more than once, the last occurrence wins.

use byteorder::{ByteOrder, NativeEndian};

use crate::{consts::alignto, err::DeError};

/// Size of the attribute header on the wire.
pub const NLA_HDRLEN: usize = 4;

/// Number of slots in an [`AttrTable`]. Policies must keep their
/// maximum ID below this.
pub const ATTR_TABLE_LEN: usize = 64;

/// Wire type an attribute is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    /// No type check
    Unspec,
    /// One byte integer
    U8,
    /// Two byte integer
    U16,
    /// Four byte integer
    U32,
    /// Eight byte integer
    U64,
    /// Non-empty string, not necessarily null terminated
    String,
    /// Attribute that carries no payload
    Flag,
    /// Eight byte duration in milliseconds
    Msecs,
    /// Container of further attributes
    Nested,
    /// Non-empty null terminated string
    NulString,
    /// Opaque bytes
    Binary,
}

impl AttrKind {
    /// Payload length implied by the type, or 0 for variable length
    /// types.
    pub const fn natural_len(self) -> usize {
        match self {
            AttrKind::U8 => 1,
            AttrKind::U16 => 2,
            AttrKind::U32 => 4,
            AttrKind::U64 | AttrKind::Msecs => 8,
            _ => 0,
        }
    }
}

/// Validation rule for one attribute ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRule {
    attr: u16,
    kind: AttrKind,
    len: usize,
}

impl AttrRule {
    /// Rule checking only the wire type.
    pub const fn new(attr: u16, kind: AttrKind) -> Self {
        AttrRule { attr, kind, len: 0 }
    }

    /// Rule additionally requiring a payload of exactly `len` bytes.
    pub const fn with_len(attr: u16, kind: AttrKind, len: usize) -> Self {
        AttrRule { attr, kind, len }
    }

    fn validate(&self, attr: &Attr<'_>) -> Result<(), DeError> {
        let payload = attr.payload();
        let len = payload.len();
        let expected = if self.len > 0 {
            self.len
        } else {
            self.kind.natural_len()
        };
        let valid = len >= expected
            && match self.kind {
                AttrKind::Flag => len == 0,
                AttrKind::String => len > 0,
                AttrKind::NulString => payload.last() == Some(&0),
                AttrKind::Nested => len == 0 || len >= NLA_HDRLEN,
                _ => true,
            }
            && (expected == 0 || len <= expected);
        if valid {
            Ok(())
        } else {
            Err(DeError::InvalidAttribute {
                attr: attr.nla_type(),
                kind: self.kind,
                len,
            })
        }
    }
}

/// Validation rules for one kind of message or nested attribute.
#[derive(Debug)]
pub struct Policy {
    max: u16,
    rules: &'static [AttrRule],
}

impl Policy {
    /// Create a policy accepting attribute IDs up to and including
    /// `max`.
    pub const fn new(max: u16, rules: &'static [AttrRule]) -> Self {
        assert!((max as usize) < ATTR_TABLE_LEN);
        Policy { max, rules }
    }

    /// Highest attribute ID recorded by this policy.
    pub fn max(&self) -> u16 {
        self.max
    }

    fn rule(&self, nla_type: u16) -> Option<&AttrRule> {
        self.rules.iter().find(|rule| rule.attr == nla_type)
    }
}

/// A borrowed netlink attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr<'a> {
    nla_type: u16,
    payload: &'a [u8],
}

impl<'a> Attr<'a> {
    /// Attribute ID with the nested and byte order flags masked off.
    pub fn nla_type(&self) -> u16 {
        self.nla_type
    }

    /// Payload without the header or trailing padding.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    fn fixed<const N: usize>(&self) -> Result<&'a [u8], DeError> {
        if self.payload.len() == N {
            Ok(self.payload)
        } else {
            Err(DeError::InvalidAttribute {
                attr: self.nla_type,
                kind: AttrKind::Binary,
                len: self.payload.len(),
            })
        }
    }

    /// Payload as a one byte integer.
    pub fn get_u8(&self) -> Result<u8, DeError> {
        self.fixed::<1>().map(|p| p[0])
    }

    /// Payload as a native endian two byte integer.
    pub fn get_u16(&self) -> Result<u16, DeError> {
        self.fixed::<2>().map(NativeEndian::read_u16)
    }

    /// Payload as a native endian four byte integer.
    pub fn get_u32(&self) -> Result<u32, DeError> {
        self.fixed::<4>().map(NativeEndian::read_u32)
    }

    /// Payload bytes up to, not including, the first null byte.
    pub fn get_cstr(&self) -> &'a [u8] {
        match self.payload.iter().position(|b| *b == 0) {
            Some(end) => &self.payload[..end],
            None => self.payload,
        }
    }

    /// Iterate over the attributes nested in this one.
    pub fn nested(&self) -> AttrIter<'a> {
        AttrIter::new(self.payload)
    }
}

/// Iterator over the attributes packed into a buffer.
pub struct AttrIter<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> AttrIter<'a> {
    /// Create an iterator over `buf`, which must start at an
    /// attribute header.
    pub fn new(buf: &'a [u8]) -> Self {
        AttrIter { buf, position: 0 }
    }

    fn next_attr(&mut self) -> Result<Attr<'a>, DeError> {
        let remaining = &self.buf[self.position..];
        if remaining.len() < NLA_HDRLEN {
            return Err(DeError::Truncated);
        }
        let nla_len = NativeEndian::read_u16(&remaining[0..2]) as usize;
        let nla_type = NativeEndian::read_u16(&remaining[2..4]) & libc::NLA_TYPE_MASK as u16;
        if nla_len < NLA_HDRLEN || nla_len > remaining.len() {
            return Err(DeError::Truncated);
        }
        self.position += alignto(nla_len);
        Ok(Attr {
            nla_type,
            payload: &remaining[NLA_HDRLEN..nla_len],
        })
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Result<Attr<'a>, DeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.buf.len() {
            return None;
        }
        let next = self.next_attr();
        if next.is_err() {
            self.position = self.buf.len();
        }
        Some(next)
    }
}

/// Attributes of one message indexed by ID.
pub struct AttrTable<'a> {
    policy: &'static Policy,
    slots: [Option<Attr<'a>>; ATTR_TABLE_LEN],
}

impl<'a> AttrTable<'a> {
    /// Create an empty table for attributes governed by `policy`.
    pub fn new(policy: &'static Policy) -> Self {
        AttrTable {
            policy,
            slots: [None; ATTR_TABLE_LEN],
        }
    }

    /// Validate the attributes in `buf` against `policy` and index
    /// them by ID.
    pub fn parse(buf: &'a [u8], policy: &'static Policy) -> Result<Self, DeError> {
        let mut table = AttrTable::new(policy);
        table.parse_into(buf)?;
        Ok(table)
    }

    /// Validate and record the attributes in `buf` one by one.
    ///
    /// Stops at the first attribute that fails validation. Attributes
    /// recorded before it stay in the table; none after it are
    /// recorded.
    pub fn parse_into(&mut self, buf: &'a [u8]) -> Result<(), DeError> {
        for attr in AttrIter::new(buf) {
            let attr = attr?;
            if attr.nla_type() > self.policy.max() {
                continue;
            }
            if let Some(rule) = self.policy.rule(attr.nla_type()) {
                rule.validate(&attr)?;
            }
            self.slots[attr.nla_type() as usize] = Some(attr);
        }
        Ok(())
    }

    /// Validate the attributes nested in `attr`.
    pub fn parse_nested(attr: &Attr<'a>, policy: &'static Policy) -> Result<Self, DeError> {
        AttrTable::parse(attr.payload(), policy)
    }

    /// Look up the attribute recorded for `nla_type`.
    pub fn get<T>(&self, nla_type: T) -> Option<Attr<'a>>
    where
        T: Into<u16>,
    {
        let nla_type = nla_type.into();
        if nla_type > self.policy.max() {
            return None;
        }
        self.slots[nla_type as usize]
    }
}
