//! Readings and the queue wire format
//!
//! A [`Reading`] is one observation for one channel, produced by decoding
//! exactly one queue message body and immutable from then on. The body is
//! the producer's delimited text record `"<timestamp>,<value>"` where the
//! value parses as a floating-point number of degrees.
//!
//! The timestamp is an opaque ordering/display token. It is never used in
//! arithmetic: the trend computation assumes the producer's fixed cadence
//! and works purely off window positions (see [`crate::window`]).
//!
//! Channel and timestamp are stored as inline strings so a `Reading` stays
//! `Copy` and can live in a fixed-size window without heap allocation.

use core::fmt;

use crate::errors::DecodeError;

/// Maximum inline length for channel identifiers
pub const MAX_CHANNEL_ID: usize = 15;

/// Maximum inline length for timestamp tokens
///
/// Longer tokens are truncated on decode; the token is display-only so
/// truncation loses no behavior.
pub const MAX_TIME_TOKEN: usize = 23;

/// Inline string with a fixed maximum length
///
/// Avoids heap allocation for the short identifiers that travel with every
/// reading.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<const N: usize> {
    len: u8,
    data: [u8; N],
}

impl<const N: usize> Token<N> {
    /// Create from a string slice; `None` if it does not fit
    pub fn new(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() > N {
            return None;
        }

        let mut data = [0u8; N];
        data[..bytes.len()].copy_from_slice(bytes);

        Some(Self {
            len: bytes.len() as u8,
            data,
        })
    }

    /// Create from a string slice, keeping at most the leading `N` bytes
    ///
    /// Cuts at a character boundary so the result is always valid UTF-8.
    pub fn truncated(s: &str) -> Self {
        let mut end = s.len().min(N);
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        // end is on a char boundary and <= N, so new() cannot fail
        match Self::new(&s[..end]) {
            Some(token) => token,
            None => Self {
                len: 0,
                data: [0u8; N],
            },
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> &str {
        // Only valid UTF-8 is stored by new(), so this never panics
        core::str::from_utf8(&self.data[..self.len as usize])
            .expect("Token contains invalid UTF-8")
    }
}

impl<const N: usize> fmt::Debug for Token<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> fmt::Display for Token<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a monitored channel (e.g. `"01-smoker"`)
pub type ChannelId = Token<MAX_CHANNEL_ID>;

/// Opaque timestamp token as produced upstream (e.g. `"2/26/19 08:30:01"`)
pub type TimeToken = Token<MAX_TIME_TOKEN>;

/// A single observation: one channel, one timestamp token, one value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Channel this reading belongs to
    pub channel: ChannelId,
    /// Ordering/display token, not used in arithmetic
    pub timestamp: TimeToken,
    /// Measured value in degrees
    pub value: f32,
}

impl Reading {
    /// Decode a queue message body into a reading for `channel`
    ///
    /// Accepts `"<timestamp>,<value>"`; surrounding whitespace on either
    /// field is ignored. NaN and infinities are rejected as
    /// [`DecodeError::BadValue`] - they would poison every trend computed
    /// from the window.
    pub fn decode(channel: ChannelId, body: &[u8]) -> Result<Self, DecodeError> {
        let text = core::str::from_utf8(body).map_err(|_| DecodeError::NotUtf8)?;

        let (stamp, value) = text.split_once(',').ok_or(DecodeError::MissingValue)?;

        let value: f32 = value.trim().parse().map_err(|_| DecodeError::BadValue)?;
        if !value.is_finite() {
            return Err(DecodeError::BadValue);
        }

        Ok(Self {
            channel,
            timestamp: TimeToken::truncated(stamp.trim()),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoker() -> ChannelId {
        ChannelId::new("01-smoker").unwrap()
    }

    #[test]
    fn decode_well_formed_body() {
        let reading = Reading::decode(smoker(), b"2/26/19 08:30:01,224.5").unwrap();
        assert_eq!(reading.value, 224.5);
        assert_eq!(reading.timestamp.as_str(), "2/26/19 08:30:01");
        assert_eq!(reading.channel.as_str(), "01-smoker");
    }

    #[test]
    fn decode_trims_whitespace() {
        let reading = Reading::decode(smoker(), b"08:30:01, 183.0 ").unwrap();
        assert_eq!(reading.value, 183.0);
    }

    #[test]
    fn decode_missing_value_field() {
        let err = Reading::decode(smoker(), b"08:30:01").unwrap_err();
        assert_eq!(err, DecodeError::MissingValue);
    }

    #[test]
    fn decode_non_numeric_value() {
        let err = Reading::decode(smoker(), b"08:30:01,warm").unwrap_err();
        assert_eq!(err, DecodeError::BadValue);

        let err = Reading::decode(smoker(), b"08:30:01,").unwrap_err();
        assert_eq!(err, DecodeError::BadValue);
    }

    #[test]
    fn decode_rejects_non_finite() {
        assert_eq!(
            Reading::decode(smoker(), b"08:30:01,NaN").unwrap_err(),
            DecodeError::BadValue
        );
        assert_eq!(
            Reading::decode(smoker(), b"08:30:01,inf").unwrap_err(),
            DecodeError::BadValue
        );
    }

    #[test]
    fn decode_rejects_binary_garbage() {
        let err = Reading::decode(smoker(), &[0xff, 0xfe, 0x2c, 0x31]).unwrap_err();
        assert_eq!(err, DecodeError::NotUtf8);
    }

    #[test]
    fn long_timestamp_is_truncated_not_rejected() {
        let body = b"a-very-long-timestamp-token-from-upstream,100.0";
        let reading = Reading::decode(smoker(), body).unwrap();
        assert_eq!(reading.value, 100.0);
        assert_eq!(reading.timestamp.as_str().len(), MAX_TIME_TOKEN);
    }

    #[test]
    fn token_rejects_oversize() {
        assert!(ChannelId::new("a-channel-name-longer-than-fits").is_none());
        assert!(ChannelId::new("03-food-B").is_some());
    }
}
