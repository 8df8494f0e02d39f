//! Serde adapters for fields whose JSON shape differs from their Rust type.

use serde::{Deserialize, Deserializer};

/// Password digests travel as standard (padded) base64 strings.
///
/// A `null` digest decodes to an empty vector.
pub(crate) mod digest {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD.decode(encoded).map_err(de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

/// Revocation timestamps travel as RFC 3339 strings.
///
/// "Not revoked" is written as the zero instant `0001-01-01T00:00:00Z`,
/// which is also what files produced by earlier versions contain. Both the
/// zero instant and `null` decode to `None`.
pub(crate) mod revocation_time {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const ZERO_TIME: &str = "0001-01-01T00:00:00Z";

    /// Unix timestamp of `0001-01-01T00:00:00Z`.
    const ZERO_UNIX_SECONDS: i64 = -62_135_596_800;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => serializer.serialize_str(ZERO_TIME),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let at = DateTime::parse_from_rfc3339(&raw)
            .map_err(de::Error::custom)?
            .with_timezone(&Utc);
        if at.timestamp() == ZERO_UNIX_SECONDS && at.timestamp_subsec_nanos() == 0 {
            Ok(None)
        } else {
            Ok(Some(at))
        }
    }
}

/// Collections written as `null` load as empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
