use sha2::{Digest, Sha256};
use url::Url;

use crate::{canonicalize_content_url, canonicalize_tag_url, CoreError, CoreResult};

/// Opaque key scoping one ad schedule to one content stream instance.
///
/// Stable across process restarts for the same (content, ad tag) pair, so it
/// can shard persisted playback state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId([u8; 32]);

impl StreamId {
    pub fn from_urls(content_url: &Url, ad_tag_url: &Url) -> CoreResult<StreamId> {
        let content = canonicalize_content_url(content_url)?;
        let tag = canonicalize_tag_url(ad_tag_url)?;

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hasher.update([0u8]);
        hasher.update(tag.as_bytes());
        Ok(StreamId(hasher.finalize().into()))
    }

    /// Identity for streams addressed by an SDK-issued session key rather
    /// than a tag URL (server-side sessions).
    pub fn from_session_key(content_url: &Url, session_key: &str) -> CoreResult<StreamId> {
        let content = canonicalize_content_url(content_url)?;

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hasher.update([1u8]);
        hasher.update(session_key.as_bytes());
        Ok(StreamId(hasher.finalize().into()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> CoreResult<StreamId> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidStreamId(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidStreamId(format!("expected 32 bytes: {s}")))?;
        Ok(StreamId(arr))
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Serialized as a hex string so the id can key persisted JSON maps.
impl serde::Serialize for StreamId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for StreamId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        StreamId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> Url {
        Url::parse("https://cdn.example.com/movies/feature.m3u8?token=abc#t=5").unwrap()
    }

    fn tag() -> Url {
        Url::parse("https://ads.example.com/vast?slot=preroll&pod=3").unwrap()
    }

    #[test]
    fn id_ignores_content_query_and_fragment() {
        let other =
            Url::parse("https://cdn.example.com/movies/feature.m3u8?token=zzz#other").unwrap();
        let id1 = StreamId::from_urls(&content(), &tag()).unwrap();
        let id2 = StreamId::from_urls(&other, &tag()).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn id_keeps_tag_query() {
        let other_tag = Url::parse("https://ads.example.com/vast?slot=midroll&pod=3").unwrap();
        let id1 = StreamId::from_urls(&content(), &tag()).unwrap();
        let id2 = StreamId::from_urls(&content(), &other_tag).unwrap();
        assert_ne!(id1, id2);
    }

    #[test]
    fn id_stable_across_calls() {
        let id1 = StreamId::from_urls(&content(), &tag()).unwrap();
        let id2 = StreamId::from_urls(&content(), &tag()).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn tag_and_session_domains_do_not_collide() {
        // Same textual discriminator through the two constructors must
        // produce different ids.
        let tag = Url::parse("https://ads.example.com/session").unwrap();
        let id1 = StreamId::from_urls(&content(), &tag).unwrap();
        let id2 = StreamId::from_session_key(&content(), "https://ads.example.com/session").unwrap();
        assert_ne!(id1, id2);
    }

    #[test]
    fn id_errors_on_missing_host() {
        let url = Url::parse("file:///path/to/feature.mp4").unwrap();
        let result = StreamId::from_urls(&url, &tag());
        assert!(matches!(result, Err(CoreError::MissingComponent(_))));
    }

    #[test]
    fn hex_round_trip() {
        let id = StreamId::from_urls(&content(), &tag()).unwrap();
        let hex = id.to_hex();
        assert_eq!(StreamId::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(StreamId::from_hex("not-hex").is_err());
        assert!(StreamId::from_hex("abcd").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let id = StreamId::from_urls(&content(), &tag()).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let back: StreamId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
