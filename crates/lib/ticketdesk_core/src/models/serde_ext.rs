//! Serde adapters for the ticket wire format.

/// `Vec<u8>` as a standard base64 string. `null` and `""` read as empty.
pub mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| D::Error::custom(format!("invalid base64 image: {e}")))
    }
}

/// Integers that may arrive either as JSON numbers or numeric strings.
pub mod lenient_int {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    fn narrow<E: Error>(raw: IntOrString) -> Result<i32, E> {
        match raw {
            IntOrString::Int(n) => {
                i32::try_from(n).map_err(|_| E::custom(format!("integer out of range: {n}")))
            }
            IntOrString::Str(s) => s
                .trim()
                .parse::<i32>()
                .map_err(|e| E::custom(format!("invalid integer {s:?}: {e}"))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        narrow(IntOrString::deserialize(deserializer)?)
    }

    /// Like [`deserialize`], with `null` read as `None`.
    pub fn optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
        Option::<IntOrString>::deserialize(deserializer)?
            .map(narrow)
            .transpose()
    }
}

/// Wall-clock timestamps rendered as `YYYY-MM-DD HH:MM:SS`.
pub mod wall_clock {
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&at.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::de::Error;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            at: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => serializer.collect_str(&at.format(super::FORMAT)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| NaiveDateTime::parse_from_str(&raw, super::FORMAT))
                .transpose()
                .map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(with = "super::lenient_int")]
        n: i32,
        #[serde(default, with = "super::base64_bytes")]
        image: Vec<u8>,
    }

    #[test]
    fn lenient_int_accepts_number_and_string() {
        let a: Probe = serde_json::from_str(r#"{"n": 12}"#).unwrap();
        let b: Probe = serde_json::from_str(r#"{"n": "12"}"#).unwrap();
        assert_eq!(a.n, 12);
        assert_eq!(b.n, 12);
    }

    #[test]
    fn lenient_int_rejects_garbage() {
        assert!(serde_json::from_str::<Probe>(r#"{"n": "twelve"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"n": 99999999999}"#).is_err());
    }

    #[test]
    fn optional_lenient_int_reads_null_as_none() {
        #[derive(Deserialize)]
        struct Nullable {
            #[serde(deserialize_with = "super::lenient_int::optional")]
            n: Option<i32>,
        }
        let n = |raw: &str| serde_json::from_str::<Nullable>(raw).map(|v| v.n);
        assert_eq!(n(r#"{"n": null}"#).unwrap(), None);
        assert_eq!(n(r#"{"n": "4"}"#).unwrap(), Some(4));
        assert!(n(r#"{"n": "four"}"#).is_err());
    }

    #[test]
    fn base64_image_decodes_and_defaults() {
        let p: Probe = serde_json::from_str(r#"{"n": 1, "image": "aGk="}"#).unwrap();
        assert_eq!(p.image, b"hi");
        let p: Probe = serde_json::from_str(r#"{"n": 1, "image": null}"#).unwrap();
        assert!(p.image.is_empty());
        let p: Probe = serde_json::from_str(r#"{"n": 1}"#).unwrap();
        assert!(p.image.is_empty());
    }
}
