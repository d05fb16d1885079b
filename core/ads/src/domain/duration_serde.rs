//! chrono::Duration の serde 表現（JSON では整数で持つ）

/// 日数（整数）として読み書きする
pub mod days {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_days())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let days = i64::deserialize(d)?;
        Duration::try_days(days).ok_or_else(|| serde::de::Error::custom("observation window out of range"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Window {
        #[serde(with = "super::days")]
        window: Duration,
    }

    #[test]
    fn test_days_roundtrip_shape() {
        let w: Window = serde_json::from_str(r#"{"window":3}"#).unwrap();
        assert_eq!(w.window, Duration::days(3));
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"window":3}"#);
    }
}
