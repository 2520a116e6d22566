use serde::{Deserialize, Deserializer};

/// 反序列化非空字符串：仅含空白字符的值视为缺失并报错
pub fn deserialize_non_blank<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Err(serde::de::Error::custom("value must not be empty"));
    }
    Ok(value)
}

/// 反序列化可选整数，兼容字符串形式（查询参数经 `flatten` 后均为字符串）
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid integer: '{s}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "deserialize_optional_i64")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "deserialize_non_blank")]
        name: String,
    }

    #[test]
    fn test_optional_i64_forms() {
        let payload: Payload = serde_json::from_str(r#"{"id":"42"}"#).unwrap();
        assert_eq!(payload.id, Some(42));
        let payload: Payload = serde_json::from_str(r#"{"id":7}"#).unwrap();
        assert_eq!(payload.id, Some(7));
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.id, None);
        assert!(serde_json::from_str::<Payload>(r#"{"id":"x1"}"#).is_err());
    }

    #[test]
    fn test_non_blank() {
        let payload: Payload = serde_json::from_str(r#"{"name":"admin"}"#).unwrap();
        assert_eq!(payload.name, "admin");
        assert!(serde_json::from_str::<Payload>(r#"{"name":"  "}"#).is_err());
    }
}
