use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_load_error)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_load_error)
}

fn into_load_error(err: serde_path_to_error::Error<serde_json::Error>) -> LoadError {
    LoadError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SumTypeSpec;

    #[test]
    fn error_names_the_offending_path() {
        let src = r#"{"name": "Color", "variants": [{"name": "RGB", "fields": [{"name": "r", "type": 7}]}]}"#;
        let err = from_str_with_path::<SumTypeSpec>(src).unwrap_err();
        assert_eq!(err.path, "variants[0].fields[0].type");
    }

    #[test]
    fn slices_decode_like_strings() {
        let src = br#"{"name": "Unit", "variants": [{"name": "Only"}]}"#;
        let spec = from_slice_with_path::<SumTypeSpec>(src).unwrap();
        assert_eq!(spec.variants[0].name, "Only");
    }
}
