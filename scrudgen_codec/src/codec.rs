use crate::{Arity, MalformedIdentifier};

/// Separator placed between component identifiers.
pub const SEPARATOR: char = '_';

/// Join component identifiers into the canonical string form.
///
/// Absent or blank components keep their position as an empty segment.
/// Returns `None` when every segment is empty since there is nothing to
/// represent.
pub fn encode_segments<S: AsRef<str>>(segments: &[Option<S>]) -> Option<String> {
    let mut encoded = String::new();
    let mut has_content = false;

    for (index, segment) in segments.iter().enumerate() {
        if index > 0 {
            encoded.push(SEPARATOR);
        }
        if let Some(segment) = segment {
            let segment: &str = segment.as_ref();
            if !is_blank(segment) {
                encoded.push_str(segment);
                has_content = true;
            }
        }
    }

    has_content.then_some(encoded)
}

/// Split an encoded identifier into exactly `arity` non-blank segments.
pub fn split(value: &str, arity: Arity) -> Result<Vec<&str>, MalformedIdentifier> {
    let parts: Vec<&str> = value.split(SEPARATOR).collect();

    if parts.len() == arity.get() && parts.iter().all(|part| !is_blank(part)) {
        Ok(parts)
    } else {
        Err(MalformedIdentifier {
            value: value.to_string(),
            arity: arity.get(),
        })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_empty_positions() {
        assert_eq!(
            encode_segments(&[Some("a"), None, Some("c")]),
            Some("a__c".to_string())
        );
        assert_eq!(
            encode_segments(&[None, Some("b")]),
            Some("_b".to_string())
        );
    }

    #[test]
    fn test_encode_all_empty_is_none() {
        assert_eq!(encode_segments::<&str>(&[None, None, None, None]), None);
        assert_eq!(encode_segments(&[Some(" "), Some("")]), None);
    }

    #[test]
    fn test_split_exact_arity() {
        assert_eq!(split("a_b_c_d", Arity::Four).unwrap(), vec!["a", "b", "c", "d"]);
        assert!(split("a_b_c", Arity::Four).is_err());
        assert!(split("a_b_c_d_e", Arity::Four).is_err());
    }

    #[test]
    fn test_split_rejects_blank_segments() {
        let err = split("a__c", Arity::Three).unwrap_err();
        assert_eq!(err.arity, 3);
        assert_eq!(err.value, "a__c");
        assert!(split("a_ _c", Arity::Three).is_err());
        assert!(split("", Arity::Two).is_err());
    }

    #[test]
    fn test_partial_encoding_does_not_decode() {
        let encoded = encode_segments(&[Some("a"), None]).unwrap();
        assert!(split(&encoded, Arity::Two).is_err());
    }
}
