//! `$ref` pointer parsing.
//!
//! A reference such as `#/components/schemas/User/properties/address` names an
//! entity (`User`) and, optionally, a chain of property accessors into it
//! (`["address"]`). The registry keys names by the entity's base reference and
//! derives accessor expressions for the property path.

use crate::error::RefError;

/// Segment that introduces a property accessor.
const PROPERTIES_MARKER: &str = "properties";

/// Containers under `#/components`.
const COMPONENT_KINDS: [&str; 10] = [
    "schemas",
    "responses",
    "parameters",
    "examples",
    "requestBodies",
    "headers",
    "securitySchemes",
    "links",
    "callbacks",
    "pathItems",
];

/// Result of [`parse_ref`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRef {
    /// The pointer truncated before its first property accessor.
    pub reference: String,
    /// Decoded last segment of the base pointer; may be empty.
    pub entity_name: String,
    /// Property names in the order they are accessed.
    pub property_path: Vec<String>,
}

impl ParsedRef {
    /// Whether the pointer reaches into the entity's properties.
    pub fn is_property_access(&self) -> bool {
        !self.property_path.is_empty()
    }
}

/// Parse a pointer into its entity name and property path.
///
/// The entity is the segment right after its container
/// (`#/components/{kind}/{name}`, `#/components/{name}` or
/// `#/definitions/{name}`); other pointers name the segment before their
/// first `properties` marker. After the entity, segments alternate between a
/// `properties` marker and a property name. A segment in marker position that
/// is not a marker extends the entity pointer and becomes the entity name.
///
/// Fails only when a `properties` marker has no property after it. A pointer
/// that ends right after its container (`#/components/schemas/`) yields an
/// empty entity name.
pub fn parse_ref(pointer: &str) -> Result<ParsedRef, RefError> {
    let (prefix, body) = pointer
        .strip_prefix('#')
        .map_or(("", pointer), |rest| ("#", rest));
    let segments: Vec<&str> = body.split('/').collect();
    let first = usize::from(segments.len() > 1 && segments[0].is_empty());

    let entity_index = match segments.get(first).copied() {
        Some("components") => {
            let kind = segments.get(first + 1).copied().unwrap_or_default();
            if COMPONENT_KINDS.contains(&kind) {
                first + 2
            } else {
                first + 1
            }
        }
        Some("definitions") => first + 1,
        _ => segments
            .iter()
            .enumerate()
            .skip(first + 1)
            .find(|(_, segment)| **segment == PROPERTIES_MARKER)
            .map_or(segments.len().saturating_sub(1), |(index, _)| index - 1),
    };

    if entity_index >= segments.len() {
        return Ok(ParsedRef {
            reference: pointer.to_string(),
            entity_name: String::new(),
            property_path: Vec::new(),
        });
    }

    let mut base_end = entity_index + 1;
    let mut property_path = Vec::new();
    let mut index = base_end;
    while index < segments.len() {
        if segments[index] != PROPERTIES_MARKER {
            base_end = index + 1;
            property_path.clear();
            index += 1;
            continue;
        }
        let name = segments.get(index + 1).copied().unwrap_or_default();
        if name.is_empty() {
            if index + 2 >= segments.len() {
                return Err(RefError::InvalidReference {
                    reference: pointer.to_string(),
                });
            }
        } else {
            property_path.push(decode_pointer_segment(name));
        }
        index += 2;
    }

    Ok(ParsedRef {
        reference: format!("{prefix}{}", segments[..base_end].join("/")),
        entity_name: decode_pointer_segment(segments[base_end - 1]),
        property_path,
    })
}

/// Decode a single JSON Pointer segment (`~1` -> `/`, `~0` -> `~`).
pub fn decode_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Encode a path segment for use in a JSON Pointer (RFC 6901).
pub fn encode_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Split a JSON Pointer into decoded path segments.
///
/// The root pointer (`#` or an empty string) yields an empty path.
pub fn json_pointer_to_path(pointer: &str) -> Vec<String> {
    let clean = pointer.trim();
    let clean = clean.strip_prefix('#').unwrap_or(clean);
    let clean = clean.strip_prefix('/').unwrap_or(clean);
    if clean.is_empty() {
        return Vec::new();
    }
    clean.split('/').map(decode_pointer_segment).collect()
}

/// Encode a path as a JSON Pointer; the inverse of [`json_pointer_to_path`].
pub fn path_to_json_pointer<S: AsRef<str>>(path: &[S]) -> String {
    let mut pointer = String::from("#");
    for segment in path {
        pointer.push('/');
        pointer.push_str(&encode_pointer_segment(segment.as_ref()));
    }
    pointer
}

/// Bring a pointer into canonical form: leading `#`, no repeated or trailing
/// slashes (the root stays `#`).
pub fn normalize_json_pointer(pointer: &str) -> String {
    let trimmed = pointer.trim();
    let mut normalized = String::with_capacity(trimmed.len() + 1);
    if !trimmed.starts_with('#') {
        normalized.push('#');
    }
    for ch in trimmed.chars() {
        if ch == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(ch);
    }
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Whether a pointer addresses a top-level component rather than a path
/// inside one.
///
/// OpenAPI 3.x components are `#/components/{kind}/{name}`; Swagger 2.0
/// definitions are `#/definitions/{name}`.
pub fn is_top_level_component_ref(pointer: &str) -> bool {
    let path = json_pointer_to_path(pointer);
    match path.first().map(String::as_str) {
        Some("components") => path.len() == 3,
        Some("definitions") => path.len() == 2,
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_ref() {
        let parsed = parse_ref("#/components/schemas/User").unwrap();
        assert_eq!(parsed.entity_name, "User");
        assert!(parsed.property_path.is_empty());
        assert_eq!(parsed.reference, "#/components/schemas/User");
        assert!(!parsed.is_property_access());
    }

    #[test]
    fn test_parse_single_property() {
        let parsed = parse_ref("#/components/schemas/User/properties/name").unwrap();
        assert_eq!(parsed.entity_name, "User");
        assert_eq!(parsed.property_path, vec!["name"]);
        assert_eq!(parsed.reference, "#/components/schemas/User");
    }

    #[test]
    fn test_parse_nested_properties() {
        let parsed =
            parse_ref("#/components/schemas/User/properties/address/properties/city").unwrap();
        assert_eq!(parsed.entity_name, "User");
        assert_eq!(parsed.property_path, vec!["address", "city"]);
    }

    #[test]
    fn test_parse_property_named_properties() {
        let parsed =
            parse_ref("#/components/schemas/Page/properties/properties/properties/count").unwrap();
        assert_eq!(parsed.entity_name, "Page");
        assert_eq!(parsed.property_path, vec!["properties", "count"]);
    }

    #[test]
    fn test_parse_entity_named_properties() {
        let parsed = parse_ref("#/components/schemas/properties/properties/id").unwrap();
        assert_eq!(parsed.entity_name, "properties");
        assert_eq!(parsed.property_path, vec!["id"]);
        assert_eq!(parsed.reference, "#/components/schemas/properties");

        let parsed = parse_ref("#/definitions/properties").unwrap();
        assert_eq!(parsed.entity_name, "properties");
        assert!(parsed.property_path.is_empty());
    }

    #[test]
    fn test_parse_non_component_pointer() {
        let parsed = parse_ref("#/specgen/client").unwrap();
        assert_eq!(parsed.entity_name, "client");
        assert_eq!(parsed.reference, "#/specgen/client");

        let parsed = parse_ref("#/components/schemas/Pet/items").unwrap();
        assert_eq!(parsed.entity_name, "items");
        assert_eq!(parsed.reference, "#/components/schemas/Pet/items");
    }

    #[test]
    fn test_parse_container_without_entity() {
        let parsed = parse_ref("#/components/schemas").unwrap();
        assert_eq!(parsed.entity_name, "");
        assert_eq!(parsed.reference, "#/components/schemas");

        assert_eq!(parse_ref("#/components/").unwrap().entity_name, "");
        assert_eq!(parse_ref("#/components/User").unwrap().entity_name, "User");
    }

    #[test]
    fn test_parse_empty_entity_name() {
        let parsed = parse_ref("#/components/schemas/").unwrap();
        assert_eq!(parsed.entity_name, "");
        assert!(parsed.property_path.is_empty());
        assert_eq!(parsed.reference, "#/components/schemas/");

        assert_eq!(parse_ref("#").unwrap().entity_name, "");
    }

    #[test]
    fn test_parse_dangling_accessor_is_error() {
        let err = parse_ref("#/components/schemas/User/properties/").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid reference: #/components/schemas/User/properties/"
        );
    }

    #[test]
    fn test_parse_decodes_segments() {
        let parsed = parse_ref("#/definitions/a~1b/properties/c~0d").unwrap();
        assert_eq!(parsed.entity_name, "a/b");
        assert_eq!(parsed.property_path, vec!["c~d"]);
    }

    #[test]
    fn test_json_pointer_to_path() {
        assert!(json_pointer_to_path("#").is_empty());
        assert!(json_pointer_to_path("").is_empty());
        assert_eq!(
            json_pointer_to_path("#/components/schemas/Foo"),
            vec!["components", "schemas", "Foo"]
        );
        assert_eq!(
            json_pointer_to_path("#/paths/~1users~1{id}/get"),
            vec!["paths", "/users/{id}", "get"]
        );
    }

    #[test]
    fn test_path_to_json_pointer() {
        let empty: [&str; 0] = [];
        assert_eq!(path_to_json_pointer(&empty), "#");
        assert_eq!(
            path_to_json_pointer(&["components", "schemas", "Foo"]),
            "#/components/schemas/Foo"
        );
        assert_eq!(path_to_json_pointer(&["paths", "/users"]), "#/paths/~1users");
    }

    #[test]
    fn test_normalize_json_pointer() {
        assert_eq!(normalize_json_pointer("/components//schemas/"), "#/components/schemas");
        assert_eq!(normalize_json_pointer("  #/a/b "), "#/a/b");
        assert_eq!(normalize_json_pointer("#"), "#");
        assert_eq!(normalize_json_pointer("#/"), "#");
    }

    #[test]
    fn test_is_top_level_component_ref() {
        assert!(is_top_level_component_ref("#/components/schemas/Foo"));
        assert!(is_top_level_component_ref("#/components/responses/Error"));
        assert!(is_top_level_component_ref("#/definitions/Foo"));
        assert!(!is_top_level_component_ref("#/components/schemas/Foo/properties/bar"));
        assert!(!is_top_level_component_ref("#/definitions/Foo/properties/bar"));
        assert!(!is_top_level_component_ref("#/paths/~1users/get"));
        assert!(!is_top_level_component_ref("#/info/title"));
    }
}
