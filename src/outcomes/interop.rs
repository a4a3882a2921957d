//! Interop with external representations.
//!
//! Two collaborator seams live here: a generic attribute-mapping
//! representation (`serde_json::Value` tagged with a type identifier) used by
//! serialization layers, and the trait an XML collaborator implements to
//! exchange issue lists as XML text. The XML grammar itself is owned by the
//! collaborator, not this crate.

use serde_json::json;

use super::{CartesianOutcomeSpace, CartesianSpace, DiscreteOutcomeSpace, Issue, OutcomeError};

/// Type identifier carried by serialized Cartesian spaces.
pub const CARTESIAN_SPACE_TYPE: &str = "CartesianOutcomeSpace";
/// Type identifier carried by serialized discrete spaces.
pub const DISCRETE_SPACE_TYPE: &str = "DiscreteOutcomeSpace";

/// Issue-list to and from XML text.
///
/// Implemented by the cross-platform interoperability collaborator; this
/// crate only defines the seam.
pub trait IssueXmlCodec {
    /// Renders an issue list as XML text.
    fn issues_to_xml(&self, issues: &[Issue]) -> Result<String, OutcomeError>;

    /// Parses an issue list from XML text.
    fn issues_from_xml(&self, xml: &str) -> Result<Vec<Issue>, OutcomeError>;
}

fn tagged(type_id: &str, body: serde_json::Value) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert("type".to_string(), json!(type_id));
    if let serde_json::Value::Object(fields) = body {
        map.extend(fields);
    }
    serde_json::Value::Object(map)
}

fn untagged(
    type_id: &str,
    mut value: serde_json::Value,
) -> Result<serde_json::Value, OutcomeError> {
    let found = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();
    if found != type_id {
        return Err(OutcomeError::type_mismatch(
            "type",
            found,
            format!("expected the type identifier '{}'", type_id),
        ));
    }
    if let Some(map) = value.as_object_mut() {
        map.remove("type");
    }
    Ok(value)
}

impl CartesianOutcomeSpace {
    /// Renders the space as a generic attribute mapping tagged with its type
    /// identifier.
    pub fn to_value(&self) -> serde_json::Value {
        tagged(
            CARTESIAN_SPACE_TYPE,
            serde_json::to_value(self).unwrap_or_default(),
        )
    }

    /// Rebuilds a space from a tagged attribute mapping.
    pub fn from_value(value: serde_json::Value) -> Result<Self, OutcomeError> {
        let body = untagged(CARTESIAN_SPACE_TYPE, value)?;
        serde_json::from_value(body).map_err(|e| {
            OutcomeError::type_mismatch(CARTESIAN_SPACE_TYPE, "attribute mapping", e.to_string())
        })
    }
}

impl DiscreteOutcomeSpace {
    /// Renders the space as a generic attribute mapping tagged with its type
    /// identifier.
    pub fn to_value(&self) -> serde_json::Value {
        tagged(
            DISCRETE_SPACE_TYPE,
            serde_json::to_value(self).unwrap_or_default(),
        )
    }

    /// Rebuilds a space from a tagged attribute mapping.
    ///
    /// The finiteness invariant is revalidated: a mapping carrying a
    /// continuous issue is rejected.
    pub fn from_value(value: serde_json::Value) -> Result<Self, OutcomeError> {
        let body = untagged(DISCRETE_SPACE_TYPE, value)?;
        let space: Self = serde_json::from_value(body).map_err(|e| {
            OutcomeError::type_mismatch(DISCRETE_SPACE_TYPE, "attribute mapping", e.to_string())
        })?;
        if !space.is_discrete() {
            return Err(OutcomeError::type_mismatch(
                DISCRETE_SPACE_TYPE,
                space.name(),
                "contains a continuous issue",
            ));
        }
        Ok(space)
    }
}
