//! Terraform provisioning state.
//!
//! The state file is JSON with an `outputs` object mapping each output name
//! to `{"value": ...}`. Handlers read individual outputs through
//! [`ProvisioningState`]; nothing else about the file is validated.

use serde::Serialize;

use crate::{
    DecodeError, InstanceName, LocationId, NotebookInstancePath, ProjectId, StateShapeError,
};

/// Output holding the data-science analytics project ID.
pub const DS_PROJECT_OUTPUT: &str = "project-radlab-ds-analytics-id";
/// Output holding the comma-joined notebook instance names.
pub const NOTEBOOK_NAMES_OUTPUT: &str = "notebooks-instance-names";
/// Output holding the comma-joined notebook instance locations.
pub const NOTEBOOK_LOCATIONS_OUTPUT: &str = "notebooks-instance-locations";

/// Parsed Terraform state for one deployment request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProvisioningState(serde_json::Value);

impl ProvisioningState {
    /// Wraps an already-parsed state document.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Decodes a downloaded state object: UTF-8 text, then JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Utf8`] or [`DecodeError::Json`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let text = String::from_utf8(bytes)?;
        serde_json::from_str(&text)
            .map(Self)
            .map_err(DecodeError::Json)
    }

    /// Returns the raw state document.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Returns the `value` of the output called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeError::MissingOutputs`] if there is no `outputs`
    /// object, or [`StateShapeError::MissingOutput`] if the output (or its
    /// `value`) is absent.
    pub fn output(&self, name: &str) -> Result<&serde_json::Value, StateShapeError> {
        let outputs = self
            .0
            .get("outputs")
            .and_then(serde_json::Value::as_object)
            .ok_or(StateShapeError::MissingOutputs)?;
        outputs
            .get(name)
            .and_then(|output| output.get("value"))
            .ok_or_else(|| StateShapeError::MissingOutput {
                name: name.to_string(),
            })
    }

    /// Returns the output called `name` as a string.
    ///
    /// # Errors
    ///
    /// As [`ProvisioningState::output`], plus [`StateShapeError::NotAString`].
    pub fn output_str(&self, name: &str) -> Result<&str, StateShapeError> {
        self.output(name)?
            .as_str()
            .ok_or_else(|| StateShapeError::NotAString {
                name: name.to_string(),
            })
    }

    /// Returns a comma-joined string output split into its entries, in order.
    ///
    /// Entries are trimmed. An empty string yields no entries.
    ///
    /// # Errors
    ///
    /// As [`ProvisioningState::output_str`].
    pub fn output_list(&self, name: &str) -> Result<Vec<&str>, StateShapeError> {
        let joined = self.output_str(name)?;
        if joined.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(joined.split(',').map(str::trim).collect())
    }

    /// Returns the notebook instances created by a data-science deployment.
    ///
    /// Names and locations are paired index-wise; the i-th name lives in the
    /// i-th location. Order follows the outputs.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeError::InstanceCountMismatch`] if the two lists
    /// have different lengths, [`StateShapeError::EmptyValue`] if the project
    /// or any list entry is empty, and any error from reading the outputs.
    pub fn notebook_instances(&self) -> Result<Vec<NotebookInstancePath>, StateShapeError> {
        let project = ProjectId::new(self.output_str(DS_PROJECT_OUTPUT)?).ok_or_else(|| {
            StateShapeError::EmptyValue {
                name: DS_PROJECT_OUTPUT.to_string(),
            }
        })?;
        let names = self.output_list(NOTEBOOK_NAMES_OUTPUT)?;
        let locations = self.output_list(NOTEBOOK_LOCATIONS_OUTPUT)?;

        if names.len() != locations.len() {
            return Err(StateShapeError::InstanceCountMismatch {
                names: names.len(),
                locations: locations.len(),
            });
        }

        names
            .into_iter()
            .zip(locations)
            .map(|(name, location)| {
                let name = InstanceName::new(name).ok_or_else(|| StateShapeError::EmptyValue {
                    name: NOTEBOOK_NAMES_OUTPUT.to_string(),
                })?;
                let location =
                    LocationId::new(location).ok_or_else(|| StateShapeError::EmptyValue {
                        name: NOTEBOOK_LOCATIONS_OUTPUT.to_string(),
                    })?;
                Ok(NotebookInstancePath::new(project.clone(), location, name))
            })
            .collect()
    }
}
