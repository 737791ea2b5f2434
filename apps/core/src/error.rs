use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// A dataset, vocabulary or map asset could not be retrieved or decoded.
    #[error("failed to load {resource}: {reason}")]
    LoadFailure { resource: String, reason: String },

    /// The current filter combination matches no record.
    #[error("no records match the current filters")]
    EmptyResult,

    /// A clicked or selected region has no registered map asset.
    #[error("region {region} has no map asset")]
    UnmappedRegion { region: String },
}

impl DashboardError {
    pub fn load_failure(resource: impl Into<String>, reason: impl ToString) -> Self {
        Self::LoadFailure {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
