use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Generated document stored next to an opportunity
#[derive(Debug, Clone, FromRow)]
pub struct ArtifactDoc {
    pub id: i64,
    pub opportunity_id: i64,
    pub file_name: String,
    pub gdrive_file_name: String,
    pub gdrive_web_url: String,
    pub generated_by: Uuid,
    pub generated_at: DateTime<Utc>,
}

/// Values for a new artifact row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    pub opportunity_id: i64,
    pub file_name: String,
    pub gdrive_file_name: String,
    pub gdrive_web_url: String,
    pub generated_by: Uuid,
}

impl NewArtifact {
    /// Placeholder document standing in for a generated one
    pub fn placeholder(
        opportunity_id: i64,
        opportunity_name: &str,
        generated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        let document_id = format!("artifact-{}", now.timestamp_millis());
        Self {
            opportunity_id,
            file_name: format!(
                "Artifact for {} - {}",
                opportunity_name,
                now.format("%Y-%m-%d")
            ),
            gdrive_web_url: format!("https://docs.google.com/document/d/{}/edit", document_id),
            gdrive_file_name: document_id,
            generated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_placeholder_artifact() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let artifact = NewArtifact::placeholder(7, "Acme renewal", Uuid::nil(), now);

        let millis = now.timestamp_millis();
        assert_eq!(artifact.opportunity_id, 7);
        assert_eq!(artifact.file_name, "Artifact for Acme renewal - 2025-03-14");
        assert_eq!(artifact.gdrive_file_name, format!("artifact-{}", millis));
        assert_eq!(
            artifact.gdrive_web_url,
            format!("https://docs.google.com/document/d/artifact-{}/edit", millis)
        );
    }
}
