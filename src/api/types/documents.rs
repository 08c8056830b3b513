use serde::Serialize;

use crate::domain::ingestion::IngestionReport;

/// Body returned by a successful upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: IngestionReport,
}

impl From<IngestionReport> for UploadResponse {
    fn from(report: IngestionReport) -> Self {
        Self {
            message: report.message(),
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_flattens_report() {
        let mut report = IngestionReport::new(1);
        report.chunks_indexed = 3;
        report.documents_indexed = 1;

        let json = serde_json::to_value(UploadResponse::from(report)).unwrap();

        assert_eq!(
            json["message"],
            "Successfully uploaded and indexed 3 document chunks."
        );
        assert_eq!(json["chunks_indexed"], 3);
        assert!(json.get("skipped").is_none());
    }
}
