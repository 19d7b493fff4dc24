//! Typed payload for the scan export request.
//!
//! The server generates a report asynchronously: request an export, poll its
//! status, then download the file. This module only models the request body;
//! sequencing the three calls is left to the caller.

use serde::{Deserialize, Serialize};

/// File formats the scanner can export a scan into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Nessus,
    Html,
    Pdf,
    Csv,
    Db,
}

/// Per-host report sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSections {
    pub host_information: bool,
    pub scan_information: bool,
}

impl Default for HostSections {
    fn default() -> Self {
        Self {
            host_information: true,
            scan_information: true,
        }
    }
}

/// Per-finding report sections. Everything is included unless switched off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilitySections {
    pub description: bool,
    pub see_also: bool,
    pub solution: bool,
    pub risk_factor: bool,
    pub cvss_base_score: bool,
    pub cvss_temporal_score: bool,
    pub cvss3_base_score: bool,
    pub cvss3_temporal_score: bool,
    pub stig_severity: bool,
    pub references: bool,
    pub exploitable_with: bool,
    pub plugin_information: bool,
    pub plugin_output: bool,
}

impl Default for VulnerabilitySections {
    fn default() -> Self {
        Self {
            description: true,
            see_also: true,
            solution: true,
            risk_factor: true,
            cvss_base_score: true,
            cvss_temporal_score: true,
            cvss3_base_score: true,
            cvss3_temporal_score: true,
            stig_severity: true,
            references: true,
            exploitable_with: true,
            plugin_information: true,
            plugin_output: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportContents {
    #[serde(rename = "hostSections")]
    pub host_sections: HostSections,
    #[serde(rename = "vulnerabilitySections")]
    pub vulnerability_sections: VulnerabilitySections,
}

/// Body of `POST /scans/{scan_id}/export`.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(rename = "reportContents")]
    pub report_contents: ReportContents,
}

impl ExportRequest {
    /// Export request with every report section enabled.
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            report_contents: ReportContents::default(),
        }
    }
}
