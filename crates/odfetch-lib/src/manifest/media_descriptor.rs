//! Manifest described by a signed media descriptor (`.odm`) and its license.

use super::hash::media_console_hash;
use super::types::{DownloadManifest, ManifestEntry};
use crate::constants::media_console::{
    CLIENT_ID, DOWNLOAD_METHOD, LICENSE_FILE_NAME, OMC, OS, PART_EXTENSION, USER_AGENT,
};
use crate::error::OdFetchError;
use crate::http::{header_value, require_ok};
use reqwest::header::{HeaderMap, HeaderName, USER_AGENT as USER_AGENT_HEADER};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct MediaDescriptor {
    #[serde(rename = "@id")]
    content_id: String,
    #[serde(rename = "License")]
    license: LicenseSection,
    #[serde(rename = "Formats", default)]
    formats: Formats,
}

#[derive(Debug, Deserialize)]
struct LicenseSection {
    #[serde(rename = "AcquisitionUrl")]
    acquisition_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct Formats {
    #[serde(rename = "Format", default)]
    format: Vec<Format>,
}

#[derive(Debug, Deserialize)]
struct Format {
    #[serde(rename = "Parts", default)]
    parts: Parts,
    #[serde(rename = "Protocols", default)]
    protocols: Protocols,
}

#[derive(Debug, Default, Deserialize)]
struct Parts {
    #[serde(rename = "@count", default)]
    count: usize,
    #[serde(rename = "Part", default)]
    part: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(rename = "@filename")]
    filename: String,
    #[serde(rename = "@name")]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Protocols {
    #[serde(rename = "Protocol", default)]
    protocol: Vec<Protocol>,
}

#[derive(Debug, Deserialize)]
struct Protocol {
    #[serde(rename = "@method")]
    method: String,
    #[serde(rename = "@baseurl")]
    base_url: String,
}

/// The parts of a validated descriptor that the download needs.
#[derive(Debug, PartialEq, Eq)]
struct DownloadPlan {
    content_id: String,
    acquisition_url: Url,
    base_url: String,
    parts: Vec<(String, String)>,
}

fn parse_descriptor(xml: &str) -> Result<DownloadPlan, OdFetchError> {
    let descriptor: MediaDescriptor = quick_xml::de::from_str(xml)?;

    let [format] = <[Format; 1]>::try_from(descriptor.formats.format).map_err(|formats| {
        OdFetchError::structure(format!("expected 1 format, got {}", formats.len()))
    })?;

    if format.parts.part.len() != format.parts.count {
        return Err(OdFetchError::structure(format!(
            "expected {} parts, got {}",
            format.parts.count,
            format.parts.part.len()
        )));
    }

    let [protocol] = <[Protocol; 1]>::try_from(format.protocols.protocol).map_err(|protocols| {
        OdFetchError::structure(format!("expected 1 protocol, got {}", protocols.len()))
    })?;

    if protocol.method != DOWNLOAD_METHOD {
        return Err(OdFetchError::structure(format!(
            "unknown protocol method: {}",
            protocol.method
        )));
    }

    let acquisition_url = Url::parse(descriptor.license.acquisition_url.trim()).map_err(|e| {
        OdFetchError::format(format!(
            "invalid acquisition URL {}: {e}",
            descriptor.license.acquisition_url
        ))
    })?;

    Ok(DownloadPlan {
        content_id: descriptor.content_id,
        acquisition_url,
        base_url: protocol.base_url,
        parts: format
            .parts
            .part
            .into_iter()
            .map(|part| (part.name, part.filename))
            .collect(),
    })
}

fn license_request_url(acquisition_url: &Url, content_id: &str, hash: &str) -> Url {
    let mut url = acquisition_url.clone();
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("ClientID", CLIENT_ID)
        .append_pair("Hash", hash)
        .append_pair("MediaID", content_id)
        .append_pair("OMC", OMC)
        .append_pair("OS", OS);
    url
}

/// Reads the descriptor, acquires the license (saved as `license.xml`) and builds a manifest
/// whose entries carry the license on every request.
pub async fn resolve_media_descriptor(
    client: &Client,
    descriptor_path: &Path,
    output_dir: &Path,
) -> Result<DownloadManifest, OdFetchError> {
    tracing::info!(path = %descriptor_path.display(), "Reading media descriptor");
    let xml = tokio::fs::read_to_string(descriptor_path).await?;
    let plan = parse_descriptor(&xml)?;

    let hash = media_console_hash();
    let request_url = license_request_url(&plan.acquisition_url, &plan.content_id, &hash);
    tracing::info!(media_id = %plan.content_id, "Acquiring license");
    let response = client
        .get(request_url)
        .header(USER_AGENT_HEADER, USER_AGENT)
        .send()
        .await?;
    let license = require_ok(response).await?.bytes().await?;

    let license_path = output_dir.join(LICENSE_FILE_NAME);
    tokio::fs::write(&license_path, &license)
        .await
        .map_err(|e| OdFetchError::FileWrite {
            path: license_path.clone(),
            reason: e.to_string(),
        })?;
    tracing::debug!(path = %license_path.display(), bytes = license.len(), "Saved license");

    let manifest = build_manifest(&plan, &license)?;
    tracing::info!(parts = manifest.len(), "Resolved descriptor manifest");
    Ok(manifest)
}

fn build_manifest(plan: &DownloadPlan, license: &[u8]) -> Result<DownloadManifest, OdFetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("clientid"),
        header_value("client id", CLIENT_ID.as_bytes())?,
    );
    headers.insert(
        HeaderName::from_static("license"),
        header_value("license", license)?,
    );
    headers.insert(USER_AGENT_HEADER, header_value("user agent", USER_AGENT.as_bytes())?);

    let entries = plan
        .parts
        .iter()
        .map(|(name, filename)| {
            let location = format!("{}/{}", plan.base_url, filename);
            let source = Url::parse(&location).map_err(|e| {
                OdFetchError::format(format!("invalid part location {location}: {e}"))
            })?;
            Ok(ManifestEntry {
                name: format!("{name}.{PART_EXTENSION}"),
                source,
                headers: headers.clone(),
            })
        })
        .collect::<Result<Vec<_>, OdFetchError>>()?;

    DownloadManifest::new(entries)
}
