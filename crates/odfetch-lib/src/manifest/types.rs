use crate::error::OdFetchError;
use itertools::Itertools;
use reqwest::Url;
use reqwest::header::HeaderMap;
use std::path::{Component, Path};

/// A single downloadable part and everything needed to request it.
#[derive(Clone, Debug)]
pub struct ManifestEntry {
    /// Output file name, relative to the output directory.
    pub name: String,
    pub source: Url,
    pub headers: HeaderMap,
}

/// Ordered list of parts. Order decides both download order and part numbering.
#[derive(Clone, Debug)]
pub struct DownloadManifest {
    entries: Vec<ManifestEntry>,
}

impl DownloadManifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Result<Self, OdFetchError> {
        for (position, entry) in entries.iter().enumerate() {
            validate_destination_name(&entry.name).map_err(|reason| {
                OdFetchError::structure(format!(
                    "part {} has an invalid destination name {:?}: {}",
                    position + 1,
                    entry.name,
                    reason
                ))
            })?;
        }

        if let Some(duplicate) = entries
            .iter()
            .map(|entry| destination_key(&entry.name))
            .duplicates()
            .next()
        {
            return Err(OdFetchError::structure(format!(
                "destination {duplicate:?} is used by more than one part"
            )));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_destination_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name.contains('\0') {
        return Err("name contains a NUL byte");
    }
    // Reject both separators regardless of platform so a manifest behaves the same everywhere.
    for segment in name.split(['/', '\\']) {
        match segment {
            ".." => return Err("name escapes the output directory"),
            "." => return Err("name contains a '.' component"),
            _ => {}
        }
    }

    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => return Err("name contains a '.' component"),
            Component::ParentDir => return Err("name escapes the output directory"),
            Component::RootDir | Component::Prefix(_) => return Err("name is not relative"),
        }
    }
    Ok(())
}

/// The file a validated name resolves to: empty segments collapse and `\` counts as `/`.
fn destination_key(name: &str) -> String {
    name.split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            source: Url::parse("https://example.com/part").unwrap(),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn test_manifest_preserves_order() {
        let manifest = DownloadManifest::new(vec![entry("b.mp3"), entry("a.mp3")]).unwrap();
        let names: Vec<_> = manifest.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.mp3", "a.mp3"]);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_nested_relative_names_are_allowed() {
        assert!(DownloadManifest::new(vec![entry("Fmt425/Part01.mp3")]).is_ok());
    }

    #[test]
    fn test_rejects_traversal() {
        for name in [
            "../escape.mp3",
            "a/../../b.mp3",
            "..\\escape.mp3",
            "/etc/passwd",
            "./a.mp3",
            "x/./a.mp3",
            "x\\.\\a.mp3",
            "x/.",
        ] {
            let err = DownloadManifest::new(vec![entry(name)]).unwrap_err();
            assert!(
                matches!(err, OdFetchError::Structure { .. }),
                "{name} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_rejects_empty_name() {
        let err = DownloadManifest::new(vec![entry("a.mp3"), entry("")]).unwrap_err();
        assert!(err.to_string().contains("part 2"));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let entries = vec![entry("a.mp3"), entry("b.mp3"), entry("a.mp3")];
        let err = DownloadManifest::new(entries).unwrap_err();
        assert!(matches!(err, OdFetchError::Structure { .. }));
        assert!(err.to_string().contains("a.mp3"));
    }

    #[test]
    fn test_rejects_names_resolving_to_the_same_file() {
        for (first, second) in [
            ("x/a.mp3", "x//a.mp3"),
            ("x/a.mp3", "x\\a.mp3"),
            ("x/a.mp3", "x/a.mp3/"),
        ] {
            let err = DownloadManifest::new(vec![entry(first), entry(second)]).unwrap_err();
            assert!(
                matches!(err, OdFetchError::Structure { .. }),
                "{first} and {second} should collide, got {err:?}"
            );
            assert!(err.to_string().contains("\"x/a.mp3\""));
        }
    }

    #[test]
    fn test_empty_manifest_is_valid() {
        assert!(DownloadManifest::new(Vec::new()).unwrap().is_empty());
    }
}
