use odfetch_lib::cli::FetchParams;
use odfetch_lib::download::DownloadOptions;
use odfetch_lib::manifest::ManifestSource;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// A reader page whose data script assigns `book_data` to `window.bData`.
pub fn reader_page_html(book_data: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>Reader</title></head>
  <body>
    <div id="BIFOCAL-runtime">
      <script id="BIFOCAL-data">window.bData = {book_data};</script>
    </div>
  </body>
</html>"#
    )
}

/// Book data with one spine item per `(path, output name)` pair.
pub fn book_data(spine: &[(&str, &str)]) -> String {
    let items = spine
        .iter()
        .map(|(path, name)| format!(r#"{{"path":"{path}","-odread-original-path":"{name}"}}"#))
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"title":"Test Book","spine":[{items}]}}"#)
}

/// A media descriptor with a single download protocol and one part per `(filename, name)`.
pub fn media_descriptor_xml(
    media_id: &str,
    acquisition_url: &str,
    base_url: &str,
    parts: &[(&str, &str)],
) -> String {
    let part_elements = parts
        .iter()
        .enumerate()
        .map(|(position, (filename, name))| {
            format!(
                r#"<Part number="{}" filename="{filename}" name="{name}" filesize="1024" duration="10:00"/>"#,
                position + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<OverDriveMedia id="{media_id}" ODMVersion="1.2">
  <License>
    <AcquisitionUrl>{acquisition_url}</AcquisitionUrl>
  </License>
  <Formats>
    <Format name="MP3 Audiobook">
      <Parts count="{count}" duration="1:00:00">
        {part_elements}
      </Parts>
      <Protocols>
        <Protocol method="download" baseurl="{base_url}"/>
      </Protocols>
    </Format>
  </Formats>
</OverDriveMedia>"#,
        count = parts.len()
    )
}

/// Parameters for an unpaced run into `output_dir`.
pub fn fetch_params(source: ManifestSource, output_dir: &Path, retry_limit: usize) -> FetchParams {
    FetchParams {
        source,
        output_dir: output_dir.to_path_buf(),
        options: DownloadOptions {
            rate_interval: Duration::ZERO,
            retry_limit,
        },
        request_timeout: Duration::from_secs(10),
        strict: false,
    }
}

pub fn file_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("odfetch_lib=debug,odfetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
