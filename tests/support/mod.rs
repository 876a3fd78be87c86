//! Shared helpers for integration tests: socket guard and a mock listing site.

#![allow(dead_code)]

pub mod socket_guard;

use std::path::Path;

use listing_mirror::CrawlConfig;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Remote root used by every mock site.
pub const ROOT: &str = "question-papers/2024-Papers";

/// Path of the page serving AJAX listings on the mock site.
pub const LISTING_PAGE: &str = "/index.php/question-papers";

/// Wraps row bodies into listing markup.
pub fn listing(rows: &[String]) -> String {
    let items: String = rows
        .iter()
        .map(|row| format!("<li class=\"sfl_item\">{row}</li>"))
        .collect();
    format!("<ul class=\"sfl_list\">{items}</ul>")
}

/// A script-triggered subdirectory row pointing at `rel`.
pub fn subdir_row(rel: &str) -> String {
    format!(
        "<img src=\"/plugins/sfl/directory.png\"><a href=\"javascript:void(0)\" rel=\"{rel}\">{}</a>",
        rel.rsplit('/').next().unwrap_or(rel)
    )
}

/// A plain PDF link row.
pub fn pdf_row(href: &str) -> String {
    format!("<img src=\"/plugins/sfl/pdf.png\"><a href=\"{href}\">{href}</a>")
}

/// Serves `markup` for the listing of `remote_dir`.
pub async fn mount_listing(server: &MockServer, remote_dir: &str, markup: String) {
    Mock::given(method("GET"))
        .and(path(LISTING_PAGE))
        .and(query_param("sflaction", "dir"))
        .and(query_param("sflDir", remote_dir))
        .respond_with(ResponseTemplate::new(200).set_body_string(markup))
        .mount(server)
        .await;
}

/// Configuration pointing at `server`, with every output under `work_dir`.
pub fn config_for(server: &MockServer, work_dir: &Path) -> CrawlConfig {
    CrawlConfig {
        base_page_url: format!("{}{LISTING_PAGE}", server.uri()),
        site_origin: server.uri(),
        root_remote_dir: ROOT.to_string(),
        download_dir: work_dir.join("downloads"),
        logs_dir: work_dir.join("logs"),
        skip_ledger: work_dir.join("skipped.csv"),
        max_retries: 2,
        retry_delay_ms: 10,
        fetch_timeout_ms: 5_000,
        download_timeout_ms: 5_000,
        ..CrawlConfig::default()
    }
}

/// Renders `config` as a TOML file the binary can load.
pub fn write_config_file(config: &CrawlConfig, file: &Path) {
    let toml = format!(
        "base_page_url = \"{}\"\n\
         site_origin = \"{}\"\n\
         root_remote_dir = \"{}\"\n\
         download_dir = '{}'\n\
         logs_dir = '{}'\n\
         skip_ledger = '{}'\n\
         max_retries = {}\n\
         retry_delay_ms = {}\n\
         fetch_timeout_ms = {}\n\
         download_timeout_ms = {}\n",
        config.base_page_url,
        config.site_origin,
        config.root_remote_dir,
        config.download_dir.display(),
        config.logs_dir.display(),
        config.skip_ledger.display(),
        config.max_retries,
        config.retry_delay_ms,
        config.fetch_timeout_ms,
        config.download_timeout_ms,
    );
    std::fs::write(file, toml).unwrap();
}
