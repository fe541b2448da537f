// Dataset Fetch Module
//
// Downloads the Club Log cty.xml (gzip) or country-files.com cty.plist into a
// cache directory and hands back a path the lookup builders can read.
//
// Club Log:      https://secure.clublog.org/cty.php?api=<key>  (needs an API key)
// country-files: https://www.country-files.com/cty/cty.plist

mod download;

pub use download::{download_dataset, filename_from_disposition, filename_from_url, unpack_payload};

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{LookupConfig, LookupType};
use crate::error::{LookupError, Result};

/// Find the dataset file for `config`, downloading it when needed
///
/// A configured `filename` is returned as-is. The Club Log API backend has no
/// dataset and yields `None`.
pub async fn resolve_dataset(config: &LookupConfig) -> Result<Option<PathBuf>> {
    if config.lookup_type == LookupType::ClublogApi {
        return Ok(None);
    }
    if let Some(filename) = &config.filename {
        return Ok(Some(filename.clone()));
    }

    let timeout = Duration::from_secs(config.download_timeout_secs);
    let dest_dir = config.download_dir();

    let path = match config.lookup_type {
        LookupType::ClublogXml => {
            let api_key = config
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .ok_or(LookupError::CredentialMissing)?;
            download_dataset(&config.clublog_xml_url, Some(api_key), &dest_dir, timeout).await?
        }
        LookupType::CountryFile => {
            download_dataset(&config.countryfile_url, None, &dest_dir, timeout).await?
        }
        LookupType::ClublogApi => return Ok(None),
    };
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_file_is_used_as_is() {
        let config = LookupConfig {
            filename: Some(PathBuf::from("/data/cty.xml")),
            ..Default::default()
        };
        let path = resolve_dataset(&config).await.unwrap();
        assert_eq!(path, Some(PathBuf::from("/data/cty.xml")));
    }

    #[tokio::test]
    async fn test_api_backend_has_no_dataset() {
        let config = LookupConfig {
            lookup_type: LookupType::ClublogApi,
            ..Default::default()
        };
        assert_eq!(resolve_dataset(&config).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clublog_download_needs_key() {
        let config = LookupConfig {
            api_key: Some(" ".into()),
            clublog_xml_url: "http://127.0.0.1:9/cty.php".into(),
            ..Default::default()
        };
        assert!(matches!(
            resolve_dataset(&config).await,
            Err(LookupError::CredentialMissing)
        ));
    }
}
