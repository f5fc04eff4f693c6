//! Raw-file staging sources for the archive.
//!
//! A source supplies, for a requested observation day, the decompressed
//! bytes of that day's raw file, or nothing at all when the archive has a
//! hole for that day. Mirror layout, per-era compression codecs, and
//! transport live here; the decode and write core never sees URLs or
//! compressed bytes.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::config::{DataSource, ObsType};

/// Compression codec wrapping a staged raw daily file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Gzip,
    Bzip2,
}

impl Codec {
    /// Codec for an observation type and year.
    ///
    /// Gauge-adjusted files are bzip2 throughout; raw files switched from
    /// gzip to bzip2 with the 2004 reprocessing.
    pub fn select(obs_type: ObsType, year: i32) -> Codec {
        match obs_type {
            ObsType::Adjusted => Codec::Bzip2,
            ObsType::Raw if year < 2004 => Codec::Gzip,
            ObsType::Raw => Codec::Bzip2,
        }
    }

    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Gzip => ".gz",
            Codec::Bzip2 => ".bz2",
        }
    }

    /// Decompress a staged file's bytes.
    pub fn decompress(&self, bytes: &[u8]) -> Result<Bytes> {
        let mut decompressed = Vec::new();
        match self {
            Codec::Gzip => {
                let mut decoder = flate2::read::GzDecoder::new(bytes);
                decoder
                    .read_to_end(&mut decompressed)
                    .context("gzip decompression failed")?;
            }
            Codec::Bzip2 => {
                let mut decoder = bzip2::read::BzDecoder::new(bytes);
                decoder
                    .read_to_end(&mut decompressed)
                    .context("bzip2 decompression failed")?;
            }
        }
        Ok(Bytes::from(decompressed))
    }
}

/// Uncompressed daily file name for an observation day.
pub fn daily_file_name(obs_type: ObsType, date: NaiveDate) -> String {
    let stamp = date.format("%Y%m%d");
    match obs_type {
        ObsType::Raw => format!("CMORPH_V1.0_RAW_0.25deg-DLY_00Z_{}", stamp),
        ObsType::Adjusted => format!("CMORPH_V1.0_ADJ_0.25deg-DLY_00Z_{}", stamp),
    }
}

/// Mirror path of the compressed file for an observation day, relative to
/// the mirror base URL.
pub fn remote_path(obs_type: ObsType, date: NaiveDate) -> String {
    let year = date.year();
    let year_month = date.format("%Y%m");
    let name = daily_file_name(obs_type, date);
    let ext = Codec::select(obs_type, year).extension();
    match obs_type {
        ObsType::Raw => format!(
            "CMORPH_V1.0/RAW/0.25deg-DLY_00Z/{}/{}/{}{}",
            year, year_month, name, ext
        ),
        ObsType::Adjusted => format!(
            "CMORPH_V1.0/CRT/0.25deg-DLY_00Z/{}/{}/{}{}",
            year, year_month, name, ext
        ),
    }
}

/// File name of the CTL descriptor for an observation type.
pub fn descriptor_file_name(obs_type: ObsType) -> &'static str {
    match obs_type {
        ObsType::Raw => "CMORPH_V1.0_RAW_0.25deg-DLY_00Z.ctl",
        ObsType::Adjusted => "CMORPH_V1.0_CRT_0.25deg-DLY_00Z.ctl",
    }
}

/// Mirror path of the CTL descriptor, relative to the mirror base URL.
pub fn descriptor_remote_path(obs_type: ObsType) -> String {
    format!("CMORPH_V1.0/CTL/{}", descriptor_file_name(obs_type))
}

/// Supplies decompressed raw bytes per observation day.
#[async_trait]
pub trait RawFileSource: Send + Sync {
    /// Fetch and decompress one day's raw file.
    ///
    /// Returns `Ok(None)` when the archive has no file for that day; the
    /// caller records a gap and moves on.
    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<Bytes>>;

    /// Fetch the CTL descriptor text.
    async fn fetch_descriptor(&self) -> Result<String>;
}

/// HTTPS mirror source.
pub struct HttpSource {
    client: Client,
    base_url: String,
    obs_type: ObsType,
}

impl HttpSource {
    pub fn new(base_url: String, obs_type: ObsType) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            obs_type,
        }
    }
}

#[async_trait]
impl RawFileSource for HttpSource {
    #[instrument(skip(self), fields(date = %date))]
    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<Bytes>> {
        let url = format!("{}/{}", self.base_url, remote_path(self.obs_type, date));

        debug!(url = %url, "Downloading raw file");

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // the archive has holes; a missing day is a gap, not an error
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!("download failed for {}: {}", url, response.status()));
        }

        let compressed = response.bytes().await?;
        let codec = Codec::select(self.obs_type, date.year());
        let bytes = codec.decompress(&compressed)?;

        info!(size = bytes.len(), url = %url, "Staged raw file");
        Ok(Some(bytes))
    }

    async fn fetch_descriptor(&self) -> Result<String> {
        let url = format!("{}/{}", self.base_url, descriptor_remote_path(self.obs_type));

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "descriptor download failed for {}: {}",
                url,
                response.status()
            ));
        }

        Ok(response.text().await?)
    }
}

/// Local directory source for already-staged files.
///
/// Looks for the compressed file name the mirror would serve first, then
/// falls back to a bare decompressed file.
pub struct LocalDirSource {
    root: PathBuf,
    obs_type: ObsType,
}

impl LocalDirSource {
    pub fn new(root: PathBuf, obs_type: ObsType) -> Self {
        Self { root, obs_type }
    }
}

#[async_trait]
impl RawFileSource for LocalDirSource {
    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<Bytes>> {
        let name = daily_file_name(self.obs_type, date);
        let codec = Codec::select(self.obs_type, date.year());

        let compressed = self.root.join(format!("{}{}", name, codec.extension()));
        if compressed.is_file() {
            let bytes = std::fs::read(&compressed)
                .with_context(|| format!("reading {}", compressed.display()))?;
            return Ok(Some(codec.decompress(&bytes)?));
        }

        let plain = self.root.join(&name);
        if plain.is_file() {
            let bytes =
                std::fs::read(&plain).with_context(|| format!("reading {}", plain.display()))?;
            return Ok(Some(Bytes::from(bytes)));
        }

        Ok(None)
    }

    async fn fetch_descriptor(&self) -> Result<String> {
        let path = self.root.join(descriptor_file_name(self.obs_type));
        std::fs::read_to_string(&path)
            .with_context(|| format!("reading descriptor {}", path.display()))
    }
}

/// Create the staging source selected by configuration.
pub fn create_source(source: &DataSource, obs_type: ObsType) -> Box<dyn RawFileSource> {
    match source {
        DataSource::Http { base_url } => Box::new(HttpSource::new(base_url.clone(), obs_type)),
        DataSource::LocalDir { path } => Box::new(LocalDirSource::new(path.clone(), obs_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn day(year: i32, month: u32, dayn: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dayn).unwrap()
    }

    #[test]
    fn test_codec_era_rule() {
        assert_eq!(Codec::select(ObsType::Raw, 1998), Codec::Gzip);
        assert_eq!(Codec::select(ObsType::Raw, 2003), Codec::Gzip);
        assert_eq!(Codec::select(ObsType::Raw, 2004), Codec::Bzip2);
        assert_eq!(Codec::select(ObsType::Raw, 2019), Codec::Bzip2);
        assert_eq!(Codec::select(ObsType::Adjusted, 1998), Codec::Bzip2);
        assert_eq!(Codec::select(ObsType::Adjusted, 2019), Codec::Bzip2);
    }

    #[test]
    fn test_daily_file_names() {
        assert_eq!(
            daily_file_name(ObsType::Raw, day(1998, 1, 2)),
            "CMORPH_V1.0_RAW_0.25deg-DLY_00Z_19980102"
        );
        assert_eq!(
            daily_file_name(ObsType::Adjusted, day(2005, 12, 31)),
            "CMORPH_V1.0_ADJ_0.25deg-DLY_00Z_20051231"
        );
    }

    #[test]
    fn test_remote_paths_follow_mirror_layout() {
        assert_eq!(
            remote_path(ObsType::Raw, day(1998, 1, 2)),
            "CMORPH_V1.0/RAW/0.25deg-DLY_00Z/1998/199801/CMORPH_V1.0_RAW_0.25deg-DLY_00Z_19980102.gz"
        );
        assert_eq!(
            remote_path(ObsType::Raw, day(2004, 6, 15)),
            "CMORPH_V1.0/RAW/0.25deg-DLY_00Z/2004/200406/CMORPH_V1.0_RAW_0.25deg-DLY_00Z_20040615.bz2"
        );
        assert_eq!(
            remote_path(ObsType::Adjusted, day(1998, 1, 2)),
            "CMORPH_V1.0/CRT/0.25deg-DLY_00Z/1998/199801/CMORPH_V1.0_ADJ_0.25deg-DLY_00Z_19980102.bz2"
        );
    }

    #[test]
    fn test_descriptor_remote_path() {
        assert_eq!(
            descriptor_remote_path(ObsType::Raw),
            "CMORPH_V1.0/CTL/CMORPH_V1.0_RAW_0.25deg-DLY_00Z.ctl"
        );
    }

    #[test]
    fn test_gzip_decompress_round_trip() {
        let original = b"flat binary grid payload";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(original).unwrap();
        let compressed = encoder.finish().unwrap();

        let decompressed = Codec::Gzip.decompress(&compressed).unwrap();
        assert_eq!(decompressed.as_ref(), original);
    }

    #[test]
    fn test_bzip2_decompress_round_trip() {
        let original = b"flat binary grid payload";
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(original).unwrap();
        let compressed = encoder.finish().unwrap();

        let decompressed = Codec::Bzip2.decompress(&compressed).unwrap();
        assert_eq!(decompressed.as_ref(), original);
    }

    #[test]
    fn test_corrupt_gzip_is_an_error() {
        assert!(Codec::Gzip.decompress(b"not gzip at all").is_err());
    }

    #[tokio::test]
    async fn test_local_dir_source_reads_staged_gz() {
        let dir = tempfile::tempdir().unwrap();
        let payload = test_utils::encode_le_grid(&test_utils::create_test_grid(4, 3));
        let name = format!("{}.gz", daily_file_name(ObsType::Raw, day(1998, 1, 1)));
        test_utils::write_gzip(&dir.path().join(name), &payload).unwrap();

        let source = LocalDirSource::new(dir.path().to_path_buf(), ObsType::Raw);
        let bytes = source.fetch_day(day(1998, 1, 1)).await.unwrap().unwrap();
        assert_eq!(bytes.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn test_local_dir_source_reads_bare_file() {
        let dir = tempfile::tempdir().unwrap();
        let payload = vec![1u8, 2, 3, 4];
        let name = daily_file_name(ObsType::Raw, day(1998, 1, 1));
        std::fs::write(dir.path().join(name), &payload).unwrap();

        let source = LocalDirSource::new(dir.path().to_path_buf(), ObsType::Raw);
        let bytes = source.fetch_day(day(1998, 1, 1)).await.unwrap().unwrap();
        assert_eq!(bytes.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn test_local_dir_source_missing_day_is_a_gap() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalDirSource::new(dir.path().to_path_buf(), ObsType::Raw);
        assert!(source.fetch_day(day(1998, 1, 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_local_dir_source_reads_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(descriptor_file_name(ObsType::Raw)),
            test_utils::TINY_DESCRIPTOR,
        )
        .unwrap();

        let source = LocalDirSource::new(dir.path().to_path_buf(), ObsType::Raw);
        let text = source.fetch_descriptor().await.unwrap();
        assert_eq!(text, test_utils::TINY_DESCRIPTOR);
    }
}
