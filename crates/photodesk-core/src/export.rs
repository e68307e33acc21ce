//! Render, encode, download and record an edited image.
//!
//! An export has two side effects, the download and the history entry.
//! They are independent: either may fail without undoing the other, and
//! both outcomes are reported back to the caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::encode::{encode_image, EncodeError, EncodedImage};
use crate::history::{HistoryEntry, HistoryError, HistoryStore, KeyValueBackend};
use crate::intake::ImageAsset;
use crate::params::TransformParameters;
use crate::transform::{render, TransformError};

/// How an export's filename is derived from the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNaming {
    /// `{prefix}{stem}.{ext}`, e.g. `enhanced_cat.png`.
    Prefix(String),
    /// `{stem}{suffix}.{ext}`, e.g. `cat_converted.webp`.
    Suffix(String),
}

impl FileNaming {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::Suffix(suffix.into())
    }

    /// Output filename for `original` with its extension replaced by `ext`.
    pub fn apply(&self, original: &str, ext: &str) -> String {
        let stem = file_stem(original);
        match self {
            Self::Prefix(prefix) => format!("{prefix}{stem}.{ext}"),
            Self::Suffix(suffix) => format!("{stem}{suffix}.{ext}"),
        }
    }
}

impl Default for FileNaming {
    fn default() -> Self {
        Self::Prefix("enhanced_".to_string())
    }
}

fn file_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    };
    if stem.is_empty() {
        "image"
    } else {
        stem
    }
}

/// Errors from delivering a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The platform refused or failed the download.
    #[error("Download failed: {0}")]
    Rejected(String),

    /// Writing the file failed.
    #[error("Download I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Somewhere an encoded file can be handed to the user.
pub trait DownloadSink {
    fn save(&mut self, filename: &str, image: &EncodedImage) -> Result<(), DownloadError>;
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, DownloadError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, filename: &str, image: &EncodedImage) -> Result<(), DownloadError> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| DownloadError::Rejected(format!("invalid filename {filename:?}")))?;
        fs::write(self.dir.join(name), &image.bytes)?;
        Ok(())
    }
}

/// Errors that abort an export before any side effect.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// What an export produced.
#[derive(Debug)]
pub struct ExportReport {
    pub filename: String,
    pub encoded: EncodedImage,
    pub download: Result<(), DownloadError>,
    pub history: Result<HistoryEntry, HistoryError>,
}

impl ExportReport {
    /// Both side effects succeeded.
    pub fn is_complete(&self) -> bool {
        self.download.is_ok() && self.history.is_ok()
    }
}

/// Render and encode `asset` without side effects.
pub fn encode_asset(
    asset: &ImageAsset,
    params: &TransformParameters,
) -> Result<EncodedImage, ExportError> {
    let rendered = render(asset.image(), params)?;
    Ok(encode_image(&rendered, params.format(), params.quality())?)
}

/// Export `asset` under a snapshot of `params`: download it through `sink`
/// and record it in `history`.
///
/// # Errors
///
/// Returns an error only when rendering or encoding fails, in which case
/// nothing was downloaded or recorded. Download and history failures are
/// reported in the [`ExportReport`].
pub fn export_and_download<S, B>(
    asset: &ImageAsset,
    params: &TransformParameters,
    naming: &FileNaming,
    sink: &mut S,
    history: &HistoryStore<B>,
) -> Result<ExportReport, ExportError>
where
    S: DownloadSink + ?Sized,
    B: KeyValueBackend,
{
    let encoded = encode_asset(asset, params)?;
    let filename = naming.apply(asset.filename(), params.format().extension());

    let download = sink.save(&filename, &encoded);
    if let Err(e) = &download {
        log::warn!("export: download of {filename} failed: {e}");
    }

    let history = history.add(HistoryEntry::from_encoded(&encoded, &filename));
    if let Err(e) = &history {
        log::warn!("export: could not record {filename} in history: {e}");
    }

    log::info!("exported {filename} ({} bytes, {:?})", encoded.len(), encoded.format);
    Ok(ExportReport {
        filename,
        encoded,
        download,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;
    use crate::encode::OutputFormat;
    use crate::history::{BackendError, MemoryBackend};
    use crate::intake::ImageSource;
    use crate::params::CropRect;

    fn asset(name: &str) -> ImageAsset {
        let image = DecodedImage::new(8, 6, vec![120u8; 8 * 6 * 4]);
        ImageAsset::new(image, name, "image/png", ImageSource::FilePicker)
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Vec<(String, usize)>,
        fail: bool,
    }

    impl DownloadSink for RecordingSink {
        fn save(&mut self, filename: &str, image: &EncodedImage) -> Result<(), DownloadError> {
            if self.fail {
                return Err(DownloadError::Rejected("blocked".to_string()));
            }
            self.saved.push((filename.to_string(), image.len()));
            Ok(())
        }
    }

    struct FullBackend;

    impl KeyValueBackend for FullBackend {
        fn get(&self, _key: &str) -> Result<Option<String>, BackendError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), BackendError> {
            Err(BackendError::QuotaExceeded)
        }

        fn remove(&mut self, _key: &str) -> Result<(), BackendError> {
            Ok(())
        }
    }

    #[test]
    fn test_naming() {
        assert_eq!(FileNaming::prefix("enhanced_").apply("cat.jpg", "png"), "enhanced_cat.png");
        assert_eq!(FileNaming::prefix("rotated_").apply("cat", "jpg"), "rotated_cat.jpg");
        assert_eq!(FileNaming::suffix("_converted").apply("my.photo.png", "webp"), "my.photo_converted.webp");
        assert_eq!(FileNaming::suffix("_x").apply("dir/sub/pic.bmp", "ico"), "pic_x.ico");
        assert_eq!(FileNaming::prefix("p_").apply(".hidden", "png"), "p_.hidden.png");
        assert_eq!(FileNaming::prefix("p_").apply("", "png"), "p_image.png");
    }

    #[test]
    fn test_export_downloads_and_records() {
        let history = HistoryStore::new(MemoryBackend::new());
        let mut sink = RecordingSink::default();
        let mut params = TransformParameters::new();
        params.set_format(OutputFormat::Jpeg);
        params.set_brightness(150.0);

        let report = export_and_download(
            &asset("cat.png"),
            &params,
            &FileNaming::default(),
            &mut sink,
            &history,
        )
        .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.filename, "enhanced_cat.jpg");
        assert_eq!(report.encoded.format, OutputFormat::Jpeg);
        assert_eq!(sink.saved, vec![("enhanced_cat.jpg".to_string(), report.encoded.len())]);

        let entries = history.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename(), "enhanced_cat.jpg");
        assert_eq!(entries[0].to_encoded().unwrap(), report.encoded);
    }

    #[test]
    fn test_download_failure_still_records_history() {
        let history = HistoryStore::new(MemoryBackend::new());
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };

        let report = export_and_download(
            &asset("a.png"),
            &TransformParameters::new(),
            &FileNaming::default(),
            &mut sink,
            &history,
        )
        .unwrap();

        assert!(report.download.is_err());
        assert!(report.history.is_ok());
        assert_eq!(history.list().unwrap().len(), 1);
    }

    #[test]
    fn test_history_failure_keeps_download() {
        let history = HistoryStore::new(FullBackend);
        let mut sink = RecordingSink::default();

        let report = export_and_download(
            &asset("a.png"),
            &TransformParameters::new(),
            &FileNaming::default(),
            &mut sink,
            &history,
        )
        .unwrap();

        assert!(report.download.is_ok());
        assert!(matches!(
            report.history,
            Err(HistoryError::Backend(BackendError::QuotaExceeded))
        ));
        assert_eq!(sink.saved.len(), 1);
    }

    #[test]
    fn test_render_failure_has_no_side_effects() {
        let history = HistoryStore::new(MemoryBackend::new());
        let mut sink = RecordingSink::default();
        let mut params = TransformParameters::new();
        // Entirely outside the 8x6 image
        params.set_crop(CropRect::new(50, 50, 10, 10)).unwrap();

        let result = export_and_download(
            &asset("a.png"),
            &params,
            &FileNaming::default(),
            &mut sink,
            &history,
        );

        assert!(matches!(result, Err(ExportError::Transform(TransformError::EmptyCrop { .. }))));
        assert!(sink.saved.is_empty());
        assert!(history.list().unwrap().is_empty());
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path()).unwrap();
        let encoded = EncodedImage::new(vec![1, 2, 3], OutputFormat::Png);

        sink.save("out.png", &encoded).unwrap();
        assert_eq!(fs::read(dir.path().join("out.png")).unwrap(), vec![1, 2, 3]);

        // Path components are stripped
        sink.save("../escaped.png", &encoded).unwrap();
        assert!(dir.path().join("escaped.png").exists());
    }

    #[test]
    fn test_encode_asset_matches_format() {
        let mut params = TransformParameters::new();
        params.set_format(OutputFormat::Bmp);
        let encoded = encode_asset(&asset("a.png"), &params).unwrap();
        assert_eq!(&encoded.bytes[..2], b"BM");
    }
}
