//! Upload panel: mode selection, file staging, and analysis dispatch.

use platewatch_api::Backend;
use platewatch_core::{AnalysisResult, MediaFile, Notice, redact_sensitive};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

const WRONG_TYPE_TITLE: &str = "Hata";
const ANALYSIS_FAILED_TITLE: &str = "Analiz Hatası";

/// Kind of media the panel accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadMode {
    /// Still images, analyzed with `/predict`.
    #[default]
    Image,
    /// Video clips, analyzed with `/predict_video`.
    Video,
}

impl UploadMode {
    /// Picker accept filter.
    pub fn accept(self) -> &'static str {
        match self {
            UploadMode::Image => "image/*",
            UploadMode::Video => "video/*",
        }
    }

    /// MIME prefix a staged file must carry.
    pub fn mime_prefix(self) -> &'static str {
        match self {
            UploadMode::Image => "image/",
            UploadMode::Video => "video/",
        }
    }

    /// Whether the long-processing warning banner is shown.
    pub fn shows_video_warning(self) -> bool {
        self == UploadMode::Video
    }

    fn wrong_type_message(self) -> &'static str {
        match self {
            UploadMode::Image => "Lütfen resim dosyası seçiniz.",
            UploadMode::Video => "Lütfen video dosyası seçiniz.",
        }
    }
}

/// SHA-256 hex digest of a staged file's bytes.
pub fn fingerprint(file: &MediaFile) -> String {
    hex::encode(Sha256::digest(&file.bytes))
}

/// Clears the loading flag when dropped, including during unwinding.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn engage(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Upload panel state.
#[derive(Debug, Default)]
pub struct UploadView {
    mode: UploadMode,
    staged: Option<MediaFile>,
    loading: bool,
    results: Option<AnalysisResult>,
}

impl UploadView {
    /// Creates an empty panel in image mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active mode.
    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    /// Switches mode, dropping the staged file and previous results.
    ///
    /// Returns `false` and changes nothing while an analysis is running.
    pub fn set_mode(&mut self, mode: UploadMode) -> bool {
        if self.loading {
            return false;
        }
        self.mode = mode;
        self.staged = None;
        self.results = None;
        true
    }

    /// Stages a picked or dropped file.
    ///
    /// A file whose MIME type does not match the mode is refused and any
    /// previously staged file is dropped.
    pub fn stage_file(&mut self, file: MediaFile) -> Result<(), Notice> {
        if !file.mime.starts_with(self.mode.mime_prefix()) {
            self.staged = None;
            return Err(Notice::error(
                WRONG_TYPE_TITLE,
                self.mode.wrong_type_message(),
            ));
        }
        info!(
            fingerprint = %fingerprint(&file),
            size = file.bytes.len(),
            "file staged"
        );
        self.staged = Some(file);
        Ok(())
    }

    /// Currently staged file.
    pub fn staged(&self) -> Option<&MediaFile> {
        self.staged.as_ref()
    }

    /// Label shown under the drop zone.
    pub fn file_label(&self) -> Option<String> {
        self.staged
            .as_ref()
            .map(|file| format!("Seçilen Dosya: {}", file.name))
    }

    /// Whether an analysis is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the analyze control is enabled.
    pub fn can_analyze(&self) -> bool {
        self.staged.is_some() && !self.loading
    }

    /// Results of the last successful analysis in this mode.
    pub fn results(&self) -> Option<&AnalysisResult> {
        self.results.as_ref()
    }

    /// Sends the staged file to the detection endpoint for the active mode.
    ///
    /// On success `on_result` receives the result and the mode. Failures
    /// come back as an "Analiz Hatası" notice. The loading flag is cleared on
    /// every exit path.
    pub fn analyze<F>(&mut self, backend: &dyn Backend, on_result: F) -> Option<Notice>
    where
        F: FnOnce(&AnalysisResult, UploadMode),
    {
        if !self.can_analyze() {
            return None;
        }
        self.results = None;
        let file = self.staged.as_ref()?;
        let mode = self.mode;
        let _loading = LoadingGuard::engage(&mut self.loading);

        info!(
            ?mode,
            fingerprint = %fingerprint(file),
            size = file.bytes.len(),
            "analysis dispatched"
        );
        let outcome = match mode {
            UploadMode::Image => backend.detect_image(file).map(AnalysisResult::Image),
            UploadMode::Video => backend.detect_video(file).map(AnalysisResult::Video),
        };

        match outcome {
            Ok(result) => {
                on_result(&result, mode);
                self.results = Some(result);
                None
            }
            Err(failure) => {
                warn!(error = %redact_sensitive(&failure.to_string()), "analysis failed");
                Some(Notice::error(ANALYSIS_FAILED_TITLE, failure.user_message()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for staging rules.

    use super::*;

    #[test]
    fn wrong_mime_is_refused_and_clears_staging() {
        let mut view = UploadView::new();
        view.stage_file(MediaFile::new("car.jpg", "image/jpeg", vec![1, 2]))
            .expect("image should stage");

        let notice = view
            .stage_file(MediaFile::new("notes.txt", "text/plain", vec![3]))
            .expect_err("text should be refused");

        assert_eq!(notice.title, "Hata");
        assert_eq!(notice.message, "Lütfen resim dosyası seçiniz.");
        assert!(view.staged().is_none());
        assert!(!view.can_analyze());
    }

    #[test]
    fn mode_switch_resets_staging() {
        let mut view = UploadView::new();
        view.stage_file(MediaFile::new("car.jpg", "image/jpeg", vec![1]))
            .expect("image should stage");
        assert!(view.can_analyze());

        assert!(view.set_mode(UploadMode::Video));

        assert!(view.staged().is_none());
        assert!(!view.can_analyze());
        assert!(view.mode().shows_video_warning());
        assert_eq!(view.mode().accept(), "video/*");
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        let file = MediaFile::new("empty.png", "image/png", Vec::new());
        assert_eq!(
            fingerprint(&file),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn guard_clears_flag_on_drop() {
        let mut flag = false;
        {
            let _guard = LoadingGuard::engage(&mut flag);
        }
        assert!(!flag);
    }
}
