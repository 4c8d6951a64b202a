//! Render models for detection results.

use platewatch_core::{AnalysisResult, Detection, ImageAnalysis, Page, VideoAnalysis, VideoDetection};
use platewatch_session::SessionContext;

use crate::{Badge, ComplaintListView, Tone, UiError};

const NO_PLATES_MESSAGE: &str = "Plaka tespit edilemedi.";
const NO_VEHICLES_MESSAGE: &str = "Videoda araç tespit edilemedi.";
const UNKNOWN_CITY_LABEL: &str = "Bilinmiyor";

/// What a result action does with its plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultActionKind {
    /// Start a complaint for the plate.
    FileComplaint,
    /// Open the vehicle lookup modal for the plate.
    VehicleLookup,
}

/// Action button bound to one detected plate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultAction {
    /// Action kind.
    pub kind: ResultActionKind,
    /// Plate the action applies to.
    pub plate: String,
}

fn actions_for(plate: &str) -> Vec<ResultAction> {
    [ResultActionKind::FileComplaint, ResultActionKind::VehicleLookup]
        .into_iter()
        .map(|kind| ResultAction {
            kind,
            plate: plate.to_string(),
        })
        .collect()
}

fn category_badge(category: &str) -> Badge {
    let (tone, class) = if category.contains("Standard") {
        (Tone::Success, "bg-green-100 text-green-800")
    } else {
        (Tone::Neutral, "bg-gray-100 text-gray-800")
    };
    Badge {
        tone,
        class,
        text: category.to_string(),
    }
}

/// Rounded percentage for a video score, or `-` when absent.
///
/// Halves round away from zero (`0.125` -> `13%`).
pub fn score_label(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{}%", (score * 100.0).round() as i64),
        None => "-".to_string(),
    }
}

/// One detected plate in an image.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCard {
    /// Recognized plate text.
    pub plate: String,
    /// Category badge.
    pub category: Badge,
    /// Province, when recognized.
    pub city: Option<String>,
    /// Model confidence, when reported.
    pub confidence: Option<f64>,
    /// File-complaint and vehicle-lookup actions.
    pub actions: Vec<ResultAction>,
}

impl DetectionCard {
    fn from_detection(detection: &Detection) -> Self {
        let city = detection.city.trim();
        Self {
            plate: detection.text.clone(),
            category: category_badge(&detection.category),
            city: (!city.is_empty() && city != "Unknown").then(|| city.to_string()),
            confidence: detection.conf,
            actions: actions_for(&detection.text),
        }
    }

    /// City text, with the unknown-city placeholder.
    pub fn city_label(&self) -> &str {
        self.city.as_deref().unwrap_or(UNKNOWN_CITY_LABEL)
    }
}

/// Image analysis view.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResults {
    /// Annotated image source (data URL).
    pub image: String,
    /// One card per detection.
    pub cards: Vec<DetectionCard>,
    /// Message shown instead of cards when nothing was detected.
    pub empty_message: Option<&'static str>,
}

impl ImageResults {
    fn from_analysis(analysis: &ImageAnalysis) -> Self {
        let cards: Vec<DetectionCard> = analysis
            .detections
            .iter()
            .map(DetectionCard::from_detection)
            .collect();
        Self {
            image: analysis.image.clone(),
            empty_message: cards.is_empty().then_some(NO_PLATES_MESSAGE),
            cards,
        }
    }
}

/// One tracked vehicle in a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRow {
    /// Tracker id, rendered as `#id`.
    pub track_id: i64,
    /// Thumbnail source (data URL).
    pub thumbnail: String,
    /// Recognized plate text.
    pub plate: String,
    /// Category badge.
    pub category: Badge,
    /// Score label.
    pub score: String,
    /// File-complaint and vehicle-lookup actions.
    pub actions: Vec<ResultAction>,
}

impl VideoRow {
    fn from_detection(detection: &VideoDetection) -> Self {
        Self {
            track_id: detection.track_id,
            thumbnail: detection.image.clone(),
            plate: detection.text.clone(),
            category: category_badge(&detection.category),
            score: score_label(detection.score),
            actions: actions_for(&detection.text),
        }
    }
}

/// Video analysis view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoResults {
    /// One row per track.
    pub rows: Vec<VideoRow>,
    /// Message shown instead of rows when nothing was detected.
    pub empty_message: Option<&'static str>,
}

impl VideoResults {
    fn from_analysis(analysis: &VideoAnalysis) -> Self {
        let rows: Vec<VideoRow> = analysis.results.iter().map(VideoRow::from_detection).collect();
        Self {
            empty_message: rows.is_empty().then_some(NO_VEHICLES_MESSAGE),
            rows,
        }
    }
}

/// Rendered result for either mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// Image analysis.
    Image(ImageResults),
    /// Video analysis.
    Video(VideoResults),
}

/// Turns analysis results into render models and routes their actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultPresenter;

impl ResultPresenter {
    /// Builds the view for an analysis result.
    pub fn present(result: &AnalysisResult) -> ResultsView {
        match result {
            AnalysisResult::Image(analysis) => ResultsView::Image(ImageResults::from_analysis(analysis)),
            AnalysisResult::Video(analysis) => ResultsView::Video(VideoResults::from_analysis(analysis)),
        }
    }

    /// Starts a complaint for `plate`.
    pub fn file_complaint(session: &SessionContext, plate: &str) -> Result<Page, UiError> {
        ComplaintListView::submit_complaint(session, plate)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for result rendering.

    use super::*;

    fn detection(city: &str, category: &str) -> Detection {
        Detection {
            text: "06XYZ99".to_string(),
            category: category.to_string(),
            city: city.to_string(),
            conf: Some(0.91),
            bounding_box: None,
        }
    }

    #[test]
    fn unknown_city_renders_placeholder() {
        let card = DetectionCard::from_detection(&detection("Unknown", "Standard TR"));
        assert_eq!(card.city, None);
        assert_eq!(card.city_label(), "Bilinmiyor");
        assert_eq!(card.category.tone, Tone::Success);

        let known = DetectionCard::from_detection(&detection("Ankara", "Taxi"));
        assert_eq!(known.city_label(), "Ankara");
        assert_eq!(known.category.class, "bg-gray-100 text-gray-800");
    }

    #[test]
    fn score_renders_rounded_percentage() {
        assert_eq!(score_label(Some(0.8749)), "87%");
        assert_eq!(score_label(Some(1.0)), "100%");
        assert_eq!(score_label(None), "-");
    }

    #[test]
    fn score_halves_round_up() {
        assert_eq!(score_label(Some(0.125)), "13%");
        assert_eq!(score_label(Some(0.625)), "63%");
        assert_eq!(score_label(Some(0.0)), "0%");
    }

    #[test]
    fn empty_results_carry_messages() {
        let ResultsView::Video(video) =
            ResultPresenter::present(&AnalysisResult::Video(VideoAnalysis { results: Vec::new() }))
        else {
            panic!("video result should render as video");
        };
        assert_eq!(video.empty_message, Some(NO_VEHICLES_MESSAGE));
    }
}
