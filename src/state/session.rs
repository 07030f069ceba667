//! The viewer session.
//!
//! One `ViewerSession` holds everything a viewer window shows: the
//! decoded image, the handle the renderer draws from, and the latest
//! query results. Every mutation goes through a method here, and each
//! method that changes the image rebuilds the display handle before
//! returning, so the two never disagree.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use super::data::{DisplayHandle, QueryState, ResultEntry, Thumbnail};
use crate::error::{Result, ViewerError};
use crate::imaging::{filter, loader};
use crate::query::FetchedResult;

#[derive(Debug)]
struct LoadedImage {
    image: DynamicImage,
    display: DisplayHandle,
    source: PathBuf,
    /// Bumped on every replacement so late blur results can be discarded
    revision: u64,
}

/// A query that passed the precondition checks and may now be sent
#[derive(Debug, Clone)]
pub struct PendingQuery {
    pub generation: u64,
    pub image: DynamicImage,
}

#[derive(Debug, Default)]
pub struct ViewerSession {
    current: Option<LoadedImage>,
    results: Vec<ResultEntry>,
    num_page: usize,
    query: QueryState,
    revisions: u64,
    generations: u64,
    opens: u64,
    /// Generation of the most recent open still decoding
    pending_open: Option<u64>,
    /// Revision being blurred off-thread
    blurring: Option<u64>,
    /// Blur clicks waiting for the running blur to land
    queued_blurs: usize,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and decode `path` synchronously
    ///
    /// On failure the session is left exactly as it was.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let image = loader::load_image_blocking(path)?;
        self.install(path.to_path_buf(), image);
        Ok(())
    }

    /// Replace the current image with a freshly opened one
    pub fn install(&mut self, source: PathBuf, image: DynamicImage) {
        self.replace_image(source, image);
        self.num_page = 0;
        self.blurring = None;
        self.queued_blurs = 0;
    }

    /// Register an off-thread open; only the latest one will be installed
    pub fn begin_open(&mut self) -> u64 {
        self.opens += 1;
        self.pending_open = Some(self.opens);
        self.opens
    }

    /// Install the decoded image of open `generation`
    ///
    /// Returns `false` and changes nothing if a later open superseded it.
    pub fn finish_open(&mut self, generation: u64, source: PathBuf, image: DynamicImage) -> bool {
        if self.pending_open != Some(generation) {
            log::debug!("Ignoring superseded open of {}", source.display());
            return false;
        }
        self.pending_open = None;
        self.install(source, image);
        true
    }

    /// Record that open `generation` failed; `false` if it was superseded
    pub fn fail_open(&mut self, generation: u64) -> bool {
        if self.pending_open != Some(generation) {
            return false;
        }
        self.pending_open = None;
        true
    }

    pub fn is_opening(&self) -> bool {
        self.pending_open.is_some()
    }

    /// Blur the current image in place
    pub fn blur(&mut self, sigma: f32) -> Result<()> {
        let current = self.current.as_ref().ok_or(ViewerError::NoImage)?;
        let blurred = filter::blur(&current.image, sigma);
        let source = current.source.clone();
        self.replace_image(source, blurred);
        Ok(())
    }

    /// Start an off-thread blur of the current image
    ///
    /// While a blur is running further clicks are queued rather than
    /// started, and `Ok(None)` is returned; each queued click is started
    /// on top of the previous result by `next_queued_blur`.
    pub fn begin_blur(&mut self) -> Result<Option<(u64, DynamicImage)>> {
        let current = self.current.as_ref().ok_or(ViewerError::NoImage)?;
        if self.blurring.is_some() {
            self.queued_blurs += 1;
            return Ok(None);
        }
        self.blurring = Some(current.revision);
        Ok(Some((current.revision, current.image.clone())))
    }

    /// Install the result of an off-thread blur
    ///
    /// Returns `false` and changes nothing if the image was replaced while
    /// the blur ran.
    pub fn apply_blur(&mut self, revision: u64, blurred: DynamicImage) -> bool {
        if self.blurring != Some(revision) {
            return false;
        }
        self.blurring = None;
        match &self.current {
            Some(current) if current.revision == revision => {
                let source = current.source.clone();
                self.replace_image(source, blurred);
                true
            }
            _ => false,
        }
    }

    /// Record that the blur of `revision` failed; queued clicks are dropped
    pub fn fail_blur(&mut self, revision: u64) {
        if self.blurring == Some(revision) {
            self.blurring = None;
            self.queued_blurs = 0;
        }
    }

    /// Start the next queued blur, if any, on the latest image
    pub fn next_queued_blur(&mut self) -> Option<(u64, DynamicImage)> {
        if self.queued_blurs == 0 || self.blurring.is_some() {
            return None;
        }
        let current = self.current.as_ref()?;
        self.queued_blurs -= 1;
        self.blurring = Some(current.revision);
        Some((current.revision, current.image.clone()))
    }

    pub fn is_blurring(&self) -> bool {
        self.blurring.is_some()
    }

    fn replace_image(&mut self, source: PathBuf, image: DynamicImage) {
        // Build the new handle before dropping the old state
        let display = DisplayHandle::from_image(&image);
        self.revisions += 1;
        self.current = Some(LoadedImage {
            image,
            display,
            source,
            revision: self.revisions,
        });
    }

    /// Start a query: fails with `NoImage` before anything is sent
    ///
    /// Any query still in flight is superseded; its answer will be ignored.
    pub fn begin_query(&mut self) -> Result<PendingQuery> {
        let current = self.current.as_ref().ok_or(ViewerError::NoImage)?;
        self.generations += 1;
        self.query = QueryState::InFlight {
            generation: self.generations,
        };
        Ok(PendingQuery {
            generation: self.generations,
            image: current.image.clone(),
        })
    }

    /// Install the answer to query `generation`
    ///
    /// The previous result set is dropped wholesale. Returns `false` if the
    /// answer is stale (superseded or cancelled) and was ignored.
    pub fn finish_query(&mut self, generation: u64, fetched: Vec<FetchedResult>) -> bool {
        if !self.is_current(generation) {
            log::debug!("Ignoring stale answer for query {}", generation);
            return false;
        }

        self.results = fetched
            .into_iter()
            .map(|result| ResultEntry {
                path: result.path,
                score: result.score,
                thumbnail: result.thumbnail.map(|image| Thumbnail::from_image(&image)),
            })
            .collect();
        self.query = QueryState::Idle;
        true
    }

    /// Record that query `generation` failed; previous results stay visible
    pub fn fail_query(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.query = QueryState::Idle;
        true
    }

    pub fn cancel_query(&mut self) {
        self.query = QueryState::Idle;
    }

    fn is_current(&self, generation: u64) -> bool {
        self.query == QueryState::InFlight { generation }
    }

    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        self.current.as_ref().map(|c| &c.image)
    }

    pub fn display(&self) -> Option<&DisplayHandle> {
        self.current.as_ref().map(|c| &c.display)
    }

    pub fn source(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.source.as_path())
    }

    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }

    pub fn query_state(&self) -> QueryState {
        self.query
    }

    pub fn is_querying(&self) -> bool {
        matches!(self.query, QueryState::InFlight { .. })
    }

    /// The page counter as displayed, 1-indexed
    pub fn page_label(&self) -> String {
        (self.num_page + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BLUR_SIGMA;
    use crate::imaging::{fixtures, ImageMode};
    use tempfile::tempdir;

    fn fetched(path: &str, score: f64, size: u32) -> FetchedResult {
        FetchedResult {
            path: path.to_string(),
            score,
            thumbnail: Ok(fixtures::gradient(size, size)),
        }
    }

    fn session_with(image: DynamicImage) -> ViewerSession {
        let mut session = ViewerSession::new();
        session.install(PathBuf::from("fixture.png"), image);
        session
    }

    #[test]
    fn test_open_shows_native_dimensions() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("photo.png");
        fixtures::gradient(123, 45).save(&path).expect("failed to save fixture");

        let mut session = ViewerSession::new();
        session.open(&path).expect("open should succeed");

        let display = session.display().expect("display handle after open");
        assert_eq!((display.width, display.height), (123, 45));
        assert_eq!(display.mode, ImageMode::Photo);
        assert_eq!(session.source(), Some(path.as_path()));
    }

    #[test]
    fn test_open_resets_page_counter() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("photo.png");
        fixtures::gradient(8, 8).save(&path).expect("failed to save fixture");

        let mut session = ViewerSession::new();
        session.num_page = 4;
        session.open(&path).expect("open should succeed");
        assert_eq!(session.page_label(), "1");
    }

    #[test]
    fn test_failed_open_keeps_previous_image() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let bad = temp_dir.path().join("bad.png");
        std::fs::write(&bad, b"nope").expect("failed to write");

        let mut session = session_with(fixtures::gradient(20, 10));
        let result = session.open(&bad);

        assert!(matches!(result, Err(ViewerError::Decode { .. })));
        let display = session.display().expect("old image still shown");
        assert_eq!((display.width, display.height), (20, 10));
    }

    #[test]
    fn test_bitmap_is_presented_as_bitmap() {
        let session = session_with(fixtures::checkerboard(16, 16));
        assert_eq!(session.display().map(|d| d.mode), Some(ImageMode::Bitmap));
    }

    #[test]
    fn test_blur_without_image_fails() {
        let mut session = ViewerSession::new();
        assert_eq!(session.blur(DEFAULT_BLUR_SIGMA), Err(ViewerError::NoImage));
        assert!(matches!(session.begin_blur(), Err(ViewerError::NoImage)));
        assert!(!session.is_blurring());
    }

    #[test]
    fn test_blur_changes_pixels_and_rerenders() {
        let original = fixtures::gradient(30, 20);
        let mut session = session_with(original.clone());

        session.blur(DEFAULT_BLUR_SIGMA).expect("blur should succeed");

        let image = session.image().expect("image still loaded");
        assert_ne!(image.as_bytes(), original.as_bytes());
        assert_eq!(image.color(), original.color());
        let display = session.display().expect("display handle");
        assert_eq!((display.width, display.height), (30, 20));
    }

    #[test]
    fn test_blurred_bitmap_is_presented_as_photo() {
        let mut session = session_with(fixtures::checkerboard(16, 16));
        session.blur(DEFAULT_BLUR_SIGMA).expect("blur should succeed");
        assert_eq!(session.display().map(|d| d.mode), Some(ImageMode::Photo));
    }

    #[test]
    fn test_stale_blur_is_discarded() {
        let mut session = session_with(fixtures::gradient(10, 10));
        let (revision, image) = session
            .begin_blur()
            .expect("image loaded")
            .expect("nothing running");

        session.install(PathBuf::from("other.png"), fixtures::gradient(40, 40));
        let applied = session.apply_blur(revision, filter::blur(&image, DEFAULT_BLUR_SIGMA));

        assert!(!applied);
        assert!(!session.is_blurring());
        assert_eq!(session.display().map(|d| d.width), Some(40));
    }

    #[test]
    fn test_double_blur_applies_both() {
        let original = fixtures::gradient(24, 24);
        let mut session = session_with(original.clone());

        let (first, image) = session
            .begin_blur()
            .expect("image loaded")
            .expect("nothing running");
        // Second click while the first blur is still running
        assert!(session.begin_blur().expect("image loaded").is_none());
        assert!(session.is_blurring());

        assert!(session.apply_blur(first, filter::blur(&image, DEFAULT_BLUR_SIGMA)));
        let (second, image) = session.next_queued_blur().expect("second click queued");
        assert!(session.apply_blur(second, filter::blur(&image, DEFAULT_BLUR_SIGMA)));

        assert!(session.next_queued_blur().is_none());
        assert!(!session.is_blurring());
        let twice = filter::blur(&filter::blur(&original, DEFAULT_BLUR_SIGMA), DEFAULT_BLUR_SIGMA);
        assert_eq!(session.image().map(|i| i.as_bytes()), Some(twice.as_bytes()));
    }

    #[test]
    fn test_failed_blur_drops_queued_clicks() {
        let mut session = session_with(fixtures::gradient(8, 8));
        let (revision, _) = session
            .begin_blur()
            .expect("image loaded")
            .expect("nothing running");
        assert!(session.begin_blur().expect("image loaded").is_none());

        session.fail_blur(revision);
        assert!(!session.is_blurring());
        assert!(session.next_queued_blur().is_none());
    }

    #[test]
    fn test_older_open_finishing_last_is_dropped() {
        let mut session = ViewerSession::new();
        let slow = session.begin_open();
        let fast = session.begin_open();
        assert!(session.is_opening());

        assert!(session.finish_open(fast, PathBuf::from("b.png"), fixtures::gradient(10, 5)));
        assert!(!session.is_opening());
        assert!(!session.finish_open(slow, PathBuf::from("a.png"), fixtures::gradient(300, 200)));

        assert_eq!(session.source(), Some(Path::new("b.png")));
        assert_eq!(session.display().map(|d| (d.width, d.height)), Some((10, 5)));
    }

    #[test]
    fn test_opening_stays_set_until_latest_open_lands() {
        let mut session = ViewerSession::new();
        let first = session.begin_open();
        let second = session.begin_open();

        assert!(!session.fail_open(first));
        assert!(session.is_opening());
        assert!(session.fail_open(second));
        assert!(!session.is_opening());
        assert!(!session.has_image());
    }

    #[test]
    fn test_query_without_image_fails_before_sending() {
        let mut session = ViewerSession::new();
        assert!(matches!(session.begin_query(), Err(ViewerError::NoImage)));
        assert!(!session.is_querying());
    }

    #[test]
    fn test_query_renders_thumbnails_with_labels() {
        let mut session = session_with(fixtures::gradient(10, 10));
        let pending = session.begin_query().expect("image loaded");
        assert!(session.is_querying());

        let applied = session.finish_query(
            pending.generation,
            vec![fetched("a.jpg", 0.87, 64), fetched("b.jpg", 0.12, 30)],
        );

        assert!(applied);
        assert!(!session.is_querying());
        let results = session.results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label(), "0.87");
        assert_eq!(results[1].label(), "0.12");
        for entry in results {
            let thumb = entry.thumbnail.as_ref().expect("thumbnail loaded");
            assert!(thumb.width <= 64 && thumb.height <= 64);
        }
    }

    #[test]
    fn test_second_query_replaces_first_results() {
        let mut session = session_with(fixtures::gradient(10, 10));

        let first = session.begin_query().expect("image loaded");
        session.finish_query(
            first.generation,
            vec![
                fetched("a.jpg", 0.9, 8),
                fetched("b.jpg", 0.8, 8),
                fetched("c.jpg", 0.7, 8),
            ],
        );
        assert_eq!(session.results().len(), 3);

        let second = session.begin_query().expect("image loaded");
        session.finish_query(second.generation, vec![fetched("d.jpg", 0.5, 8)]);

        let paths: Vec<&str> = session.results().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["d.jpg"]);
    }

    #[test]
    fn test_superseded_answer_is_ignored() {
        let mut session = session_with(fixtures::gradient(10, 10));
        let first = session.begin_query().expect("image loaded");
        let second = session.begin_query().expect("image loaded");

        assert!(!session.finish_query(first.generation, vec![fetched("old.jpg", 1.0, 8)]));
        assert!(session.results().is_empty());
        assert!(session.is_querying());

        assert!(session.finish_query(second.generation, vec![fetched("new.jpg", 2.0, 8)]));
        assert_eq!(session.results()[0].path, "new.jpg");
    }

    #[test]
    fn test_cancelled_answer_is_ignored() {
        let mut session = session_with(fixtures::gradient(10, 10));
        let pending = session.begin_query().expect("image loaded");
        session.cancel_query();

        assert!(!session.finish_query(pending.generation, vec![fetched("a.jpg", 1.0, 8)]));
        assert!(!session.fail_query(pending.generation));
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_failed_query_keeps_previous_results() {
        let mut session = session_with(fixtures::gradient(10, 10));
        let first = session.begin_query().expect("image loaded");
        session.finish_query(first.generation, vec![fetched("a.jpg", 1.0, 8)]);

        let second = session.begin_query().expect("image loaded");
        assert!(session.fail_query(second.generation));
        assert!(!session.is_querying());
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn test_missing_thumbnail_keeps_entry() {
        let mut session = session_with(fixtures::gradient(10, 10));
        let pending = session.begin_query().expect("image loaded");
        session.finish_query(
            pending.generation,
            vec![FetchedResult {
                path: "/gone.jpg".to_string(),
                score: 0.5,
                thumbnail: Err(ViewerError::Thumbnail {
                    path: "/gone.jpg".to_string(),
                    reason: "No such file".to_string(),
                }),
            }],
        );

        assert_eq!(session.results().len(), 1);
        assert!(session.results()[0].thumbnail.is_err());
        assert_eq!(session.results()[0].label(), "0.50");
    }
}
