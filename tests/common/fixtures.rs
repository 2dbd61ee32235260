//! Test fixtures: documents, sessions, PDFs and fake services.

use anyhow::Result;
use async_trait::async_trait;
use lopdf::{dictionary, Object};
use printpdf::{BuiltinFont, Mm, PdfDocument, PdfDocumentReference};
use redactor_engine::{
    BBox, DetectionLevel, DetectorService, Document, DocumentSize, EngineConfig, EngineError,
    EngineResult, ExportRequest, MutationService, RawDetection, RedactionSession, RenderSize,
};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// US Letter in points.
pub fn letter() -> DocumentSize {
    DocumentSize::new(612.0, 792.0)
}

/// A document of `pages` letter pages with placeholder bytes.
pub fn letter_document(pages: usize) -> Document {
    Document::new("fixture.pdf", b"%PDF-1.7".to_vec(), vec![letter(); pages])
        .expect("fixture document is valid")
}

/// A session over `pages` letter pages, none of them laid out.
pub fn session(pages: usize) -> RedactionSession {
    RedactionSession::new(letter_document(pages), EngineConfig::default())
        .expect("default config is valid")
}

/// A session over `pages` letter pages, every page laid out at `render`.
pub fn rendered_session(pages: usize, render: RenderSize) -> RedactionSession {
    let mut session = session(pages);
    for page in 0..pages {
        session
            .set_render_size(page, render)
            .expect("page exists");
    }
    session
}

/// A detector finding as it would arrive over the wire.
pub fn raw_detection(page: i64, bbox: BBox, text: &str, category: Option<&str>) -> RawDetection {
    RawDetection {
        page,
        bbox,
        text: text.to_string(),
        category: category.map(str::to_string),
    }
}

/// Builder for creating test PDFs with custom pages and content.
///
/// # Example
///
/// ```no_run
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let bytes = TestPdfBuilder::new()
///     .with_title("Statement")
///     .with_page(297.0, 210.0)
///     .with_content("Invoice 42")
///     .to_bytes()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    title: String,
    pages: Vec<(Mm, Mm)>,
    content: Vec<String>,
}

impl TestPdfBuilder {
    /// Creates a builder for a single US Letter page.
    pub fn new() -> Self {
        Self {
            title: "Test Document".to_string(),
            pages: vec![(Mm(215.9), Mm(279.4))],
            content: Vec::new(),
        }
    }

    /// Sets the document title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Appends a page with the given size in millimetres.
    pub fn with_page(mut self, width: f32, height: f32) -> Self {
        self.pages.push((Mm(width), Mm(height)));
        self
    }

    /// Adds a line of text to every page.
    pub fn with_content(mut self, content: &str) -> Self {
        self.content.push(content.to_string());
        self
    }

    fn document(&self) -> Result<PdfDocumentReference> {
        let (first_width, first_height) = self.pages[0];
        let (doc, page1, layer1) =
            PdfDocument::new(&self.title, first_width, first_height, "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        let mut layers = vec![(doc.get_page(page1).get_layer(layer1), first_height)];
        for (width, height) in self.pages.iter().skip(1) {
            let (page, layer) = doc.add_page(*width, *height, "Layer 1");
            layers.push((doc.get_page(page).get_layer(layer), *height));
        }

        let mut text = format!("{}\n", self.title);
        for line in &self.content {
            text.push_str(line);
            text.push('\n');
        }
        for (layer, height) in &layers {
            layer.use_text(&text, 12.0, Mm(20.0), Mm(height.0 - 20.0), &font);
        }
        Ok(doc)
    }

    /// Builds the PDF and writes it to the specified path.
    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let doc = self.document()?;
        doc.save(&mut BufWriter::new(fs::File::create(output_path)?))?;
        Ok(output_path.to_path_buf())
    }

    /// Builds the PDF in memory.
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        let doc = self.document()?;
        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer)?;
        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing PDF buffer: {}", e))
    }
}

impl Default for TestPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A two-page PDF whose MediaBox lives on the page tree root and whose
/// second page is rotated by 90 degrees.
pub fn rotated_pdf_bytes() -> Result<Vec<u8>> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let upright = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });
    let rotated = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Rotate" => Object::Integer(90),
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(upright), Object::Reference(rotated)],
        "Count" => Object::Integer(2),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// A one-page PDF whose MediaBox is `[100 200 712 992]`, with the corners
/// given top-right first.
pub fn offset_pdf_bytes() -> Result<Vec<u8>> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let page = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(712),
            Object::Integer(992),
            Object::Integer(100),
            Object::Integer(200),
        ],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page)],
        "Count" => Object::Integer(1),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Detector that always returns the same findings and counts its calls.
pub struct StaticDetector {
    response: Vec<RawDetection>,
    calls: AtomicUsize,
}

impl StaticDetector {
    pub fn new(response: Vec<RawDetection>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetectorService for StaticDetector {
    async fn detect(&self, _document: &[u8], _level: DetectionLevel) -> EngineResult<Vec<RawDetection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Detector whose call always fails.
pub struct FailingDetector;

#[async_trait]
impl DetectorService for FailingDetector {
    async fn detect(&self, _document: &[u8], _level: DetectionLevel) -> EngineResult<Vec<RawDetection>> {
        Err(EngineError::DetectorFailure {
            reason: "503 Service Unavailable".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Detector that signals when a call starts and then waits for the test to
/// release it.
pub struct GatedDetector {
    response: Vec<RawDetection>,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedDetector {
    /// Returns the detector plus the `started` and `release` handles.
    pub fn new(response: Vec<RawDetection>) -> (Self, Arc<Notify>, Arc<Notify>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let detector = Self {
            response,
            started: Arc::clone(&started),
            release: Arc::clone(&release),
        };
        (detector, started, release)
    }
}

#[async_trait]
impl DetectorService for GatedDetector {
    async fn detect(&self, _document: &[u8], _level: DetectionLevel) -> EngineResult<Vec<RawDetection>> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// Mutation service that records every request and returns fixed bytes.
#[derive(Default)]
pub struct RecordingMutation {
    requests: Mutex<Vec<ExportRequest>>,
}

impl RecordingMutation {
    pub fn requests(&self) -> Vec<ExportRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl MutationService for RecordingMutation {
    async fn apply(&self, request: &ExportRequest) -> EngineResult<Vec<u8>> {
        self.requests
            .lock()
            .expect("lock poisoned")
            .push(request.clone());
        Ok(b"%PDF-redacted".to_vec())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Mutation service whose call always fails.
pub struct FailingMutation;

#[async_trait]
impl MutationService for FailingMutation {
    async fn apply(&self, _request: &ExportRequest) -> EngineResult<Vec<u8>> {
        Err(EngineError::MutationServiceFailure {
            reason: "connection reset".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Mutation service that never answers.
pub struct StalledMutation;

#[async_trait]
impl MutationService for StalledMutation {
    async fn apply(&self, _request: &ExportRequest) -> EngineResult<Vec<u8>> {
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "stalled"
    }
}
