#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chatpdf::document::Chunker;
use chatpdf::document::ChunkingConfig;
use chatpdf::document::PdfLoader;
use chatpdf::embeddings::EmbeddingProvider;
use chatpdf::llm::AnswerSynthesizer;
use chatpdf::models::Passage;
use chatpdf::rag::RagPipeline;
use chatpdf::ChatPdfError;
use chatpdf::Result;
use lopdf::content::Content;
use lopdf::content::Operation;
use lopdf::dictionary;
use lopdf::Document;
use lopdf::Object;
use lopdf::Stream;

pub const FAKE_DIMENSION: usize = 256;

/// Font used for the text of one generated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFont {
    /// Courier with WinAnsiEncoding; extracts cleanly
    WinAnsi,
    /// Composite Identity-H font with no ToUnicode map; text cannot be decoded
    IdentityH,
}

/// Render one PDF page per entry, one text line per element.
///
/// A page with no lines has an empty content stream, like a scanned page.
pub fn pdf_bytes(pages: &[&[&str]]) -> Vec<u8> {
    let pages: Vec<_> = pages.iter().map(|lines| (*lines, PageFont::WinAnsi)).collect();
    save(build_pdf(&pages))
}

/// Like [`pdf_bytes`], choosing the font of every page
pub fn pdf_bytes_with_fonts(pages: &[(&[&str], PageFont)]) -> Vec<u8> {
    save(build_pdf(pages))
}

/// A PDF whose trailer points at an encryption dictionary lacking its keys
pub fn encrypted_pdf_bytes(pages: &[&[&str]]) -> Vec<u8> {
    let pages: Vec<_> = pages.iter().map(|lines| (*lines, PageFont::WinAnsi)).collect();
    let mut doc = build_pdf(&pages);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    save(doc)
}

fn build_pdf(pages: &[(&[&str], PageFont)]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let win_ansi_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let identity_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "NotoSansCJK",
        "Encoding" => "Identity-H",
    });

    let mut kids = Vec::with_capacity(pages.len());
    for (lines, font) in pages {
        let font_id = match font {
            PageFont::WinAnsi => win_ansi_id,
            PageFont::IdentityH => identity_id,
        };
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut operations = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            let y = 780 - 14 * i64::try_from(idx).unwrap_or(0);
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
            operations.push(Operation::new("Td", vec![40.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).unwrap_or(0);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Write a generated PDF into `dir`
pub fn write_pdf(dir: &Path, name: &str, pages: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(pages)).unwrap();
    path
}

const RUST_PAGE: &[&str] = &[
    "Rust ownership rules prevent data races at compile time.",
    "Borrowed references never outlive the values they point to.",
    "Lifetimes annotate how long a borrow remains valid in code.",
    "Move semantics transfer ownership when values are assigned.",
    "Traits describe shared behaviour that many types implement.",
];

const FRANCE_PAGE: &[&str] = &[
    "The capital of France is Paris.",
    "Paris sits on the river Seine in the north of the country.",
    "Tourists visit the Louvre museum and the Eiffel tower there.",
    "French cuisine includes bread, cheese and pastries daily.",
];

const PLANT_PAGE: &[&str] = &[
    "Photosynthesis converts sunlight into chemical energy in leaves.",
    "Chlorophyll absorbs red and blue light but reflects green light.",
    "Plants release oxygen as a byproduct of splitting water.",
    "Glucose produced during this process fuels cellular growth.",
];

/// Three text-bearing pages; page 2 holds the fact about France
pub fn sample_pages() -> Vec<&'static [&'static str]> {
    vec![RUST_PAGE, FRANCE_PAGE, PLANT_PAGE]
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Deterministic hashed bag-of-words embedder
#[derive(Default)]
pub struct FakeEmbedder {
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; FAKE_DIMENSION];
        for token in tokens(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket =
                usize::try_from(hasher.finish() % FAKE_DIMENSION as u64).unwrap_or(0);
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Embedder that always fails, like an expired credential
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(ChatPdfError::Provider(
            "OpenAI API error (401 Unauthorized): invalid api key".to_string(),
        ))
    }
}

/// Answers with the text of the closest passage
pub struct EchoSynthesizer;

#[async_trait]
impl AnswerSynthesizer for EchoSynthesizer {
    async fn answer(&self, _question: &str, context: &[Passage]) -> Result<String> {
        context
            .first()
            .map(|p| p.text.clone())
            .ok_or_else(|| ChatPdfError::Synthesis("no context".to_string()))
    }
}

/// Synthesizer whose service is down
pub struct FailingSynthesizer;

#[async_trait]
impl AnswerSynthesizer for FailingSynthesizer {
    async fn answer(&self, _question: &str, _context: &[Passage]) -> Result<String> {
        Err(ChatPdfError::Synthesis(
            "OpenAI API error (503 Service Unavailable)".to_string(),
        ))
    }
}

pub fn pipeline_with(
    embedder: Arc<dyn EmbeddingProvider>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
) -> RagPipeline {
    let chunker = Chunker::new(ChunkingConfig::default()).unwrap();
    RagPipeline::from_parts(Box::new(PdfLoader::new()), chunker, embedder, synthesizer)
}

pub fn fake_pipeline() -> RagPipeline {
    pipeline_with(Arc::new(FakeEmbedder::default()), Arc::new(EchoSynthesizer))
}
