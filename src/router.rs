//! Upload routing
//!
//! Reads the multipart form, classifies the attached file (if any) into one of
//! the handling paths, and drives extraction and generation for that path.
//! Every check here runs before the model is called.

use std::sync::Arc;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::ai::mime::{self, DOCX_MIME, PDF_MIME, TEXT_MIME};
use crate::ai::GenerativeModel;
use crate::models::{
    DocumentFormat, GenerationRequest, GenerationResult, Upload, UploadKind,
};
use crate::{extract, prompts, Error, Result};

pub const FILE_FIELD: &str = "file";
pub const PROMPT_FIELD: &str = "prompt";

const OCTET_STREAM: &str = "application/octet-stream";

/// Parsed multipart form: at most one file and an optional prompt.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<Upload>,
    pub prompt: Option<String>,
}

/// Reads the `file` and `prompt` fields, streaming the file so an oversized
/// upload is rejected as soon as it crosses `limit`.
pub async fn read_multipart(mut multipart: Multipart, limit: usize) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                if form.file.is_some() {
                    return Err(Error::InvalidRequest(
                        "Only one file per request is supported".to_string(),
                    ));
                }

                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);

                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, limit))?
                {
                    if bytes.len() + chunk.len() > limit {
                        tracing::warn!(
                            filename = filename.as_deref(),
                            limit,
                            "Rejecting oversized upload"
                        );
                        return Err(Error::PayloadTooLarge { limit });
                    }
                    bytes.extend_from_slice(&chunk);
                }

                // Browsers send an unnamed empty part when no file was chosen.
                let unnamed = filename.as_deref().map_or(true, |f| f.trim().is_empty());
                if bytes.is_empty() && unnamed {
                    continue;
                }

                form.file = Some(Upload {
                    bytes,
                    content_type,
                    filename,
                });
            }
            Some(PROMPT_FIELD) => {
                let text = field.text().await.map_err(|e| multipart_error(e, limit))?;
                form.prompt = Some(text);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError, limit: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge { limit }
    } else {
        Error::InvalidRequest(format!("Invalid multipart payload: {}", err.body_text()))
    }
}

/// Selects the handling path for an upload.
///
/// A declared MIME type on an allow-list wins. When the declared type is
/// missing or generic, the file extension and then the leading bytes decide.
pub fn classify(upload: &Upload) -> Result<UploadKind> {
    let declared = upload.declared_mime();
    let declared = declared.as_deref().map(mime::canonical);
    let extension = upload.extension();

    if let Some(kind) = declared.and_then(kind_for_mime) {
        return Ok(kind);
    }

    let generic = matches!(declared, None | Some(OCTET_STREAM));
    if !generic {
        return Err(Error::UnsupportedType(upload.describe_type()));
    }

    if let Some(kind) = extension.as_deref().and_then(kind_for_extension) {
        return Ok(kind);
    }

    if let Some(kind) = mime::sniff(&upload.bytes).and_then(kind_for_mime) {
        return Ok(kind);
    }

    if mime::is_zip(&upload.bytes) && extension.as_deref() == Some("docx") {
        return Ok(UploadKind::Document(DocumentFormat::Docx));
    }

    Err(Error::UnsupportedType(upload.describe_type()))
}

fn kind_for_mime(mime_type: &str) -> Option<UploadKind> {
    match mime_type {
        DOCX_MIME => Some(UploadKind::Document(DocumentFormat::Docx)),
        PDF_MIME => Some(UploadKind::Document(DocumentFormat::Pdf)),
        TEXT_MIME => Some(UploadKind::Document(DocumentFormat::PlainText)),
        m if mime::is_allowed_image(m) => Some(UploadKind::Image {
            mime_type: m.to_string(),
        }),
        m if mime::is_allowed_audio(m) => Some(UploadKind::Audio {
            mime_type: m.to_string(),
        }),
        _ => None,
    }
}

fn kind_for_extension(extension: &str) -> Option<UploadKind> {
    let mime_type = match extension {
        "pdf" => PDF_MIME,
        "txt" | "text" => TEXT_MIME,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "wav" => "audio/wav",
        "mp3" | "mpeg" => "audio/mpeg",
        _ => return None,
    };
    kind_for_mime(mime_type)
}

/// Dispatches classified uploads to the extractor and the model.
pub struct UploadRouter {
    model: Arc<dyn GenerativeModel>,
    max_upload_bytes: usize,
}

impl UploadRouter {
    pub fn new(model: Arc<dyn GenerativeModel>, max_upload_bytes: usize) -> Self {
        Self {
            model,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Text-only path. The prompt is forwarded as typed.
    pub async fn chat(&self, prompt: &str) -> Result<GenerationResult> {
        if prompt.trim().is_empty() {
            return Err(Error::InvalidRequest("Prompt is required".to_string()));
        }
        self.generate(UploadKind::Text, GenerationRequest::text(prompt))
            .await
    }

    pub async fn document(&self, form: UploadForm) -> Result<GenerationResult> {
        let upload = form.file.ok_or(Error::MissingFile)?;
        match classify(&upload)? {
            UploadKind::Document(format) => {
                self.run_document(format, upload, form.prompt.as_deref())
                    .await
            }
            _ => Err(Error::UnsupportedType(upload.describe_type())),
        }
    }

    pub async fn image(&self, form: UploadForm) -> Result<GenerationResult> {
        let upload = form.file.ok_or(Error::MissingFile)?;
        match classify(&upload)? {
            UploadKind::Image { mime_type } => {
                self.run_media(
                    UploadKind::Image {
                        mime_type: mime_type.clone(),
                    },
                    mime_type,
                    upload,
                    prompts::or_default(form.prompt.as_deref(), prompts::IMAGE_DEFAULT),
                )
                .await
            }
            _ => Err(Error::UnsupportedType(upload.describe_type())),
        }
    }

    pub async fn audio(&self, form: UploadForm) -> Result<GenerationResult> {
        let upload = form.file.ok_or(Error::MissingFile)?;
        match classify(&upload)? {
            UploadKind::Audio { mime_type } => {
                self.run_media(
                    UploadKind::Audio {
                        mime_type: mime_type.clone(),
                    },
                    mime_type,
                    upload,
                    prompts::or_default(form.prompt.as_deref(), prompts::AUDIO_DEFAULT),
                )
                .await
            }
            _ => Err(Error::UnsupportedType(upload.describe_type())),
        }
    }

    /// Picks the path from the form contents: no file means text-only.
    pub async fn dispatch(&self, form: UploadForm) -> Result<GenerationResult> {
        let Some(upload) = form.file.as_ref() else {
            return self.chat(form.prompt.as_deref().unwrap_or_default()).await;
        };

        match classify(upload)? {
            UploadKind::Text => self.chat(form.prompt.as_deref().unwrap_or_default()).await,
            UploadKind::Document(_) => self.document(form).await,
            UploadKind::Image { .. } => self.image(form).await,
            UploadKind::Audio { .. } => self.audio(form).await,
        }
    }

    async fn run_document(
        &self,
        format: DocumentFormat,
        upload: Upload,
        prompt: Option<&str>,
    ) -> Result<GenerationResult> {
        tracing::info!(
            filename = upload.filename.as_deref(),
            bytes = upload.bytes.len(),
            ?format,
            "Extracting document text"
        );

        let text = extract::extract_text(format, upload.bytes).await?;
        let request = GenerationRequest::text(prompts::document(prompt, &text));
        self.generate(UploadKind::Document(format), request).await
    }

    async fn run_media(
        &self,
        kind: UploadKind,
        mime_type: String,
        upload: Upload,
        prompt: &str,
    ) -> Result<GenerationResult> {
        if upload.bytes.is_empty() {
            return Err(Error::InvalidRequest("Uploaded file is empty".to_string()));
        }
        let request = GenerationRequest::with_media(prompt, mime_type, upload.bytes)?;
        self.generate(kind, request).await
    }

    async fn generate(
        &self,
        kind: UploadKind,
        request: GenerationRequest,
    ) -> Result<GenerationResult> {
        tracing::info!(
            path = kind.label(),
            model = self.model.model_id(),
            "Forwarding request to generative model"
        );
        self.model.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockModel;
    use pretty_assertions::assert_eq;

    fn upload(bytes: &[u8], content_type: Option<&str>, filename: Option<&str>) -> Upload {
        Upload {
            bytes: bytes.to_vec(),
            content_type: content_type.map(str::to_string),
            filename: filename.map(str::to_string),
        }
    }

    fn form(file: Option<Upload>, prompt: Option<&str>) -> UploadForm {
        UploadForm {
            file,
            prompt: prompt.map(str::to_string),
        }
    }

    fn router(model: &MockModel) -> UploadRouter {
        UploadRouter::new(Arc::new(model.clone()), 1024)
    }

    #[test]
    fn test_classify_by_declared_mime() {
        assert_eq!(
            classify(&upload(b"x", Some(DOCX_MIME), Some("a.docx"))).unwrap(),
            UploadKind::Document(DocumentFormat::Docx)
        );
        assert_eq!(
            classify(&upload(b"x", Some("text/plain; charset=utf-8"), None)).unwrap(),
            UploadKind::Document(DocumentFormat::PlainText)
        );
        assert_eq!(
            classify(&upload(b"x", Some("image/jpg"), None)).unwrap(),
            UploadKind::Image {
                mime_type: "image/jpeg".to_string()
            }
        );
        assert_eq!(
            classify(&upload(b"x", Some("audio/mp3"), None)).unwrap(),
            UploadKind::Audio {
                mime_type: "audio/mp3".to_string()
            }
        );
    }

    #[test]
    fn test_classify_generic_mime_uses_extension_then_signature() {
        assert_eq!(
            classify(&upload(b"hello", Some(OCTET_STREAM), Some("notes.TXT"))).unwrap(),
            UploadKind::Document(DocumentFormat::PlainText)
        );
        assert_eq!(
            classify(&upload(b"%PDF-1.5 ...", None, None)).unwrap(),
            UploadKind::Document(DocumentFormat::Pdf)
        );
        assert_eq!(
            classify(&upload(&[0x89, 0x50, 0x4E, 0x47], None, Some("blob"))).unwrap(),
            UploadKind::Image {
                mime_type: "image/png".to_string()
            }
        );
    }

    #[test]
    fn test_classify_rejects_unlisted_types() {
        let err = classify(&upload(b"GIF89a", Some("image/gif"), Some("a.gif"))).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref t) if t == "image/gif"));

        let err = classify(&upload(b"\x00\x00", None, Some("movie.mkv"))).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref t) if t == "movie.mkv"));
    }

    #[test]
    fn test_classify_docx_by_zip_header_and_name() {
        assert_eq!(
            classify(&upload(b"PK\x03\x04rest", Some(OCTET_STREAM), Some("Report.DOCX"))).unwrap(),
            UploadKind::Document(DocumentFormat::Docx)
        );

        let err = classify(&upload(b"plain words", None, Some("fake.docx"))).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref t) if t == "fake.docx"));

        let err = classify(&upload(b"PK\x03\x04rest", None, Some("sheet.xlsx"))).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }

    #[test]
    fn test_declared_mime_outside_lists_is_not_overridden_by_extension() {
        let err = classify(&upload(b"x", Some("video/mp4"), Some("clip.mp3"))).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_prompt() {
        let model = MockModel::new();
        let err = router(&model).chat("   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected() {
        let model = MockModel::new();
        let err = router(&model)
            .image(form(None, Some("describe")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingFile));
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_modality_is_rejected_before_model_call() {
        let model = MockModel::new();
        let r = router(&model);

        let err = r
            .image(form(Some(upload(b"RIFF", Some("audio/wav"), None)), None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref t) if t == "audio/wav"));

        let err = r
            .audio(form(Some(upload(b"x", Some("image/png"), None)), None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));

        let err = r
            .document(form(Some(upload(b"x", Some("image/webp"), None)), None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));

        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_document_prompt_carries_extracted_text() {
        let model = MockModel::new().with_response("ok");
        let result = router(&model)
            .document(form(
                Some(upload(b"0123456789", Some("text/plain"), Some("ten.txt"))),
                Some("Summarize"),
            ))
            .await
            .unwrap();

        assert_eq!(result.text, "ok");
        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt(), "Summarize\n\n0123456789");
        assert!(requests[0].media().is_none());
    }

    #[tokio::test]
    async fn test_empty_document_is_rejected_before_model_call() {
        let model = MockModel::new();
        let err = router(&model)
            .document(form(Some(upload(b"   \n", Some("text/plain"), None)), None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyContent));
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_uses_default_prompt_and_inline_media() {
        let model = MockModel::new().with_response("a cat");
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0];
        let result = router(&model)
            .image(form(Some(upload(&bytes, Some("image/jpeg"), None)), Some(" ")))
            .await
            .unwrap();

        assert_eq!(result.text, "a cat");
        let request = &model.requests()[0];
        assert_eq!(request.prompt(), prompts::IMAGE_DEFAULT);
        let media = request.media().unwrap();
        assert_eq!(media.mime_type, "image/jpeg");
        assert_eq!(media.bytes, bytes.to_vec());
    }

    #[tokio::test]
    async fn test_user_prompt_is_forwarded_as_typed_on_every_path() {
        let model = MockModel::new().with_response("ok");
        let r = router(&model);

        r.chat("  Hello  ").await.unwrap();
        r.image(form(
            Some(upload(&[0x89, 0x50, 0x4E, 0x47], Some("image/png"), None)),
            Some("  describe this  "),
        ))
        .await
        .unwrap();
        r.document(form(
            Some(upload(b"body", Some("text/plain"), None)),
            Some("  Summarize  "),
        ))
        .await
        .unwrap();

        let requests = model.requests();
        assert_eq!(requests[0].prompt(), "  Hello  ");
        assert_eq!(requests[1].prompt(), "  describe this  ");
        assert_eq!(requests[2].prompt(), "  Summarize  \n\nbody");
    }

    #[tokio::test]
    async fn test_empty_media_file_is_rejected_before_model_call() {
        let model = MockModel::new();
        let err = router(&model)
            .audio(form(Some(upload(b"", Some("audio/wav"), Some("memo.wav"))), None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(ref m) if m == "Uploaded file is empty"));
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_without_file_takes_text_path() {
        let model = MockModel::new().with_response("hi there");
        let result = router(&model)
            .dispatch(form(None, Some("Hello")))
            .await
            .unwrap();

        assert_eq!(result.text, "hi there");
        let request = &model.requests()[0];
        assert_eq!(request.prompt(), "Hello");
        assert!(request.media().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_routes_audio_by_signature() {
        let model = MockModel::new();
        router(&model)
            .dispatch(form(Some(upload(b"ID3\x04\x00\x00", None, Some("memo"))), None))
            .await
            .unwrap();

        let request = &model.requests()[0];
        assert_eq!(request.prompt(), prompts::AUDIO_DEFAULT);
        assert_eq!(request.media().unwrap().mime_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let model = MockModel::new().with_failure("API key not valid");
        let err = router(&model).chat("Hello").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(ref m) if m == "API key not valid"));
    }
}
