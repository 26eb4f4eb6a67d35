//! Signature inspection of query strings and request bodies.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::header;
use std::convert::Infallible;

use crate::security::decoder;
use crate::security::inspector::{InspectionSource, Inspector, Rejection, RequestContext, Verdict};
use crate::security::shape::{carries_body, is_json_content_type};
use crate::security::signatures::{self, Signature, SignatureSet};

const PREVIEW_CHARS: usize = 64;

/// A signature hit and where it was found.
#[derive(Debug)]
pub struct Detection {
    pub signature: &'static Signature,
    pub source: InspectionSource,
    preview: String,
}

/// Scans the query string and eligible bodies against one signature set.
pub struct ThreatInspector {
    name: &'static str,
    signatures: &'static SignatureSet,
}

impl ThreatInspector {
    pub fn new(name: &'static str, signatures: &'static SignatureSet) -> Self {
        Self { name, signatures }
    }

    pub fn xss() -> Self {
        Self::new("xss", signatures::xss())
    }

    pub fn sql_injection() -> Self {
        Self::new("sql_injection", signatures::sql_injection())
    }

    fn scan_text(&self, text: &str, source: InspectionSource) -> Option<Detection> {
        decoder::variants(text).iter().find_map(|variant| {
            signatures::matches(variant, self.signatures).map(|signature| Detection {
                signature,
                source,
                preview: preview(variant),
            })
        })
    }

    /// Returns the first detection across all sources, query first.
    pub async fn scan(&self, ctx: &mut RequestContext) -> Option<Detection> {
        if let Some(query) = ctx.query()
            && let Some(hit) = self.scan_text(query, InspectionSource::Query)
        {
            return Some(hit);
        }

        if !carries_body(ctx.method()) {
            return None;
        }
        let raw_content_type = ctx.header_str(header::CONTENT_TYPE.as_str())?;
        let content_type = raw_content_type.to_ascii_lowercase();
        let body = ctx.body().filter(|body| !body.is_empty())?;

        if content_type.starts_with("multipart/form-data") {
            // Boundaries are case-sensitive.
            let boundary = multer::parse_boundary(raw_content_type).ok()?;
            return self.scan_multipart(body.clone(), boundary).await;
        }

        if is_scannable_content_type(&content_type) {
            let text = String::from_utf8_lossy(body);
            return self.scan_text(&text, InspectionSource::Body);
        }

        None
    }

    /// Scans field names, file names and text fields of a multipart body.
    ///
    /// File contents are not scanned. A body that fails to parse ends the scan
    /// and is left to the handler to reject.
    async fn scan_multipart(&self, body: Bytes, boundary: String) -> Option<Detection> {
        let stream = futures::stream::once(async move { Ok::<_, Infallible>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        while let Ok(Some(field)) = multipart.next_field().await {
            let labels = [field.name(), field.file_name()];
            if let Some(hit) = labels
                .into_iter()
                .flatten()
                .find_map(|label| self.scan_text(label, InspectionSource::Body))
            {
                return Some(hit);
            }

            if field.file_name().is_some() {
                continue;
            }
            let Ok(text) = field.text().await else {
                return None;
            };
            if let Some(hit) = self.scan_text(&text, InspectionSource::Body) {
                return Some(hit);
            }
        }

        None
    }
}

/// Form, JSON and text bodies are scanned whole.
fn is_scannable_content_type(content_type: &str) -> bool {
    is_json_content_type(content_type)
        || content_type.starts_with("application/x-www-form-urlencoded")
        || content_type.starts_with("text/")
}

fn preview(text: &str) -> String {
    text.chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[async_trait]
impl Inspector for ThreatInspector {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn inspect(&self, ctx: &mut RequestContext) -> Verdict {
        match self.scan(ctx).await {
            Some(hit) => {
                tracing::warn!(
                    class = %hit.signature.class,
                    source = %hit.source,
                    signature = hit.signature.index,
                    path = ctx.path(),
                    preview = %hit.preview,
                    "Threat signature matched"
                );
                Verdict::Reject(Rejection::ThreatSignatureMatch {
                    class: hit.signature.class,
                    source: hit.source,
                })
            }
            None => Verdict::Continue,
        }
    }
}
