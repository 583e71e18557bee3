// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Quote request intake.
//!
//! The public request form arrives as multipart (text fields plus up
//! to three invoice PDFs). Processing order: validate locally, upload
//! the invoices, persist the request row and its service join rows,
//! send the notification email. The first failure stops the pipeline.

use crate::db::{objects, Db, StorageClient};
use crate::error::{AppError, Result};
use crate::models::{ServiceRequest, ServiceRequestService};
use crate::services::mailer::{EmailAttachment, Mailer};
use crate::services::settings::dedup_preserving_order;
use futures_util::{stream, StreamExt};
use validator::ValidateEmail;

/// Invoice files accepted per request.
const MAX_INVOICES: usize = 3;
const PDF_MIME: &str = "application/pdf";
const MAX_CONCURRENT_UPLOADS: usize = 3;

/// Text fields of the public request form (Spanish field names, matching
/// the form and the table columns).
#[derive(Debug, Default)]
pub struct RequestForm {
    pub service: String,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub tipo_propiedad: Option<String>,
    pub direccion: Option<String>,
    pub localidad: Option<String>,
    pub mensaje: Option<String>,
    /// Selected system slugs, already parsed from the JSON text field
    pub sistemas: Vec<String>,
}

/// One uploaded invoice file.
pub struct InvoiceFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Handles quote request submissions end to end.
pub struct RequestService {
    db: Db,
    storage: StorageClient,
    mailer: Mailer,
}

impl RequestService {
    pub fn new(db: Db, storage: StorageClient, mailer: Mailer) -> Self {
        Self {
            db,
            storage,
            mailer,
        }
    }

    /// Validate, store and forward one quote request.
    pub async fn submit(&self, form: RequestForm, invoices: Vec<InvoiceFile>) -> Result<()> {
        validate_submission(&form, &invoices)?;

        let invoice_urls = self.upload_invoices(&invoices).await?;

        let request = ServiceRequest {
            id: None,
            service: form.service.trim().to_string(),
            nombre: form.nombre.trim().to_string(),
            email: form.email.trim().to_string(),
            telefono: form.telefono,
            tipo_propiedad: form.tipo_propiedad,
            direccion: form.direccion,
            localidad: form.localidad,
            mensaje: form.mensaje,
            invoice_urls,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let stored = self.db.insert_service_request(&request).await?;
        let request_id = stored
            .id
            .ok_or_else(|| AppError::Backend("service request missing id".to_string()))?;

        let sistemas = dedup_preserving_order(&form.sistemas);
        let joins: Vec<ServiceRequestService> = sistemas
            .iter()
            .map(|service_id| ServiceRequestService {
                request_id,
                service_id: service_id.clone(),
            })
            .collect();
        self.db.insert_request_services(&joins).await?;

        let attachments: Vec<EmailAttachment> = invoices
            .into_iter()
            .map(|file| EmailAttachment {
                content_type: file.content_type.unwrap_or_else(|| PDF_MIME.to_string()),
                file_name: file.file_name,
                bytes: file.bytes,
            })
            .collect();
        self.mailer
            .send_service_request(&stored, &sistemas, &attachments)
            .await?;

        tracing::info!(
            request_id,
            service = %stored.service,
            invoices = attachments.len(),
            "Service request submitted"
        );
        Ok(())
    }

    /// Upload invoices under a shared timestamp prefix and return their
    /// public URLs in submission order.
    async fn upload_invoices(&self, invoices: &[InvoiceFile]) -> Result<Vec<String>> {
        if invoices.is_empty() {
            return Ok(Vec::new());
        }

        let stamp = chrono::Utc::now().timestamp_millis();
        let uploads = invoices.iter().enumerate().map(|(i, file)| {
            let path = format!(
                "{}/{}-{}-{}",
                objects::REQUESTS_PREFIX,
                stamp,
                i,
                sanitize_file_name(&file.file_name)
            );
            async move {
                self.storage
                    .upload(
                        objects::USERS_BUCKET,
                        &path,
                        file.bytes.clone(),
                        file.content_type.as_deref().unwrap_or(PDF_MIME),
                        false,
                    )
                    .await?;
                Ok::<_, AppError>(self.storage.public_url(objects::USERS_BUCKET, &path))
            }
        });

        // Boxed to erase the `Buffered` type: rustc otherwise fails to
        // prove the handler future `Send` (rust-lang/rust#102211).
        stream::iter(uploads)
            .buffered(MAX_CONCURRENT_UPLOADS)
            .boxed()
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }
}

/// Local validation, before any backend call.
fn validate_submission(form: &RequestForm, invoices: &[InvoiceFile]) -> Result<()> {
    if form.service.trim().is_empty() {
        return Err(AppError::BadRequest("service is required".to_string()));
    }
    if form.nombre.trim().is_empty() {
        return Err(AppError::BadRequest("nombre is required".to_string()));
    }
    if form.email.trim().is_empty() {
        return Err(AppError::BadRequest("email is required".to_string()));
    }
    if !form.email.trim().validate_email() {
        return Err(AppError::BadRequest("email is not valid".to_string()));
    }
    if invoices.len() > MAX_INVOICES {
        return Err(AppError::BadRequest(format!(
            "at most {} invoice files are accepted",
            MAX_INVOICES
        )));
    }
    for file in invoices {
        let is_pdf = file
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with(PDF_MIME));
        if !is_pdf {
            return Err(AppError::BadRequest(
                "invoices must be PDF files".to_string(),
            ));
        }
    }
    Ok(())
}

/// Parse the `sistemas` text field (a JSON array of slugs).
///
/// The form sends `[]` when nothing is selected; anything unparsable is
/// treated the same way rather than failing the whole submission.
pub fn parse_sistemas(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(items) => items.into_iter().filter(|s| !s.trim().is_empty()).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed sistemas field");
            Vec::new()
        }
    }
}

/// Storage-safe rendition of a client-supplied file name.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .take(80)
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file.pdf".to_string()
    } else {
        cleaned
    }
}
