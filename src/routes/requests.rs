// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Public quote request route.

use crate::error::{AppError, Result};
use crate::services::requests::{parse_sistemas, InvoiceFile, RequestForm};
use crate::AppState;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::{routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Three PDFs plus form text; invoices are rarely more than a few MB.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/request-service", post(request_service))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RequestServiceResponse {
    pub ok: bool,
}

/// Accept a quote request from the public form (multipart).
async fn request_service(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<RequestServiceResponse>> {
    let mut form = RequestForm::default();
    let mut invoices: Vec<InvoiceFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "service" => form.service = text(field).await?,
            "nombre" => form.nombre = text(field).await?,
            "email" => form.email = text(field).await?,
            "telefono" => form.telefono = optional(text(field).await?),
            "tipoPropiedad" => form.tipo_propiedad = optional(text(field).await?),
            "direccion" => form.direccion = optional(text(field).await?),
            "localidad" => form.localidad = optional(text(field).await?),
            "mensaje" => form.mensaje = optional(text(field).await?),
            "sistemas" => form.sistemas = parse_sistemas(&text(field).await?),
            "invoices" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("factura.pdf")
                    .to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid invoice upload: {}", e)))?;
                invoices.push(InvoiceFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            // Unknown fields are ignored so the form can evolve.
            _ => {}
        }
    }

    state.requests.submit(form, invoices).await?;

    Ok(Json(RequestServiceResponse { ok: true }))
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid form field: {}", e)))
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
