// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Quote request rows persisted from the public request form.

use serde::{Deserialize, Serialize};

/// Row in the `service_requests` table.
///
/// Field names follow the public form (Spanish), which is also the column
/// naming in the backend schema. `id` is assigned by the database; inserts
/// omit it and read it back from the returned representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// Database-assigned id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Requested service slug
    pub service: String,
    /// Requester name
    pub nombre: String,
    /// Contact email
    pub email: String,
    /// Contact phone (free-form, optional)
    pub telefono: Option<String>,
    /// Property type (piso, chalet, local, ...)
    pub tipo_propiedad: Option<String>,
    /// Street address
    pub direccion: Option<String>,
    /// Town/locality
    pub localidad: Option<String>,
    /// Free-form message
    pub mensaje: Option<String>,
    /// Public URLs of the uploaded invoice PDFs
    #[serde(default)]
    pub invoice_urls: Vec<String>,
    /// Submission timestamp (ISO 8601)
    pub created_at: String,
}

/// Join record in the `service_request_services` table, one per system the
/// requester selected (`sistemas` form field).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequestService {
    /// Parent request id
    pub request_id: i64,
    /// Catalog service slug
    pub service_id: String,
}
