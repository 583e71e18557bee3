// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Outbound notification email.
//!
//! Quote requests are forwarded to the intake mailbox with the uploaded
//! invoice PDFs and the PRESU logo attached. The no-op variant keeps
//! tests and local development off the network.

use crate::config::Config;
use crate::error::AppError;
use crate::models::ServiceRequest;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static LOGO_PNG: &[u8] = include_bytes!("../../assets/logo.png");

/// File attached to the notification email.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Notification mailer.
#[derive(Clone)]
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
        to: Mailbox,
    },
    /// Counts sends without touching the network.
    Noop { sent: Arc<AtomicUsize> },
}

impl Mailer {
    /// Build the SMTP mailer from configuration (STARTTLS relay).
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let credentials =
            Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Mail(format!("Failed to create SMTP transport: {}", e)))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        let from: Mailbox = config
            .smtp_from
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid sender address: {}", e)))?;
        let to: Mailbox = config
            .notify_email
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid notification address: {}", e)))?;

        tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP mailer configured");

        Ok(Self::Smtp {
            transport,
            from,
            to,
        })
    }

    /// Mailer that records sends instead of delivering them.
    pub fn new_noop() -> Self {
        Self::Noop {
            sent: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of sends recorded by the no-op variant.
    pub fn sent_count(&self) -> usize {
        match self {
            Mailer::Smtp { .. } => 0,
            Mailer::Noop { sent } => sent.load(Ordering::Relaxed),
        }
    }

    /// Send the intake notification for a new quote request.
    pub async fn send_service_request(
        &self,
        request: &ServiceRequest,
        sistemas: &[String],
        attachments: &[EmailAttachment],
    ) -> Result<(), AppError> {
        match self {
            Mailer::Noop { sent } => {
                sent.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    service = %request.service,
                    attachments = attachments.len(),
                    "Skipping notification email (noop mailer)"
                );
                Ok(())
            }
            Mailer::Smtp {
                transport,
                from,
                to,
            } => {
                let mut builder = Message::builder()
                    .from(from.clone())
                    .to(to.clone())
                    .subject(format!("Nueva solicitud de presupuesto: {}", request.service));
                // Replying reaches the requester directly.
                if let Ok(reply_to) = request.email.parse::<Mailbox>() {
                    builder = builder.reply_to(reply_to);
                }

                let mut multipart =
                    MultiPart::mixed().singlepart(SinglePart::plain(render_body(request, sistemas)));
                for attachment in attachments {
                    let content_type = ContentType::parse(&attachment.content_type)
                        .map_err(|e| AppError::Mail(format!("Invalid attachment type: {}", e)))?;
                    multipart = multipart.singlepart(
                        Attachment::new(attachment.file_name.clone())
                            .body(Body::new(attachment.bytes.clone()), content_type),
                    );
                }
                let logo_type = ContentType::parse("image/png")
                    .map_err(|e| AppError::Mail(e.to_string()))?;
                multipart = multipart.singlepart(
                    Attachment::new("presu-logo.png".to_string())
                        .body(Body::new(LOGO_PNG.to_vec()), logo_type),
                );

                let email = builder
                    .multipart(multipart)
                    .map_err(|e| AppError::Mail(format!("Failed to build email: {}", e)))?;

                transport
                    .send(email)
                    .await
                    .map_err(|e| AppError::Mail(format!("Failed to send email: {}", e)))?;

                tracing::info!(
                    service = %request.service,
                    attachments = attachments.len(),
                    "Notification email sent"
                );
                Ok(())
            }
        }
    }
}

/// Plain-text body of the intake notification.
fn render_body(request: &ServiceRequest, sistemas: &[String]) -> String {
    fn line(label: &str, value: &Option<String>) -> String {
        match value {
            Some(v) if !v.is_empty() => format!("{}: {}\n", label, v),
            _ => String::new(),
        }
    }

    let mut body = String::new();
    body.push_str("Nueva solicitud de presupuesto\n");
    body.push_str("==============================\n\n");
    body.push_str(&format!("Servicio: {}\n", request.service));
    body.push_str(&format!("Nombre: {}\n", request.nombre));
    body.push_str(&format!("Email: {}\n", request.email));
    body.push_str(&line("Teléfono", &request.telefono));
    body.push_str(&line("Tipo de propiedad", &request.tipo_propiedad));
    body.push_str(&line("Dirección", &request.direccion));
    body.push_str(&line("Localidad", &request.localidad));
    if !sistemas.is_empty() {
        body.push_str(&format!("Sistemas: {}\n", sistemas.join(", ")));
    }
    body.push_str(&line("Mensaje", &request.mensaje));
    if !request.invoice_urls.is_empty() {
        body.push_str("\nFacturas adjuntas:\n");
        for url in &request.invoice_urls {
            body.push_str(&format!("  - {}\n", url));
        }
    }
    body.push_str(&format!("\nRecibida: {}\n", request.created_at));
    body
}
