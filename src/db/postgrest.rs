// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! PostgREST rows client with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (role + contact columns keyed by identity id)
//! - Providers (company data, exists iff role = provider)
//! - Provider-Services (join rows for the provider's offered services)
//! - Services (read-only bilingual catalog)
//! - Service requests (persisted quote requests + join rows)
//!
//! All requests run with the service-role key and address the `api`
//! schema through the PostgREST profile headers, both fixed at
//! construction time.

use crate::db::{tables, API_SCHEMA};
use crate::error::AppError;
use crate::models::{
    Profile, Provider, ProviderService, Service, ServiceRequest, ServiceRequestService,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Rows API client.
#[derive(Clone)]
pub struct Db {
    http: Option<reqwest::Client>,
    rest_url: String,
}

impl Db {
    /// Create a new rows client against the backend's REST endpoint.
    pub fn new(backend_url: &str, service_role_key: &str) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(service_role_key)
                .map_err(|e| AppError::Backend(format!("Invalid service role key: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", service_role_key))
                .map_err(|e| AppError::Backend(format!("Invalid service role key: {}", e)))?,
        );
        // PostgREST reads the schema from Accept-Profile on reads and
        // Content-Profile on writes.
        headers.insert("Accept-Profile", HeaderValue::from_static(API_SCHEMA));
        headers.insert("Content-Profile", HeaderValue::from_static(API_SCHEMA));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Backend(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http: Some(http),
            rest_url: format!("{}/rest/v1", backend_url),
        })
    }

    /// Create a mock rows client for testing (offline mode).
    ///
    /// All row operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            http: None,
            rest_url: String::new(),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&reqwest::Client, AppError> {
        self.http
            .as_ref()
            .ok_or_else(|| AppError::Backend("Backend not connected (offline mode)".to_string()))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    /// Turn a non-2xx response into a backend error carrying the body text.
    async fn expect_success(
        op: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Backend(format!("{}: HTTP {}: {}", op, status, body)))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by identity id. Absence is not an error.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let response = self
            .get_client()?
            .get(self.table_url(tables::PROFILES))
            .query(&[
                ("id", format!("eq.{}", user_id)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let rows: Vec<Profile> = Self::expect_success("get profile", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    /// Insert a new profile row.
    ///
    /// A duplicate-key failure here means another request created the row
    /// concurrently; callers treat that as benign via
    /// [`AppError::is_already_exists`].
    pub async fn insert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .post(self.table_url(tables::PROFILES))
            .header("Prefer", "return=minimal")
            .json(profile)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("insert profile", response).await?;
        Ok(())
    }

    /// Partially update a profile row (only the supplied fields change).
    pub async fn update_profile(
        &self,
        user_id: &str,
        patch: &serde_json::Value,
    ) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .patch(self.table_url(tables::PROFILES))
            .query(&[("id", format!("eq.{}", user_id))])
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("update profile", response).await?;
        Ok(())
    }

    /// Create or overwrite a profile row (merge on the primary key).
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .post(self.table_url(tables::PROFILES))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(profile)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("upsert profile", response).await?;
        Ok(())
    }

    // ─── Provider Operations ─────────────────────────────────────

    /// Get a provider row by owning identity id.
    pub async fn get_provider(&self, user_id: &str) -> Result<Option<Provider>, AppError> {
        let response = self
            .get_client()?
            .get(self.table_url(tables::PROVIDERS))
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let rows: Vec<Provider> = Self::expect_success("get provider", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    /// Create the provider row if it does not exist yet.
    ///
    /// Ignore-duplicates resolution keeps this an idempotent bootstrap:
    /// an existing row (with real company data) is never overwritten.
    pub async fn ensure_provider(&self, provider: &Provider) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .post(self.table_url(tables::PROVIDERS))
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(provider)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("ensure provider", response).await?;
        Ok(())
    }

    /// Create or overwrite the provider row (merge on `user_id`).
    pub async fn upsert_provider(&self, provider: &Provider) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .post(self.table_url(tables::PROVIDERS))
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(provider)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("upsert provider", response).await?;
        Ok(())
    }

    /// Delete the provider row (role downgrade cleanup).
    pub async fn delete_provider(&self, user_id: &str) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .delete(self.table_url(tables::PROVIDERS))
            .query(&[("user_id", format!("eq.{}", user_id))])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("delete provider", response).await?;
        Ok(())
    }

    // ─── Provider-Service Join Operations ────────────────────────

    /// Get the provider's currently offered service ids.
    pub async fn get_provider_services(
        &self,
        provider_id: &str,
    ) -> Result<Vec<ProviderService>, AppError> {
        let response = self
            .get_client()?
            .get(self.table_url(tables::PROVIDER_SERVICES))
            .query(&[
                ("provider_id", format!("eq.{}", provider_id)),
                ("select", "*".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        Self::expect_success("get provider services", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))
    }

    /// Atomically replace the provider's service associations.
    ///
    /// Calls the `replace_provider_services` database function, which
    /// deletes all rows for the provider and inserts the supplied set in
    /// one transaction. An empty set leaves zero rows.
    pub async fn replace_provider_services(
        &self,
        provider_id: &str,
        service_ids: &[String],
    ) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .post(format!("{}/rpc/replace_provider_services", self.rest_url))
            .json(&serde_json::json!({
                "p_provider_id": provider_id,
                "p_service_ids": service_ids,
            }))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("replace provider services", response).await?;
        Ok(())
    }

    /// Delete all service associations for a provider (downgrade cleanup).
    pub async fn delete_provider_services(&self, provider_id: &str) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .delete(self.table_url(tables::PROVIDER_SERVICES))
            .query(&[("provider_id", format!("eq.{}", provider_id))])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("delete provider services", response).await?;
        Ok(())
    }

    // ─── Service Catalog ─────────────────────────────────────────

    /// List the full bilingual service catalog, ordered by id.
    pub async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        let response = self
            .get_client()?
            .get(self.table_url(tables::SERVICES))
            .query(&[("select", "*"), ("order", "id.asc")])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        Self::expect_success("list services", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))
    }

    // ─── Service Request Operations ──────────────────────────────

    /// Insert a quote request and return the stored row (with its id).
    pub async fn insert_service_request(
        &self,
        request: &ServiceRequest,
    ) -> Result<ServiceRequest, AppError> {
        let response = self
            .get_client()?
            .post(self.table_url(tables::SERVICE_REQUESTS))
            .header("Prefer", "return=representation")
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let rows: Vec<ServiceRequest> = Self::expect_success("insert service request", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Backend("insert service request: empty result".to_string()))
    }

    /// Insert the join rows linking a request to its selected services.
    pub async fn insert_request_services(
        &self,
        rows: &[ServiceRequestService],
    ) -> Result<(), AppError> {
        if rows.is_empty() {
            return Ok(());
        }
        let response = self
            .get_client()?
            .post(self.table_url(tables::SERVICE_REQUEST_SERVICES))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Self::expect_success("insert request services", response).await?;
        Ok(())
    }
}
