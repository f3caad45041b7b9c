//! Request descriptions handed to the transport

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;

use crate::error::{Result, WorkbrewError};
use crate::query::QueryBuilder;

/// How the response body will be consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Decoded as JSON; a non-JSON content type is rejected
    #[default]
    Json,
    /// Returned as raw bytes (CSV exports)
    Raw,
}

/// Request payload
///
/// Every variant owns its data so the request can be rebuilt for retries.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Pre-serialized JSON
    Json(Bytes),
    /// `application/x-www-form-urlencoded` fields
    Form(Vec<(String, String)>),
    /// `multipart/form-data` upload
    Multipart(MultipartUpload),
}

/// One file inside a multipart upload
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content: Bytes,
    /// Defaults to `application/octet-stream`
    pub mime: Option<String>,
}

/// Text fields and files of a multipart upload
#[derive(Debug, Clone, Default)]
pub struct MultipartUpload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
        mime: Option<&str>,
    ) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            content: content.into(),
            mime: mime.map(str::to_string),
        });
        self
    }

    /// Build a fresh reqwest form for one attempt
    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let mime = file.mime.as_deref().unwrap_or("application/octet-stream");
            let part = Part::bytes(file.content.to_vec())
                .file_name(file.file_name.clone())
                .mime_str(mime)
                .map_err(|_| {
                    WorkbrewError::InvalidHeader(format!(
                        "invalid content type '{mime}' for file '{}'",
                        file.file_name
                    ))
                })?;
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

/// A request relative to the workspace URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below `/workspaces/{workspace}`, starting with `/`
    pub endpoint: String,
    pub query: QueryBuilder,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub format: ResponseFormat,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: QueryBuilder::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            format: ResponseFormat::Json,
        }
    }

    pub fn with_query(mut self, query: QueryBuilder) -> Self {
        self.query = query;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: &[(&str, &str)]) -> Self {
        self.headers
            .extend(headers.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    /// Serialize `body` as the JSON payload
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let encoded = serde_json::to_vec(body).map_err(|source| WorkbrewError::Serialization {
            method: self.method.clone(),
            endpoint: self.endpoint.clone(),
            source,
            response: None,
        })?;
        self.body = RequestBody::Json(Bytes::from(encoded));
        Ok(self)
    }

    pub fn with_form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_multipart(mut self, upload: MultipartUpload) -> Self {
        self.body = RequestBody::Multipart(upload);
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }
}
