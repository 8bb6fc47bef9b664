//! Render endpoint request handling
//!
//! Order of checks: shared secret, method, render type, per-mode parameters.
//! Only after all of them pass does the request reach the render pipeline.

use super::http::{HttpRequest, HttpResponse};
use super::ServiceError;
use crate::app::RenderApp;
use crate::world::{Attributes, RenderJob, RenderType};
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Header carrying the shared secret.
pub const ACCESS_KEY_HEADER: &str = "Aeo-Access-Key";

/// Names the render type selector may arrive under, in lookup order.
const RENDER_TYPE_KEYS: [&str; 2] = ["RenderType", "renderType"];

/// Query parameters with JSON body fields as a fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    query: HashMap<String, String>,
    body: HashMap<String, String>,
}

impl RequestParams {
    pub fn from_request(request: &HttpRequest) -> Self {
        Self {
            query: request.query_params(),
            body: request.json_fields(),
        }
    }

    fn non_empty<'a>(map: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
        map.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }

    /// `RenderType`/`renderType` from the query, then the same names from
    /// the body.
    pub fn render_type(&self) -> Option<&str> {
        RENDER_TYPE_KEYS
            .iter()
            .find_map(|key| Self::non_empty(&self.query, key))
            .or_else(|| RENDER_TYPE_KEYS.iter().find_map(|key| Self::non_empty(&self.body, key)))
    }

    /// Flat attributes: every non-empty query value, plus body fields the
    /// query left empty or missing.
    pub fn attributes(&self) -> Attributes {
        let mut attributes = self.query.clone();
        for (key, value) in &self.body {
            let missing = attributes.get(key).map_or(true, |current| current.is_empty());
            if missing {
                attributes.insert(key.clone(), value.clone());
            }
        }
        attributes
    }
}

/// Handle one request end to end and build its response.
pub async fn handle(app: &RenderApp, request: &HttpRequest) -> HttpResponse {
    match dispatch(app, request).await {
        Ok(()) => HttpResponse::rendered(),
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                error!("{} {} failed: {}", request.method, request.target, err);
            } else {
                warn!("{} {} rejected: {}", request.method, request.target, err);
            }
            HttpResponse::error(status, &err.public_message())
        }
    }
}

async fn dispatch(app: &RenderApp, request: &HttpRequest) -> Result<(), ServiceError> {
    authorize(app.access_key(), request)?;
    check_method(request)?;

    let params = RequestParams::from_request(request);
    let render_type = select_render_type(&params)?;
    let job = RenderJob::from_attributes(render_type, &params.attributes())?;
    info!("Running render type {} for {}", render_type.as_str(), job.output);

    app.render(&job).await?;
    Ok(())
}

/// With a configured secret the header must match exactly; without one the
/// check is skipped.
pub fn authorize(expected: Option<&str>, request: &HttpRequest) -> Result<(), ServiceError> {
    match expected {
        Some(key) if request.header(ACCESS_KEY_HEADER) != Some(key) => Err(ServiceError::Unauthorized),
        _ => Ok(()),
    }
}

pub fn check_method(request: &HttpRequest) -> Result<(), ServiceError> {
    match request.method.as_str() {
        "GET" | "POST" => Ok(()),
        _ => Err(ServiceError::MethodNotAllowed),
    }
}

pub fn select_render_type(params: &RequestParams) -> Result<RenderType, ServiceError> {
    let raw = params.render_type().unwrap_or_default();
    RenderType::parse(raw).ok_or_else(|| ServiceError::InvalidRenderType(raw.to_string()))
}
