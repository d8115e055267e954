//! Completing the registry with results from a highlighting service.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::{Error, Result, ServiceError};
use crate::registry::Registry;

/// One block as sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightRequest {
    pub id: String,
    pub code: String,
    pub language: Option<String>,
    pub theme: Option<String>,
}

impl From<&Block> for HighlightRequest {
    fn from(block: &Block) -> Self {
        Self {
            id: block.id.clone(),
            code: block.code.clone(),
            language: block.language.clone(),
            theme: block.theme.clone(),
        }
    }
}

/// The service's answer for one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightResponse {
    pub id: String,
    pub highlighted: String,
    pub classes: String,
    pub styles: String,
    pub attrs: IndexMap<String, String>,
}

/// Something that turns code into highlighted markup, usually over the network.
pub trait HighlightService {
    /// Highlight a batch. Responses may come back in any order but must cover every request.
    fn highlight(
        &mut self,
        requests: &[HighlightRequest],
    ) -> std::result::Result<Vec<HighlightResponse>, ServiceError>;
}

/// Send every unhighlighted block (clones included) in one batch and store the results.
///
/// Returns the number of blocks sent.
pub fn highlight_registry(
    registry: &mut Registry,
    service: &mut dyn HighlightService,
) -> Result<usize> {
    let requests: Vec<HighlightRequest> = registry
        .unhighlighted()
        .map(HighlightRequest::from)
        .collect();

    if requests.is_empty() {
        tracing::debug!("nothing to highlight");
        return Ok(0);
    }

    tracing::info!(blocks = requests.len(), "requesting highlighting");
    let responses = service.highlight(&requests).map_err(Error::Service)?;
    let mut responses: HashMap<String, HighlightResponse> = responses
        .into_iter()
        .map(|response| (response.id.clone(), response))
        .collect();

    for block in registry.all_mut() {
        fill(block, &mut responses)?;
        for clone in &mut block.clones {
            fill(clone, &mut responses)?;
        }
    }

    for id in responses.keys() {
        tracing::warn!(id = %id, "service answered for a block that was not requested");
    }

    Ok(requests.len())
}

fn fill(block: &mut Block, responses: &mut HashMap<String, HighlightResponse>) -> Result<()> {
    if block.is_highlighted() {
        return Ok(());
    }
    let response = responses
        .remove(&block.id)
        .ok_or_else(|| Error::MissingHighlight {
            id: block.id.clone(),
        })?;
    apply(block, response);
    Ok(())
}

fn apply(block: &mut Block, response: HighlightResponse) {
    block.highlighted = response.highlighted;
    block.classes = response.classes;
    block.styles = response.styles;
    block.attrs = response.attrs;
}
