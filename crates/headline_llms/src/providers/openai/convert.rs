//! Conversion between unified types and OpenAI-compatible wire types

use super::types::{OpenAIError, OpenAIMessage, OpenAIRequest, OpenAIResponse};
use crate::error::{Error, Result};
use crate::types::{FinishReason, FinishReasonKind, GenerateRequest, GenerateResponse, Message, Usage};

/// Convert unified request to the wire request
pub fn to_openai_request(req: &GenerateRequest, stream: bool) -> OpenAIRequest {
    OpenAIRequest {
        model: req.model.clone(),
        messages: req.messages.iter().map(to_openai_message).collect(),
        stream: stream.then_some(true),
        temperature: req.options.temperature,
        max_tokens: req.options.max_tokens,
    }
}

fn to_openai_message(msg: &Message) -> OpenAIMessage {
    OpenAIMessage {
        role: msg.role.as_str().to_string(),
        content: Some(msg.content.clone()),
        reasoning_content: None,
    }
}

/// Convert a full (non-streamed) response
pub fn from_openai_response(resp: OpenAIResponse) -> Result<GenerateResponse> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::invalid_response("response contained no choices"))?;

    let finish_reason = choice
        .finish_reason
        .as_deref()
        .map(FinishReason::parse)
        .unwrap_or_else(|| FinishReason::new(FinishReasonKind::Other));

    let usage = resp
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(GenerateResponse {
        id: resp.id,
        model: resp.model,
        text: choice.message.content.unwrap_or_default(),
        reasoning: choice.message.reasoning_content,
        usage,
        finish_reason,
    })
}

/// Human-readable form of an error object embedded in a response
pub fn describe_error(error: &OpenAIError) -> String {
    let mut out = String::new();
    if let Some(kind) = &error.type_ {
        out.push_str(kind);
        out.push_str(": ");
    }
    out.push_str(&error.message);
    if let Some(code) = &error.code {
        out.push_str(&format!(" (code {})", code));
    }
    out
}
