//! OpenAI-compatible model client built on the async-openai library

use crate::config::ResolvedModelConfig;
use crate::error::{ModelError, Result};
use crate::llm::{ConversationTurn, ModelClient, ModelReply, ToolCallRequest, TurnRole};
use crate::tools::ToolDescriptor;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;

/// Model client speaking the OpenAI chat-completions protocol
pub struct OpenAiModelClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiModelClient {
    /// Create a new client from resolved model configuration
    pub fn new(config: &ResolvedModelConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ModelError::Authentication {
                message: "No API key configured for the model provider".to_string(),
            }
            .into());
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if config.base_url != "https://api.openai.com" {
            openai_config = openai_config.with_api_base(&config.base_url);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        })
    }

    /// Convert conversation turns to the async-openai request format
    fn convert_turns(&self, turns: &[ConversationTurn]) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut converted = Vec::with_capacity(turns.len());

        for turn in turns {
            match turn.role {
                TurnRole::System => {
                    converted.push(ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage {
                            content: turn.content.clone().unwrap_or_default().into(),
                            name: None,
                        },
                    ));
                }
                TurnRole::User => {
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: turn.content.clone().unwrap_or_default().into(),
                            name: None,
                        },
                    ));
                }
                TurnRole::Assistant => {
                    let tool_calls: Vec<ChatCompletionMessageToolCall> = turn
                        .tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: async_openai::types::FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.to_string(),
                            },
                        })
                        .collect();

                    converted.push(ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: turn
                                .content
                                .clone()
                                .map(ChatCompletionRequestAssistantMessageContent::Text),
                            name: None,
                            tool_calls: if tool_calls.is_empty() {
                                None
                            } else {
                                Some(tool_calls)
                            },
                            audio: None,
                            refusal: None,
                            ..Default::default()
                        },
                    ));
                }
                TurnRole::Tool => {
                    let tool_call_id = turn.tool_call_id.clone().ok_or_else(|| {
                        ModelError::InvalidRequest {
                            message: "Tool turn without a tool_call_id".to_string(),
                        }
                    })?;
                    converted.push(ChatCompletionRequestMessage::Tool(
                        ChatCompletionRequestToolMessage {
                            content: ChatCompletionRequestToolMessageContent::Text(
                                turn.content.clone().unwrap_or_default(),
                            ),
                            tool_call_id,
                        },
                    ));
                }
            }
        }

        Ok(converted)
    }

    /// Convert catalog descriptors to the async-openai tool format
    fn convert_tools(&self, tools: &[ToolDescriptor]) -> Vec<ChatCompletionTool> {
        tools
            .iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.name.to_string(),
                    description: Some(tool.description.to_string()),
                    parameters: Some(tool.parameters.clone()),
                    strict: None,
                },
            })
            .collect()
    }

    /// Convert the provider response to a model reply
    fn convert_response(
        &self,
        response: async_openai::types::CreateChatCompletionResponse,
    ) -> Result<ModelReply> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or_else(|_| Value::String(call.function.arguments.clone()));
                ToolCallRequest {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                }
            })
            .collect::<Vec<_>>();

        Ok(ModelReply {
            content: choice.message.content,
            tool_calls,
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiModelClient {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        tools: &[ToolDescriptor],
    ) -> Result<ModelReply> {
        let messages = self.convert_turns(history)?;
        let tools = self.convert_tools(tools);

        tracing::debug!(
            turns = history.len(),
            tools = tools.len(),
            model = %self.model,
            "requesting chat completion"
        );

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(messages);
        if !tools.is_empty() {
            request_builder.tools(tools);
        }

        let request = request_builder
            .build()
            .map_err(|e| ModelError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            })?;

        let response =
            self.client.chat().create(request).await.map_err(|e| {
                tracing::error!("chat completion request failed: {}", e);
                ModelError::ApiError {
                    status: 500,
                    message: e.to_string(),
                }
            })?;

        let reply = self.convert_response(response)?;
        if reply.has_tool_calls() {
            for call in &reply.tool_calls {
                tracing::debug!(tool = %call.name, id = %call.id, "model requested tool call");
            }
        }

        Ok(reply)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
