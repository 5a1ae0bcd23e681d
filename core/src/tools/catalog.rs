//! Static tool catalog advertised to the model
//!
//! The catalog is data-driven and immutable for the process lifetime:
//! changing it means a new deployment, not runtime mutation. All tools are
//! always advertised; authorization is enforced by handlers at dispatch
//! time, not by filtering the catalog.

use serde::Serialize;
use serde_json::{json, Value};

/// Canonical tool names
pub mod names {
    pub const CREATE_NOTE: &str = "create_note";
    pub const UPDATE_NOTE: &str = "update_note";
    pub const WEB_SEARCH: &str = "web_search";
    pub const GET_WEATHER: &str = "get_weather";
    pub const EXTRACT_ENTITIES: &str = "extract_entities";
    pub const ANALYZE_NOTES: &str = "analyze_notes";
    pub const WORKSPACE_SEARCH: &str = "workspace_search";
    pub const WORKSPACE_READ_PAGE: &str = "workspace_read_page";
    pub const WORKSPACE_CREATE_PAGE: &str = "workspace_create_page";
    pub const WORKSPACE_APPEND_PAGE: &str = "workspace_append_page";
    pub const WORKSPACE_LIST_DATABASES: &str = "workspace_list_databases";
}

/// Descriptor for one tool: globally unique name, description, and a
/// JSON-schema-like parameter object
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Globally unique tool name
    pub name: &'static str,

    /// Human/model readable description
    pub description: &'static str,

    /// Parameter schema (`type` / `properties` / `required`)
    pub parameters: Value,
}

/// The full, order-stable tool catalog. Returns every tool on every call;
/// there is no context-dependent filtering.
pub fn catalog() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: names::CREATE_NOTE,
            description: "Create a new note for the current user with the given content.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "HTML content of the new note"
                    }
                },
                "required": ["content"]
            }),
        },
        ToolDescriptor {
            name: names::UPDATE_NOTE,
            description: "Update the user's current note. Append adds the content after the \
                          existing text; replace discards the existing text entirely.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "HTML content to write into the note"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["append", "replace"],
                        "description": "How to apply the content (default: append)"
                    },
                    "note_id": {
                        "type": "string",
                        "description": "Id of the note to update; defaults to the note currently open"
                    }
                },
                "required": ["content"]
            }),
        },
        ToolDescriptor {
            name: names::WEB_SEARCH,
            description: "Search the web and return the top results with titles, URLs and snippets.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDescriptor {
            name: names::GET_WEATHER,
            description: "Get the current weather for a location.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "City or place name, e.g. 'Paris'"
                    }
                },
                "required": ["location"]
            }),
        },
        ToolDescriptor {
            name: names::EXTRACT_ENTITIES,
            description: "Extract named entities (people, places, organizations, dates) from \
                          text. When no text is given, the user's notes are analyzed.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Text to extract entities from; defaults to the user's notes"
                    }
                },
                "required": []
            }),
        },
        ToolDescriptor {
            name: names::ANALYZE_NOTES,
            description: "Answer an analytical question over the user's full note collection \
                          (themes, statistics, summaries).",
            parameters: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "What to analyze or summarize"
                    }
                },
                "required": []
            }),
        },
        ToolDescriptor {
            name: names::WORKSPACE_SEARCH,
            description: "Search pages in the user's connected workspace.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDescriptor {
            name: names::WORKSPACE_READ_PAGE,
            description: "Read the content of a workspace page by id.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "page_id": {
                        "type": "string",
                        "description": "Id of the page to read"
                    }
                },
                "required": ["page_id"]
            }),
        },
        ToolDescriptor {
            name: names::WORKSPACE_CREATE_PAGE,
            description: "Create a new page in a workspace database.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "database_id": {
                        "type": "string",
                        "description": "Database to create the page in"
                    },
                    "title": {
                        "type": "string",
                        "description": "Page title"
                    },
                    "content": {
                        "type": "string",
                        "description": "Page body"
                    }
                },
                "required": ["database_id", "title", "content"]
            }),
        },
        ToolDescriptor {
            name: names::WORKSPACE_APPEND_PAGE,
            description: "Append content to an existing workspace page.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "page_id": {
                        "type": "string",
                        "description": "Id of the page to append to"
                    },
                    "content": {
                        "type": "string",
                        "description": "Content to append"
                    }
                },
                "required": ["page_id", "content"]
            }),
        },
        ToolDescriptor {
            name: names::WORKSPACE_LIST_DATABASES,
            description: "List the databases available in the user's connected workspace.",
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ]
}

/// Look up a descriptor by name
pub fn descriptor_for(name: &str) -> Option<ToolDescriptor> {
    catalog().into_iter().find(|tool| tool.name == name)
}
