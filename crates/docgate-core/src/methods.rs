// docgate-core/src/methods.rs
// ============================================================================
// Module: Method Identifiers
// Description: Canonical RPC method identifiers for the Docgate gateway.
// Purpose: Shared method naming across dispatch, capability discovery, clients.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The supported RPC methods form a closed set. Dispatch matches inbound
//! method strings against [`RpcMethod`] so unknown methods are confined to a
//! single `MethodNotFound` runtime path; everywhere else the set is checked
//! exhaustively at compile time. These names are part of the external
//! contract surface.

use serde::Deserialize;
use serde::Serialize;

/// Canonical method names for the Docgate RPC gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcMethod {
    /// Liveness probe returning a server timestamp.
    Ping,
    /// Capability discovery descriptor.
    Info,
    /// List the known project slugs.
    ListProjects,
    /// List documents belonging to one project.
    ListDocs,
    /// Upsert a document by `(project, slug)` identity.
    WriteDoc,
}

impl RpcMethod {
    /// Returns the canonical string name for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Info => "info",
            Self::ListProjects => "list_projects",
            Self::ListDocs => "list_docs",
            Self::WriteDoc => "write_doc",
        }
    }

    /// Returns all gateway methods in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Ping, Self::Info, Self::ListProjects, Self::ListDocs, Self::WriteDoc]
    }

    /// Parses a method name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ping" => Some(Self::Ping),
            "info" => Some(Self::Info),
            "list_projects" => Some(Self::ListProjects),
            "list_docs" => Some(Self::ListDocs),
            "write_doc" => Some(Self::WriteDoc),
            _ => None,
        }
    }
}

/// Static capability descriptor returned by the `info` method.
///
/// Clients use this to self-configure rather than hard-code the method set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
    /// Port the WebSocket listener is bound to.
    pub ws_port: u16,
    /// Supported method names in canonical order.
    pub capabilities: Vec<String>,
}

impl ServerDescriptor {
    /// Builds a descriptor advertising every method in [`RpcMethod::all`].
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, ws_port: u16) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ws_port,
            capabilities: RpcMethod::all().iter().map(|method| method.as_str().to_string()).collect(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
