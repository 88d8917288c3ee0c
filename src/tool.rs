//! Tool system: the agent-facing interface to HPO lookups.
//!
//! An orchestrating agent sees each tool through its [`ToolSignature`] (usually
//! rendered into its prompt with [`ToolSignature::render_prompt`]) and calls it
//! by name through a [`ToolRegistry`].

use std::collections::HashMap;

use crate::error::{HpoResult, ToolError};
use crate::lookup::HpoLookup;
use crate::resolve::ResultMapping;

/// Description of a tool's interface.
#[derive(Debug, Clone)]
pub struct ToolSignature {
    /// Unique name of the tool.
    pub name: String,
    /// What this tool does.
    pub description: String,
    /// Parameters the tool accepts.
    pub parameters: Vec<ToolParam>,
    /// Type of the value the tool returns (`string` or `object`).
    pub output_type: String,
    /// What the returned value contains.
    pub output_description: String,
}

impl ToolSignature {
    /// Plain-text block describing the tool for inclusion in an agent prompt.
    pub fn render_prompt(&self) -> String {
        let inputs = self
            .parameters
            .iter()
            .map(|p| {
                let req = if p.required { "required" } else { "optional" };
                format!("  - {} (string, {req}): {}", p.name, p.description)
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Tool name: {}\nDescription: {}\nInputs:\n{}\nOutputs: {} ({})\n",
            self.name, self.description, inputs, self.output_type, self.output_description
        )
    }
}

/// A single parameter in a tool's signature.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Input to a tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolInput {
    /// Named parameters.
    pub params: HashMap<String, String>,
}

impl ToolInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// Get a required parameter, returning an error if missing.
    pub fn require(&self, name: &str, tool_name: &str) -> HpoResult<&str> {
        self.get(name).ok_or_else(|| {
            ToolError::MissingParam {
                tool_name: tool_name.into(),
                param: name.into(),
            }
            .into()
        })
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Whether the tool produced a usable answer.
    pub success: bool,
    /// Text handed back to the agent: an identifier, the sentinel, or a JSON object.
    pub result: String,
    /// The structured mapping, for batch calls.
    pub mapping: Option<ResultMapping>,
}

impl ToolOutput {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: result.into(),
            mapping: None,
        }
    }

    pub fn ok_with_mapping(result: impl Into<String>, mapping: ResultMapping) -> Self {
        Self {
            success: true,
            result: result.into(),
            mapping: Some(mapping),
        }
    }

    pub fn err(result: impl Into<String>) -> Self {
        Self {
            success: false,
            result: result.into(),
            mapping: None,
        }
    }
}

/// A tool the agent can execute.
pub trait Tool: Send + Sync {
    /// Describe this tool's interface.
    fn signature(&self) -> ToolSignature;

    /// Execute the tool with the given input.
    fn execute(&self, lookup: &HpoLookup, input: ToolInput) -> HpoResult<ToolOutput>;
}

/// How [`HpoLookupTool`] interprets its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// The whole query is one term; returns one identifier or the sentinel.
    Term,
    /// The query is a comma/semicolon separated list; returns a mapping.
    Batch,
}

impl std::str::FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "term" | "single" => Ok(LookupMode::Term),
            "batch" | "list" => Ok(LookupMode::Batch),
            other => Err(format!("unknown mode \"{other}\", use 'term' or 'batch'")),
        }
    }
}

/// Look up clinical strings in the HPO document.
pub struct HpoLookupTool;

impl HpoLookupTool {
    pub const NAME: &'static str = "hpo_lookup";
}

impl Tool for HpoLookupTool {
    fn signature(&self) -> ToolSignature {
        ToolSignature {
            name: Self::NAME.into(),
            description: "Given a clinical string, look up its HPO mappings by exact label or \
                          synonym. Always use this tool for HPO lookups."
                .into(),
            parameters: vec![
                ToolParam {
                    name: "query".into(),
                    description: "The clinical term, or a comma/semicolon separated list of \
                                  terms, to look up."
                        .into(),
                    required: true,
                },
                ToolParam {
                    name: "mode".into(),
                    description: "'batch' (default) returns a term -> id mapping; 'term' \
                                  treats the query as one term and returns one id."
                        .into(),
                    required: false,
                },
            ],
            output_type: "object".into(),
            output_description: "Clinical terms mapped to HPO ids, or \"No mapping found\"."
                .into(),
        }
    }

    fn execute(&self, lookup: &HpoLookup, input: ToolInput) -> HpoResult<ToolOutput> {
        let query = input.require("query", Self::NAME)?;
        let mode = match input.get("mode") {
            Some(raw) => raw.parse().map_err(|message| ToolError::InvalidParam {
                tool_name: Self::NAME.into(),
                param: "mode".into(),
                message,
            })?,
            None => LookupMode::Batch,
        };

        match mode {
            LookupMode::Term => {
                let outcome = lookup.lookup(query)?;
                Ok(ToolOutput {
                    success: outcome.is_found(),
                    result: outcome.as_output().to_string(),
                    mapping: None,
                })
            }
            LookupMode::Batch => {
                let mapping = lookup.resolve(query)?;
                if mapping.is_empty() {
                    return Ok(ToolOutput::err(
                        "No terms found in query. Separate terms with commas or semicolons.",
                    ));
                }
                let json = mapping.to_json_pretty()?;
                Ok(ToolOutput::ok_with_mapping(json, mapping))
            }
        }
    }
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry holding every built-in tool.
    pub fn with_builtin() -> Self {
        let mut reg = Self::new();
        reg.register(Box::new(HpoLookupTool));
        reg
    }

    /// Register a tool. If a tool with the same name exists, it is replaced.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let sig = tool.signature();
        self.tools.insert(sig.name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|b| b.as_ref())
    }

    /// All registered tool signatures, sorted by name.
    pub fn list(&self) -> Vec<ToolSignature> {
        let mut sigs: Vec<ToolSignature> = self.tools.values().map(|t| t.signature()).collect();
        sigs.sort_by(|a, b| a.name.cmp(&b.name));
        sigs
    }

    /// Execute a tool by name.
    pub fn execute(
        &self,
        name: &str,
        input: ToolInput,
        lookup: &HpoLookup,
    ) -> HpoResult<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound { name: name.into() })?;
        tool.execute(lookup, input)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}
