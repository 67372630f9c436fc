//! Prompt text for netlist review.
//!
//! The prompt is split into a fixed system instruction, a user instruction,
//! and the design context (netlist, optionally schematic source). Providers
//! that take a flat user string concatenate instruction and context;
//! providers with typed content blocks keep the context in its own block so
//! it can carry a cache hint.

pub const SYSTEM_PROMPT: &str = "\
You are an expert electrical engineer and PCB designer with extensive experience in analyzing KiCad netlists.
You are meticulous and detail-oriented, ensuring that every aspect of the netlist is thoroughly examined for potential issues and improvements.";

const NETLIST_INSTRUCTION: &str = "\
Given the following KiCad netlist, identify potential issues and suggest improvements.
Focus on the schematic only, ignore everything related to PCB layout, including footprint assignments.
Respond with a JSON object containing a \"findings\" list, where each finding includes:
- id: A unique identifier for the finding (integer).
- level: The severity level of the finding (one of: Fatal, Major, Minor, Best Practice, Nice To Have).
- description: A brief description of the finding.
- recommendation: A suggested action to address the finding.
- reference: reference to a component";

const SCHEMATIC_INSTRUCTION: &str = "\
Given the following KiCad schematic source and its exported netlist, identify potential issues and suggest improvements.
Use the schematic source for context such as labels, sheet structure, and component values; use the netlist for connectivity.
Focus on the schematic only, ignore everything related to PCB layout, including footprint assignments.
Respond with a JSON object containing a \"findings\" list, where each finding includes:
- id: A unique identifier for the finding (integer).
- level: The severity level of the finding (one of: Fatal, Major, Minor, Best Practice, Nice To Have).
- description: A brief description of the finding.
- recommendation: A suggested action to address the finding.
- reference: reference to a component";

/// Two-part analysis prompt: instruction plus design context.
#[derive(Debug, Clone)]
pub struct AnalysisPrompt {
    pub system: &'static str,
    pub instruction: &'static str,
    pub context: String,
}

impl AnalysisPrompt {
    /// Flat user message for providers that take a single string.
    pub fn user_text(&self) -> String {
        format!("{}\n\n{}", self.instruction, self.context)
    }
}

pub fn netlist_prompt(netlist: &str) -> AnalysisPrompt {
    AnalysisPrompt {
        system: SYSTEM_PROMPT,
        instruction: NETLIST_INSTRUCTION,
        context: format!("<netlist>\n{}\n</netlist>", netlist),
    }
}

pub fn schematic_and_netlist_prompt(netlist: &str, schematic: &str) -> AnalysisPrompt {
    AnalysisPrompt {
        system: SYSTEM_PROMPT,
        instruction: SCHEMATIC_INSTRUCTION,
        context: format!(
            "<schematic>\n{}\n</schematic>\n\n<netlist>\n{}\n</netlist>",
            schematic, netlist
        ),
    }
}
