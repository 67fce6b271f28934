//! Fix request prompt construction.

use crate::clients::{GenerateOptions, ResponseFormat};
use crate::codebase::Codebase;

/// Sampling temperature for fix requests. Low, because the response must
/// follow the JSON schema rather than be creative.
pub const FIX_TEMPERATURE: f32 = 0.1;

/// Output token cap for fix requests, sized for multi-file responses.
pub const FIX_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Marker opening one file block in the serialized codebase.
const FILE_START_MARKER: &str = "---FILE_START:";

/// Marker closing one file block in the serialized codebase.
const FILE_END_MARKER: &str = "---FILE_END:";

const FIX_INSTRUCTIONS: &str = r#"Please analyze the code and provide the necessary fixes. Your response MUST be a single, valid JSON object.
The JSON object should have a single key "changes", which is an array of objects.
Each object in the array represents a file to be modified and must have the following three keys:
1. "file_path": The absolute path of the file to change (string).
2. "summary_of_changes": An array of objects, where each object describes a single, logical change within the file. Each change object must have:
   - "line": The approximate starting line number of the change (integer).
   - "description": A concise, one-sentence description of what was changed.
   - "reason": A brief explanation of why the change was necessary.
3. "fixed_code": The complete, new source code for the file as a single string.

EXAMPLE RESPONSE FORMAT:
{
  "changes": [
    {
      "file_path": "/path/to/your/script.py",
      "summary_of_changes": [
        {
          "line": 15,
          "description": "Replaced a for-loop with a list comprehension for conciseness.",
          "reason": "Improves readability and is more idiomatic Python."
        },
        {
          "line": 42,
          "description": "Added error handling for the file open operation.",
          "reason": "Prevents the program from crashing if the file does not exist."
        }
      ],
      "fixed_code": "import os\n\ndef new_function():\n    # ... complete new content of the file ...\n"
    }
  ]
}

IMPORTANT:
- Respond ONLY with the valid JSON object.
- Do not include markdown fences (```json), explanations, or any other text outside the JSON.
- Ensure all strings within the JSON, especially the "fixed_code", are properly escaped."#;

/// Builds the full fix request prompt: issue statement, every codebase file
/// wrapped in explicit boundary markers, and the response schema
/// instructions with one worked example.
pub fn build_fix_prompt(codebase: &Codebase, issue: &str) -> String {
    let files_section = codebase
        .iter()
        .map(|(path, content)| {
            format!(
                "{start}{path}\n{content}\n{end}{path}",
                start = FILE_START_MARKER,
                end = FILE_END_MARKER,
                path = path.display(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert coding assistant. A user has a request to fix or refactor a codebase.\n\
         \n\
         ISSUE DESCRIPTION:\n\
         {issue}\n\
         \n\
         FULL CODEBASE:\n\
         {files_section}\n\
         \n\
         {FIX_INSTRUCTIONS}"
    )
}

/// Generation options for a fix request: low temperature, a generous output
/// cap, and a structured JSON response.
pub fn fix_options() -> GenerateOptions {
    GenerateOptions::default()
        .with_temperature(FIX_TEMPERATURE)
        .with_max_output_tokens(FIX_MAX_OUTPUT_TOKENS)
        .with_response_format(ResponseFormat::StructuredJson)
}
