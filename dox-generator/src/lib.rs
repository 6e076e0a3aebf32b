mod options;
mod render;

use dox_tree::{TreeError, build_file_unit};
use prost::Message as _;
use prost_types::FileDescriptorProto;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};

pub use options::{DEFAULT_PLACEHOLDER, DEFAULT_SUFFIX, Options, OptionsError};
pub use render::{render_file, type_description};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("{file}: {source}")]
    Tree {
        file: String,
        #[source]
        source: TreeError,
    },

    #[error("invalid plugin parameter: {0}")]
    Options(#[from] OptionsError),

    #[error("failed to decode code generator request: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// One generated documentation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

/// Build, annotate and render the documentation of a single file.
pub fn generate_file(
    file: &FileDescriptorProto,
    options: &Options,
) -> Result<GeneratedFile, GenerateError> {
    let tree_error = |source| GenerateError::Tree {
        file: file.name().to_string(),
        source,
    };

    let mut unit = build_file_unit(file).map_err(tree_error)?;
    if let Some(info) = &file.source_code_info {
        unit.apply_locations(&info.location).map_err(tree_error)?;
    }

    Ok(GeneratedFile {
        name: format!("{}{}", file.name(), options.suffix),
        content: render_file(&unit, options),
    })
}

/// Generate every selected file of the request independently.
/// A failing file does not prevent its siblings from being generated.
pub fn generate_files(
    request: &CodeGeneratorRequest,
    options: &Options,
) -> Vec<Result<GeneratedFile, GenerateError>> {
    request
        .proto_file
        .iter()
        .filter(|f| {
            !options.requested_only || request.file_to_generate.iter().any(|n| n == f.name())
        })
        .map(|f| {
            let _span = tracing::debug_span!("file", name = f.name()).entered();
            let result = generate_file(f, options);
            if let Err(e) = &result {
                tracing::warn!(error = %e, "documentation generation failed");
            }
            result
        })
        .collect()
}

/// Answer a protoc request. Per-file failures are listed in the response
/// `error` field, next to the files that were generated.
pub fn generate(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };

    let options = match Options::from_parameter(request.parameter()) {
        Ok(options) => options,
        Err(e) => {
            response.error = Some(GenerateError::from(e).to_string());
            return response;
        }
    };

    let mut failures = Vec::new();
    for result in generate_files(request, &options) {
        match result {
            Ok(generated) => response.file.push(File {
                name: Some(generated.name),
                content: Some(generated.content),
                ..Default::default()
            }),
            Err(e) => failures.push(e.to_string()),
        }
    }
    if !failures.is_empty() {
        response.error = Some(failures.join("\n"));
    }

    tracing::debug!(
        generated = response.file.len(),
        failed = failures.len(),
        "processed code generator request"
    );
    response
}

/// Decode a serialized request, generate, and serialize the response.
pub fn run(input: &[u8]) -> Result<Vec<u8>, GenerateError> {
    let request = CodeGeneratorRequest::decode(input)?;
    Ok(generate(&request).encode_to_vec())
}
