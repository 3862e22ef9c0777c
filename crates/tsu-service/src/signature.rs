//! Exported function signatures as host-bindable descriptors.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use tsu_checker::TypeId;
use tsu_common::diagnostics::SERVICE_TAG;
use tsu_common::paths::base_name;
use tsu_parser::{ModifierFlags, NodeIndex, SourceFile, SyntaxKind};

use crate::frontend::Frontend;
use crate::type_descriptor::{TypeDescriptor, parse_type};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub name: String,
    pub types: Vec<TypeDescriptor>,
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    pub name: String,
    pub parameters: Vec<ParameterDescriptor>,
    /// At most one entry; functions returning a union are rejected.
    pub return_types: Vec<TypeDescriptor>,
    /// 1-based position of the function name.
    pub line: u32,
    pub character: u32,
}

/// Top-level `export function` declarations that have a body.
pub fn exported_functions(file: &SourceFile) -> Vec<NodeIndex> {
    file.statements()
        .iter()
        .copied()
        .filter(|&statement| file.arena.kind(statement) == SyntaxKind::FunctionDeclaration)
        .filter(|&statement| {
            file.arena
                .get_function(statement)
                .is_some_and(|func| func.body.is_some() && func.name.is_some())
        })
        .filter(|&statement| file.arena.modifiers(statement).contains(ModifierFlags::EXPORT))
        .collect()
}

/// Descriptors for every exported function of `file`.
///
/// Functions whose return type is a union are left out; a `[TSU]` line
/// naming the function and its return type is appended to `diagnostics`
/// instead.
pub fn extract_exports(
    frontend: &mut dyn Frontend,
    file: &SourceFile,
    diagnostics: &mut Vec<String>,
) -> Vec<FunctionDescriptor> {
    let mut exports = Vec::new();
    for declaration in exported_functions(file) {
        match extract_function(frontend, file, declaration) {
            Ok(descriptor) => exports.push(descriptor),
            Err(rejection) => {
                debug!(file = %file.file_name, %rejection, "rejected export");
                diagnostics.push(rejection);
            }
        }
    }
    exports
}

fn extract_function(
    frontend: &mut dyn Frontend,
    file: &SourceFile,
    declaration: NodeIndex,
) -> Result<FunctionDescriptor, String> {
    let path = file.file_name.as_str();
    let Some(func) = file.arena.get_function(declaration) else {
        return Err(format!("[{SERVICE_TAG}] {}: not a function", base_name(path)));
    };
    let name = file.node_text(func.name).to_string();
    let name_pos = file.arena.get(func.name).map_or(0, |node| node.pos);
    let position = file.position_of(name_pos);
    let (line, character) = (position.line + 1, position.character + 1);

    let signature = frontend.resolve_signature(path, declaration);
    let return_display = signature
        .as_ref()
        .map_or_else(|| "any".to_string(), |sig| frontend.type_display_string(sig.return_type));
    let return_types = parse_type(&return_display);

    if return_types.len() > 1 {
        return Err(format!(
            "[{SERVICE_TAG}] {}({line},{character}): Disallowed union return type for '{name}' ({return_display})",
            base_name(path)
        ));
    }

    let parameters = func
        .parameters
        .iter()
        .enumerate()
        .map(|(index, &param)| {
            let fallback = signature.as_ref().and_then(|sig| sig.params.get(index));
            extract_parameter(&mut *frontend, file, param, fallback.map(|p| p.type_id))
        })
        .collect();

    trace!(%name, %return_display, "extracted export");
    Ok(FunctionDescriptor {
        name,
        parameters,
        return_types,
        line,
        character,
    })
}

fn extract_parameter(
    frontend: &mut dyn Frontend,
    file: &SourceFile,
    param: NodeIndex,
    signature_type: Option<TypeId>,
) -> ParameterDescriptor {
    let Some(data) = file.arena.get_parameter(param) else {
        return ParameterDescriptor {
            name: file.node_text(param).to_string(),
            types: parse_type("any"),
            optional: false,
        };
    };

    let annotated = data
        .type_annotation
        .is_some()
        .then(|| frontend.resolve_type(&file.file_name, data.type_annotation).ok())
        .flatten();
    let display = annotated
        .or(signature_type)
        .map_or_else(|| "any".to_string(), |type_id| frontend.type_display_string(type_id));

    ParameterDescriptor {
        name: file.node_text(data.name).to_string(),
        types: parse_type(&display),
        optional: data.initializer.is_none() && data.question_token,
    }
}
