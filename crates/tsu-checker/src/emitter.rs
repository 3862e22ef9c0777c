//! Type-erasing JavaScript emitter.
//!
//! Output is the source text with every piece of type syntax overwritten by
//! spaces: annotations, optional markers, accessibility modifiers, `as`
//! casts, interfaces, type aliases, overload signatures and `declare`d
//! statements. Line breaks inside erased ranges are kept, so every output
//! position maps to the same line and column of the input. Source maps are
//! therefore the identity mapping.

use serde::Serialize;
use tsu_common::paths::{base_name, is_declaration_file};
use tsu_parser::{ModifierFlags, NodeData, NodeIndex, SourceFile, SyntaxKind};

/// Emission switches taken from the compiler options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitOptions {
    pub no_emit: bool,
    pub source_map: bool,
    /// Directory for output files; next to the source when unset.
    pub out_dir: Option<String>,
}

/// One emitted output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedArtifact {
    pub file_name: String,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitOutput {
    pub emit_skipped: bool,
    pub artifacts: Vec<EmittedArtifact>,
}

/// Emit one source file.
pub fn emit_file(file: &SourceFile, options: &EmitOptions) -> EmitOutput {
    if options.no_emit {
        return EmitOutput {
            emit_skipped: true,
            artifacts: Vec::new(),
        };
    }
    if is_declaration_file(&file.file_name) {
        return EmitOutput::default();
    }

    let js_name = output_path(&file.file_name, options.out_dir.as_deref());
    let mut text = erase_types(file);
    let mut artifacts = Vec::with_capacity(2);

    if options.source_map {
        let map_name = format!("{js_name}.map");
        if !text.ends_with('\n') && !text.is_empty() {
            text.push('\n');
        }
        text.push_str("//# sourceMappingURL=");
        text.push_str(base_name(&map_name));
        let map = identity_source_map(base_name(&js_name), &file.file_name, &file.text);
        artifacts.push(EmittedArtifact {
            file_name: js_name,
            text,
        });
        artifacts.push(EmittedArtifact {
            file_name: map_name,
            text: map,
        });
    } else {
        artifacts.push(EmittedArtifact {
            file_name: js_name,
            text,
        });
    }

    EmitOutput {
        emit_skipped: false,
        artifacts,
    }
}

/// `dir/a.ts` → `dir/a.js`, or `<out_dir>/a.js`.
pub fn output_path(source: &str, out_dir: Option<&str>) -> String {
    let stem = source
        .strip_suffix(".tsx")
        .or_else(|| source.strip_suffix(".ts"))
        .unwrap_or(source);
    match out_dir {
        Some(dir) => {
            let file_stem = base_name(stem);
            format!("{}/{file_stem}.js", dir.trim_end_matches('/'))
        }
        None => format!("{stem}.js"),
    }
}

// =============================================================================
// Erasure
// =============================================================================

/// Source text with all type syntax blanked out.
pub fn erase_types(file: &SourceFile) -> String {
    let mut eraser = TypeEraser {
        file,
        ranges: Vec::new(),
    };
    for &statement in file.statements() {
        eraser.visit_statement(statement);
    }
    blank_ranges(&file.text, eraser.ranges)
}

struct TypeEraser<'a> {
    file: &'a SourceFile,
    ranges: Vec<(u32, u32)>,
}

impl TypeEraser<'_> {
    fn erase_node(&mut self, node: NodeIndex) {
        if let Some(n) = self.file.arena.get(node) {
            self.ranges.push((n.pos, n.end));
        }
    }

    /// Erase `: T` ending at `type_node`.
    fn erase_annotation(&mut self, type_node: NodeIndex) {
        let Some(n) = self.file.arena.get(type_node) else {
            return;
        };
        let before = self.file.text.get(..n.pos as usize).unwrap_or("");
        let trimmed = before.trim_end();
        if trimmed.ends_with(':') {
            self.ranges.push((trimmed.len() as u32 - 1, n.end));
        } else {
            self.ranges.push((n.pos, n.end));
        }
    }

    /// Erase the `?` following `name`.
    fn erase_question_after(&mut self, name: NodeIndex) {
        let Some(n) = self.file.arena.get(name) else {
            return;
        };
        let after = self.file.text.get(n.end as usize..).unwrap_or("");
        let skipped = after.len() - after.trim_start().len();
        if after.trim_start().starts_with('?') {
            let at = n.end + skipped as u32;
            self.ranges.push((at, at + 1));
        }
    }

    /// Erase leading `public`/`private`/`protected`/`readonly` keywords of a
    /// member or parameter starting at `pos`.
    fn erase_accessibility(&mut self, pos: u32) {
        let text = &self.file.text;
        let mut at = pos as usize;
        loop {
            let rest = text.get(at..).unwrap_or("");
            let word_len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
                .unwrap_or(rest.len());
            let word = &rest[..word_len];
            if matches!(word, "public" | "private" | "protected" | "readonly") {
                self.ranges.push((at as u32, (at + word_len) as u32));
            } else if word != "static" {
                return;
            }
            let after = &rest[word_len..];
            let whitespace = after.len() - after.trim_start().len();
            if whitespace == 0 {
                return;
            }
            at += word_len + whitespace;
        }
    }

    fn visit_statement(&mut self, node: NodeIndex) {
        let file = self.file;
        let Some(n) = file.arena.get(node) else {
            return;
        };
        if file.arena.modifiers(node).contains(ModifierFlags::DECLARE) {
            self.erase_node(node);
            return;
        }

        match (n.kind, &n.data) {
            (SyntaxKind::InterfaceDeclaration | SyntaxKind::TypeAliasDeclaration, _) => {
                self.erase_node(node)
            }
            (SyntaxKind::FunctionDeclaration, NodeData::Function(func)) => {
                if func.body.is_none() {
                    self.erase_node(node);
                } else {
                    self.visit_function_like(node);
                }
            }
            (SyntaxKind::ClassDeclaration, NodeData::Class(class)) => {
                for &member in &class.members {
                    self.visit_class_member(member);
                }
            }
            (SyntaxKind::VariableStatement, NodeData::VariableStatement(statement)) => {
                for &declaration in &statement.declarations {
                    self.visit_variable_declaration(declaration);
                }
            }
            (SyntaxKind::Block, NodeData::Block(block)) => {
                for &statement in &block.statements {
                    self.visit_statement(statement);
                }
            }
            (
                SyntaxKind::ExpressionStatement | SyntaxKind::ReturnStatement,
                NodeData::Wrapper(wrapper),
            ) => self.visit_expression(wrapper.expression),
            (SyntaxKind::IfStatement, NodeData::If(data)) => {
                self.visit_expression(data.condition);
                self.visit_statement(data.then_statement);
                self.visit_statement(data.else_statement);
            }
            (
                SyntaxKind::WhileStatement | SyntaxKind::ForStatement | SyntaxKind::ForOfStatement,
                NodeData::Loop(data),
            ) => {
                if file.arena.kind(data.initializer) == SyntaxKind::VariableStatement {
                    self.visit_statement(data.initializer);
                } else {
                    self.visit_expression(data.initializer);
                }
                self.visit_expression(data.condition);
                self.visit_expression(data.incrementor);
                self.visit_statement(data.statement);
            }
            _ => {}
        }
    }

    fn visit_variable_declaration(&mut self, node: NodeIndex) {
        let Some(data) = self.file.arena.get_variable_declaration(node) else {
            return;
        };
        if data.type_annotation.is_some() {
            self.erase_annotation(data.type_annotation);
        }
        self.visit_expression(data.initializer);
    }

    fn visit_class_member(&mut self, member: NodeIndex) {
        let file = self.file;
        let Some(m) = file.arena.get(member) else {
            return;
        };
        if file.arena.modifiers(member).contains(ModifierFlags::DECLARE) {
            self.erase_node(member);
            return;
        }
        match &m.data {
            NodeData::Property(prop) => {
                self.erase_accessibility(m.pos);
                if prop.question_token {
                    self.erase_question_after(prop.name);
                }
                if prop.type_annotation.is_some() {
                    self.erase_annotation(prop.type_annotation);
                }
                self.visit_expression(prop.initializer);
            }
            NodeData::Function(func) => {
                if func.body.is_none() {
                    self.erase_node(member);
                    return;
                }
                self.erase_accessibility(m.pos);
                self.visit_function_like(member);
            }
            _ => {}
        }
    }

    fn visit_function_like(&mut self, node: NodeIndex) {
        let file = self.file;
        let Some(func) = file.arena.get_function(node) else {
            return;
        };
        for &param in &func.parameters {
            let Some(data) = file.arena.get_parameter(param) else {
                continue;
            };
            if !data.modifiers.is_empty() {
                if let Some(p) = file.arena.get(param) {
                    self.erase_accessibility(p.pos);
                }
            }
            if data.question_token {
                self.erase_question_after(data.name);
            }
            if data.type_annotation.is_some() {
                self.erase_annotation(data.type_annotation);
            }
            self.visit_expression(data.initializer);
        }
        if func.return_type.is_some() {
            self.erase_annotation(func.return_type);
        }
        if file.arena.kind(func.body) == SyntaxKind::Block {
            self.visit_statement(func.body);
        } else {
            self.visit_expression(func.body);
        }
    }

    fn visit_expression(&mut self, node: NodeIndex) {
        let file = self.file;
        let Some(n) = file.arena.get(node) else {
            return;
        };
        match &n.data {
            NodeData::As(as_data) => {
                if let Some(expression) = file.arena.get(as_data.expression) {
                    self.ranges.push((expression.end, n.end));
                }
                self.visit_expression(as_data.expression);
            }
            NodeData::Function(_) => self.visit_function_like(node),
            _ => file.arena.for_each_child(node, |child| self.visit_expression(child)),
        }
    }
}

/// Replace every character inside `ranges` with a space, keeping line
/// breaks.
fn blank_ranges(text: &str, mut ranges: Vec<(u32, u32)>) -> String {
    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        let (start, end) = (start as usize, end as usize);
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut next = 0;
    for (offset, ch) in text.char_indices() {
        while next < merged.len() && merged[next].1 <= offset {
            next += 1;
        }
        let erased = merged
            .get(next)
            .is_some_and(|&(start, end)| offset >= start && offset < end);
        if erased && ch != '\n' && ch != '\r' {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

// =============================================================================
// Source maps
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapJson<'a> {
    version: u32,
    file: &'a str,
    source_root: &'a str,
    sources: [&'a str; 1],
    names: [&'a str; 0],
    mappings: String,
}

/// Version 3 source map mapping each output line to the same source line.
fn identity_source_map(js_file: &str, source: &str, text: &str) -> String {
    let line_count = text.split('\n').count().max(1);
    // First segment: column 0, source 0, line 0, column 0. Every later line
    // advances the source line by one.
    let mut mappings = String::from("AAAA");
    for _ in 1..line_count {
        mappings.push_str(";AACA");
    }
    let map = SourceMapJson {
        version: 3,
        file: js_file,
        source_root: "",
        sources: [base_name(source)],
        names: [],
        mappings,
    };
    serde_json::to_string(&map).unwrap_or_default()
}

#[cfg(test)]
#[path = "../tests/emitter_tests.rs"]
mod tests;
