//! Value types of symbols, signatures of function-like declarations, and the
//! construction of class and interface types.

use indexmap::IndexMap;
use tsu_parser::{ModifierFlags, NodeIndex, SourceFile, SyntaxKind, VariableKind};

use crate::binder::{DeclRef, SymbolFlags, SymbolId};
use crate::state::{CheckerState, ClassTypes, FunctionContext};
use crate::types::{ObjectKind, ObjectShape, ParamInfo, PropertyInfo, Signature, TypeId};

impl CheckerState {
    // =========================================================================
    // Symbol value types
    // =========================================================================

    /// Type of a symbol in value position. Circular references resolve to
    /// `any`.
    pub(crate) fn type_of_symbol(&mut self, symbol_id: SymbolId) -> TypeId {
        if let Some(&cached) = self.symbol_types.get(&symbol_id) {
            return cached;
        }
        if !self.resolving_symbols.insert(symbol_id) {
            return TypeId::ANY;
        }
        let type_id = self.compute_symbol_type(symbol_id);
        self.resolving_symbols.remove(&symbol_id);
        self.symbol_types.insert(symbol_id, type_id);
        type_id
    }

    fn compute_symbol_type(&mut self, symbol_id: SymbolId) -> TypeId {
        let Some(symbol) = self.binder.symbol(symbol_id).cloned() else {
            return TypeId::ERROR;
        };
        let flags = symbol.flags;

        if flags.contains(SymbolFlags::BUILTIN) {
            return match symbol.name.as_str() {
                "undefined" => TypeId::UNDEFINED,
                "NaN" | "Infinity" => TypeId::NUMBER,
                _ => TypeId::ANY,
            };
        }
        if flags.contains(SymbolFlags::ALIAS) {
            return match self.resolve_alias(symbol_id) {
                Some(target)
                    if self
                        .binder
                        .symbol(target)
                        .is_some_and(|t| t.flags.intersects(SymbolFlags::VALUE)) =>
                {
                    self.type_of_symbol(target)
                }
                _ => TypeId::ERROR,
            };
        }
        if flags.contains(SymbolFlags::CLASS) {
            return self.class_types(symbol_id).constructor;
        }
        if flags.contains(SymbolFlags::FUNCTION) {
            return self.function_type_of_declarations(&symbol.declarations);
        }

        let Some(&decl) = symbol.declarations.first() else {
            return TypeId::ERROR;
        };
        let scope = self
            .binder
            .declaration_scope(decl.file, decl.node)
            .unwrap_or_else(|| self.binder.file_scope(decl.file));

        if flags.contains(SymbolFlags::VARIABLE) {
            return self.with_declaration_context(decl.file, scope, |checker| {
                checker.variable_declaration_type(decl.node)
            });
        }
        if flags.contains(SymbolFlags::PARAMETER) {
            return self.with_declaration_context(decl.file, scope, |checker| {
                checker.parameter_declaration_type(decl.node)
            });
        }
        TypeId::ERROR
    }

    /// Declared or inferred type of a variable declaration in the current
    /// file.
    pub(crate) fn variable_declaration_type(&mut self, node: NodeIndex) -> TypeId {
        let file = self.current_file();
        let Some(data) = file.arena.get_variable_declaration(node) else {
            return TypeId::ERROR;
        };
        if data.type_annotation.is_some() {
            return self.type_from_type_node(data.type_annotation);
        }
        if let Some(iterated) = self.binder.for_of_iterated(self.ctx.file, node) {
            let iterated_type = self.check_expression(iterated, None);
            return self.iterated_element_type(iterated_type);
        }
        if data.initializer.is_none() {
            return TypeId::ANY;
        }

        let initializer_type = self.check_expression(data.initializer, None);
        if data.kind == VariableKind::Const {
            return initializer_type;
        }
        if !self.options.strict
            && (initializer_type == TypeId::NULL || initializer_type == TypeId::UNDEFINED)
        {
            return TypeId::ANY;
        }
        self.interner.widen(initializer_type)
    }

    /// Type of a parameter: annotation, else initializer, else the type
    /// supplied by context, else `any`.
    pub(crate) fn parameter_declaration_type(&mut self, node: NodeIndex) -> TypeId {
        let file = self.current_file();
        let Some(data) = file.arena.get_parameter(node) else {
            return TypeId::ERROR;
        };
        if data.type_annotation.is_some() {
            return self.type_from_type_node(data.type_annotation);
        }
        if data.initializer.is_some() {
            let initializer_type = self.check_expression(data.initializer, None);
            return self.interner.widen(initializer_type);
        }
        if let Some(&contextual) = self.contextual_param_types.get(&self.decl_ref(node)) {
            return contextual;
        }
        TypeId::ANY
    }

    /// Element type produced by `for (x of <type>)`.
    pub(crate) fn iterated_element_type(&self, iterated: TypeId) -> TypeId {
        if let Some(element) = self.interner.array_element(iterated) {
            return element;
        }
        if self.interner.base_primitive(iterated) == TypeId::STRING {
            return TypeId::STRING;
        }
        if iterated == TypeId::ERROR {
            return TypeId::ERROR;
        }
        TypeId::ANY
    }

    /// Function type for a set of function declarations. Bodiless overloads
    /// hide the implementation signature.
    fn function_type_of_declarations(&mut self, declarations: &[DeclRef]) -> TypeId {
        let functions: Vec<DeclRef> = declarations
            .iter()
            .copied()
            .filter(|decl| {
                self.files[decl.file].arena.kind(decl.node) == SyntaxKind::FunctionDeclaration
            })
            .collect();
        let overloads: Vec<DeclRef> = functions
            .iter()
            .copied()
            .filter(|decl| {
                self.files[decl.file]
                    .arena
                    .get_function(decl.node)
                    .is_some_and(|f| f.body.is_none())
            })
            .collect();
        let visible = if overloads.is_empty() { functions } else { overloads };

        let mut shape = ObjectShape::new(ObjectKind::Anonymous, None, None);
        for decl in visible {
            let scope = self
                .binder
                .node_scope(decl.file, decl.node)
                .unwrap_or_else(|| self.binder.file_scope(decl.file));
            let signature =
                self.with_declaration_context(decl.file, scope, |checker| checker.signature_of(decl.node));
            shape.call_signatures.push(signature);
        }
        self.interner.alloc_object(shape)
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// Signature of a function-like node in the current file. Without a
    /// return annotation the return type is inferred from the body.
    pub(crate) fn signature_of(&mut self, node: NodeIndex) -> Signature {
        let key = self.decl_ref(node);
        if let Some(cached) = self.signatures.get(&key) {
            return cached.clone();
        }

        let file = self.current_file();
        let Some(func) = file.arena.get_function(node) else {
            return Signature {
                params: Vec::new(),
                return_type: TypeId::ERROR,
            };
        };
        let scope = self.scope_of_node(node);

        let params = self.with_scope(scope, |checker| {
            func.parameters
                .iter()
                .map(|&param| checker.parameter_info(&file, param))
                .collect::<Vec<_>>()
        });

        if !self.resolving_signatures.insert(key) {
            // Recursive reference while inferring the return type.
            return Signature {
                params,
                return_type: TypeId::ANY,
            };
        }

        let return_type = if func.return_type.is_some() {
            self.with_scope(scope, |checker| checker.type_from_type_node(func.return_type))
        } else if file.arena.kind(node) == SyntaxKind::Constructor {
            TypeId::VOID
        } else if func.body.is_some() {
            let context = self.speculatively(|checker| checker.check_function_body(node, None));
            self.inferred_return_type(&context)
        } else {
            TypeId::ANY
        };

        self.resolving_signatures.remove(&key);
        let signature = Signature {
            params,
            return_type,
        };
        self.signatures.insert(key, signature.clone());
        signature
    }

    fn parameter_info(&mut self, file: &SourceFile, param: NodeIndex) -> ParamInfo {
        let Some(data) = file.arena.get_parameter(param) else {
            return ParamInfo {
                name: String::new(),
                type_id: TypeId::ERROR,
                optional: false,
            };
        };
        let name = file.arena.identifier_text(data.name).unwrap_or("").to_string();
        let optional = data.question_token || data.initializer.is_some();
        let type_id = match self.binder.symbol_of_declaration(self.ctx.file, param) {
            Some(symbol) => self.type_of_symbol(symbol),
            None => self.parameter_declaration_type(param),
        };
        ParamInfo {
            name,
            type_id,
            optional,
        }
    }

    /// Union of the widened `return` expression types, `void` without any.
    pub(crate) fn inferred_return_type(&mut self, context: &FunctionContext) -> TypeId {
        if context.return_types.is_empty() {
            return TypeId::VOID;
        }
        let widened: Vec<TypeId> = context
            .return_types
            .iter()
            .map(|&t| self.interner.widen(t))
            .collect();
        self.interner.union(widened)
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Instance and constructor types of a class symbol.
    pub(crate) fn class_types(&mut self, symbol_id: SymbolId) -> ClassTypes {
        if let Some(&cached) = self.class_types.get(&symbol_id) {
            return cached;
        }
        let Some(symbol) = self.binder.symbol(symbol_id).cloned() else {
            return ClassTypes {
                instance: TypeId::ERROR,
                constructor: TypeId::ERROR,
            };
        };

        let instance = self.interner.alloc_object(ObjectShape::new(
            ObjectKind::ClassInstance,
            Some(symbol.name.clone()),
            Some(symbol_id),
        ));
        let constructor = self.interner.alloc_object(ObjectShape::new(
            ObjectKind::ClassConstructor,
            Some(symbol.name.clone()),
            Some(symbol_id),
        ));
        let types = ClassTypes {
            instance,
            constructor,
        };
        self.class_types.insert(symbol_id, types);

        let class_decl = symbol
            .declarations
            .iter()
            .copied()
            .find(|decl| self.files[decl.file].arena.kind(decl.node) == SyntaxKind::ClassDeclaration);
        let Some(class_decl) = class_decl else {
            return types;
        };
        let interface_decls: Vec<DeclRef> = symbol
            .declarations
            .iter()
            .copied()
            .filter(|decl| {
                self.files[decl.file].arena.kind(decl.node) == SyntaxKind::InterfaceDeclaration
            })
            .collect();

        let scope = self
            .binder
            .declaration_scope(class_decl.file, class_decl.node)
            .unwrap_or_else(|| self.binder.file_scope(class_decl.file));
        self.with_declaration_context(class_decl.file, scope, |checker| {
            checker.build_class(symbol_id, class_decl.node, types)
        });

        if !interface_decls.is_empty() {
            let mut shape = self
                .interner
                .object_shape(instance)
                .cloned()
                .unwrap_or_else(|| ObjectShape::new(ObjectKind::ClassInstance, None, None));
            for decl in interface_decls {
                self.collect_interface_declaration(decl, &mut shape);
            }
            self.interner.set_object_shape(instance, shape);
        }
        types
    }

    fn build_class(&mut self, symbol_id: SymbolId, node: NodeIndex, types: ClassTypes) {
        let file = self.current_file();
        let Some(class) = file.arena.get_class(node) else {
            return;
        };
        for &member in &class.members {
            self.member_owners.insert(self.decl_ref(member), symbol_id);
        }
        self.ctx.this_types.push(types.instance);

        let mut instance_shape = self
            .interner
            .object_shape(types.instance)
            .cloned()
            .unwrap_or_else(|| ObjectShape::new(ObjectKind::ClassInstance, None, None));
        let mut ctor_shape = self
            .interner
            .object_shape(types.constructor)
            .cloned()
            .unwrap_or_else(|| ObjectShape::new(ObjectKind::ClassConstructor, None, None));

        // Heritage.
        let mut base_constructor = None;
        if class.heritage.is_some() {
            let base = self.type_from_type_node(class.heritage);
            if let Some(base_shape) = self.interner.object_shape(base)
                && base_shape.kind == ObjectKind::ClassInstance
            {
                let base_symbol = base_shape.symbol;
                instance_shape.base_types.push(base);
                if let Some(base_symbol) = base_symbol {
                    let base_types = self.class_types(base_symbol);
                    ctor_shape.base_types.push(base_types.constructor);
                    base_constructor = Some(base_types.constructor);
                }
            }
        }

        // Members with declared types first, so unannotated members can
        // refer to them through `this`.
        let mut methods: IndexMap<String, Vec<NodeIndex>> = IndexMap::new();
        let mut pending_properties = Vec::new();
        let mut constructors = Vec::new();
        for &member in &class.members {
            let kind = file.arena.kind(member);
            match kind {
                SyntaxKind::PropertyDeclaration => {
                    let Some(prop) = file.arena.get_property(member) else {
                        continue;
                    };
                    let is_static = prop.modifiers.contains(ModifierFlags::STATIC);
                    let type_id = if prop.type_annotation.is_some() {
                        self.type_from_type_node(prop.type_annotation)
                    } else {
                        pending_properties.push(member);
                        TypeId::ANY
                    };
                    let info = PropertyInfo {
                        name: member_name(&file, prop.name),
                        type_id,
                        optional: prop.question_token,
                        readonly: prop.modifiers.contains(ModifierFlags::READONLY),
                    };
                    let target = if is_static {
                        &mut ctor_shape
                    } else {
                        &mut instance_shape
                    };
                    upsert_property(target, info);
                }
                SyntaxKind::MethodDeclaration => {
                    if let Some(func) = file.arena.get_function(member) {
                        methods.entry(member_name(&file, func.name)).or_default().push(member);
                    }
                }
                SyntaxKind::Constructor => constructors.push(member),
                _ => {}
            }
        }

        // Parameter properties: `constructor(public x: number)`.
        for &ctor in &constructors {
            let Some(func) = file.arena.get_function(ctor) else {
                continue;
            };
            for &param in &func.parameters {
                let Some(data) = file.arena.get_parameter(param) else {
                    continue;
                };
                if !data.modifiers.intersects(
                    ModifierFlags::PUBLIC
                        | ModifierFlags::PRIVATE
                        | ModifierFlags::PROTECTED
                        | ModifierFlags::READONLY,
                ) {
                    continue;
                }
                let scope = self.scope_of_node(ctor);
                let type_id =
                    self.with_scope(scope, |checker| checker.parameter_declaration_type(param));
                upsert_property(
                    &mut instance_shape,
                    PropertyInfo {
                        name: member_name(&file, data.name),
                        type_id,
                        optional: data.question_token,
                        readonly: data.modifiers.contains(ModifierFlags::READONLY),
                    },
                );
            }
        }

        // Methods whose signatures need no inference go in now; the rest get
        // a placeholder until their bodies can be inspected.
        let mut pending_methods = Vec::new();
        for (name, declarations) in &methods {
            let annotated = declarations.iter().all(|&decl| {
                file.arena
                    .get_function(decl)
                    .is_some_and(|f| f.return_type.is_some() || f.body.is_none())
            });
            let is_static = declarations
                .first()
                .is_some_and(|&decl| file.arena.modifiers(decl).contains(ModifierFlags::STATIC));
            let type_id = if annotated {
                self.method_type(&file, declarations)
            } else {
                pending_methods.push(name.clone());
                TypeId::ANY
            };
            let target = if is_static {
                &mut ctor_shape
            } else {
                &mut instance_shape
            };
            upsert_property(
                target,
                PropertyInfo {
                    name: name.clone(),
                    type_id,
                    optional: false,
                    readonly: false,
                },
            );
        }
        self.interner.set_object_shape(types.instance, instance_shape.clone());
        self.interner.set_object_shape(types.constructor, ctor_shape.clone());

        for member in pending_properties {
            let Some(prop) = file.arena.get_property(member) else {
                continue;
            };
            let type_id = if prop.initializer.is_some() {
                let initializer_type = self.check_expression(prop.initializer, None);
                self.interner.widen(initializer_type)
            } else {
                TypeId::ANY
            };
            let is_static = prop.modifiers.contains(ModifierFlags::STATIC);
            let target = if is_static {
                &mut ctor_shape
            } else {
                &mut instance_shape
            };
            upsert_property(
                target,
                PropertyInfo {
                    name: member_name(&file, prop.name),
                    type_id,
                    optional: prop.question_token,
                    readonly: prop.modifiers.contains(ModifierFlags::READONLY),
                },
            );
            self.interner.set_object_shape(types.instance, instance_shape.clone());
            self.interner.set_object_shape(types.constructor, ctor_shape.clone());
        }

        for name in pending_methods {
            let Some(declarations) = methods.get(&name) else {
                continue;
            };
            let type_id = self.method_type(&file, declarations);
            let is_static = declarations
                .first()
                .is_some_and(|&decl| file.arena.modifiers(decl).contains(ModifierFlags::STATIC));
            let target = if is_static {
                &mut ctor_shape
            } else {
                &mut instance_shape
            };
            upsert_property(
                target,
                PropertyInfo {
                    name,
                    type_id,
                    optional: false,
                    readonly: false,
                },
            );
            self.interner.set_object_shape(types.instance, instance_shape.clone());
            self.interner.set_object_shape(types.constructor, ctor_shape.clone());
        }

        // Construct signatures.
        let has_body = |decl: &NodeIndex| {
            file.arena
                .get_function(*decl)
                .is_some_and(|f| f.body.is_some())
        };
        let overloads: Vec<NodeIndex> = constructors.iter().copied().filter(|c| !has_body(c)).collect();
        let visible = if overloads.is_empty() {
            constructors
        } else {
            overloads
        };
        ctor_shape.construct_signatures = if !visible.is_empty() {
            visible
                .into_iter()
                .map(|ctor| {
                    let mut signature = self.signature_of(ctor);
                    signature.return_type = types.instance;
                    signature
                })
                .collect()
        } else if let Some(base) = base_constructor {
            self.interner
                .construct_signatures(base)
                .iter()
                .cloned()
                .map(|mut signature| {
                    signature.return_type = types.instance;
                    signature
                })
                .collect()
        } else {
            vec![Signature {
                params: Vec::new(),
                return_type: types.instance,
            }]
        };
        if ctor_shape.construct_signatures.is_empty() {
            ctor_shape.construct_signatures.push(Signature {
                params: Vec::new(),
                return_type: types.instance,
            });
        }

        self.interner.set_object_shape(types.instance, instance_shape);
        self.interner.set_object_shape(types.constructor, ctor_shape);
        self.ctx.this_types.pop();
    }

    /// Function type of a method given all its declarations (overloads
    /// included), in the current file.
    fn method_type(&mut self, file: &SourceFile, declarations: &[NodeIndex]) -> TypeId {
        let overloads: Vec<NodeIndex> = declarations
            .iter()
            .copied()
            .filter(|&decl| file.arena.get_function(decl).is_some_and(|f| f.body.is_none()))
            .collect();
        let has_implementation = overloads.len() < declarations.len();
        let visible = if has_implementation && !overloads.is_empty() {
            overloads
        } else {
            declarations.to_vec()
        };
        let mut shape = ObjectShape::new(ObjectKind::Anonymous, None, None);
        for decl in visible {
            shape.call_signatures.push(self.signature_of(decl));
        }
        self.interner.alloc_object(shape)
    }

    // =========================================================================
    // Interfaces
    // =========================================================================

    /// Type of an interface symbol, merged across its declarations.
    pub(crate) fn interface_type(&mut self, symbol_id: SymbolId) -> TypeId {
        if let Some(&cached) = self.interface_types.get(&symbol_id) {
            return cached;
        }
        let Some(symbol) = self.binder.symbol(symbol_id).cloned() else {
            return TypeId::ERROR;
        };
        let type_id = self.interner.alloc_object(ObjectShape::new(
            ObjectKind::Interface,
            Some(symbol.name.clone()),
            Some(symbol_id),
        ));
        self.interface_types.insert(symbol_id, type_id);

        let mut shape = ObjectShape::new(ObjectKind::Interface, Some(symbol.name), Some(symbol_id));
        for decl in symbol.declarations {
            if self.files[decl.file].arena.kind(decl.node) == SyntaxKind::InterfaceDeclaration {
                self.collect_interface_declaration(decl, &mut shape);
                self.interner.set_object_shape(type_id, shape.clone());
            }
        }
        self.interner.set_object_shape(type_id, shape);
        type_id
    }

    /// Add the heritage and members of one interface declaration to `shape`.
    /// Members already present win.
    fn collect_interface_declaration(&mut self, decl: DeclRef, shape: &mut ObjectShape) {
        let scope = self
            .binder
            .declaration_scope(decl.file, decl.node)
            .unwrap_or_else(|| self.binder.file_scope(decl.file));
        self.with_declaration_context(decl.file, scope, |checker| {
            let file = checker.current_file();
            let Some(iface) = file.arena.get_interface(decl.node) else {
                return;
            };
            for &heritage in &iface.heritage {
                let base = checker.type_from_type_node(heritage);
                if checker.interner.object_shape(base).is_some() && !shape.base_types.contains(&base) {
                    shape.base_types.push(base);
                }
            }

            let mut methods: IndexMap<String, Vec<NodeIndex>> = IndexMap::new();
            for &member in &iface.members {
                match file.arena.kind(member) {
                    SyntaxKind::PropertySignature => {
                        let Some(prop) = file.arena.get_property(member) else {
                            continue;
                        };
                        let name = member_name(&file, prop.name);
                        if name.is_empty() || shape.own_property(&name).is_some() {
                            continue;
                        }
                        let type_id = if prop.type_annotation.is_some() {
                            checker.type_from_type_node(prop.type_annotation)
                        } else {
                            TypeId::ANY
                        };
                        shape.properties.push(PropertyInfo {
                            name,
                            type_id,
                            optional: prop.question_token,
                            readonly: prop.modifiers.contains(ModifierFlags::READONLY),
                        });
                    }
                    SyntaxKind::MethodSignature => {
                        if let Some(func) = file.arena.get_function(member) {
                            methods.entry(member_name(&file, func.name)).or_default().push(member);
                        }
                    }
                    _ => {}
                }
            }
            for (name, declarations) in methods {
                if name.is_empty() || shape.own_property(&name).is_some() {
                    continue;
                }
                let optional = declarations
                    .iter()
                    .any(|&decl| method_signature_is_optional(&file, decl));
                let mut method_shape = ObjectShape::new(ObjectKind::Anonymous, None, None);
                for decl in declarations {
                    method_shape.call_signatures.push(checker.signature_of(decl));
                }
                let type_id = checker.interner.alloc_object(method_shape);
                shape.properties.push(PropertyInfo {
                    name,
                    type_id,
                    optional,
                    readonly: false,
                });
            }
        });
    }
}

/// Text of a member name (identifier or literal).
pub(crate) fn member_name(file: &SourceFile, name: NodeIndex) -> String {
    file.arena
        .identifier_text(name)
        .or_else(|| file.arena.literal_text(name))
        .unwrap_or("")
        .to_string()
}

/// `m?(): void` in an interface: the `?` follows the name in the source.
fn method_signature_is_optional(file: &SourceFile, decl: NodeIndex) -> bool {
    let Some(func) = file.arena.get_function(decl) else {
        return false;
    };
    let Some(name) = file.arena.get(func.name) else {
        return false;
    };
    file.text
        .get(name.end as usize..)
        .and_then(|rest| rest.trim_start().chars().next())
        == Some('?')
}

fn upsert_property(shape: &mut ObjectShape, info: PropertyInfo) {
    if info.name.is_empty() {
        return;
    }
    match shape.properties.iter_mut().find(|p| p.name == info.name) {
        Some(existing) => *existing = info,
        None => shape.properties.push(info),
    }
}
