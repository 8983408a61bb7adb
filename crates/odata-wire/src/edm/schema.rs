// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schemas, operations, terms, containers, annotations and references.

use crate::edm::expression::Expression;
use crate::edm::types::{
    EnumType, FullQualifiedName, StructuredType, TypeDefinition, TypeFacets,
};

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

/// Application of a term, optionally qualified, with an optional value.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub term: FullQualifiedName,
    pub qualifier: Option<String>,
    pub expression: Option<Expression>,
    /// Annotations of the annotation.
    pub annotations: Vec<Annotation>,
}

impl Annotation {
    pub fn new(term: impl Into<FullQualifiedName>) -> Self {
        Self {
            term: term.into(),
            qualifier: None,
            expression: None,
            annotations: Vec::new(),
        }
    }

    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn value(mut self, expression: Expression) -> Self {
        self.expression = Some(expression);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// External targeting: `<Annotations Target="...">`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationGroup {
    pub target: String,
    pub qualifier: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl AnnotationGroup {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            qualifier: None,
            annotations: Vec::new(),
        }
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

// ---------------------------------------------------------------------------
// Operations and terms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Action,
    Function,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Function => "Function",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_name: FullQualifiedName,
    pub collection: bool,
    pub nullable: bool,
    pub facets: TypeFacets,
    pub annotations: Vec<Annotation>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            collection: false,
            nullable: true,
            facets: TypeFacets::default(),
            annotations: Vec::new(),
        }
    }

    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnType {
    pub type_name: FullQualifiedName,
    pub collection: bool,
    pub nullable: bool,
    pub facets: TypeFacets,
}

impl ReturnType {
    pub fn new(type_name: impl Into<FullQualifiedName>) -> Self {
        Self {
            type_name: type_name.into(),
            collection: false,
            nullable: true,
            facets: TypeFacets::default(),
        }
    }

    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Action or function declaration (one overload).
#[derive(Debug, Clone, PartialEq)]
pub struct EdmOperation {
    pub kind: OperationKind,
    pub name: FullQualifiedName,
    pub is_bound: bool,
    /// Functions only.
    pub is_composable: bool,
    pub entity_set_path: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<ReturnType>,
    pub annotations: Vec<Annotation>,
}

impl EdmOperation {
    fn new(kind: OperationKind, name: FullQualifiedName) -> Self {
        Self {
            kind,
            name,
            is_bound: false,
            is_composable: false,
            entity_set_path: None,
            parameters: Vec::new(),
            return_type: None,
            annotations: Vec::new(),
        }
    }

    pub fn action(name: impl Into<FullQualifiedName>) -> Self {
        Self::new(OperationKind::Action, name.into())
    }

    pub fn function(name: impl Into<FullQualifiedName>) -> Self {
        Self::new(OperationKind::Function, name.into())
    }

    /// Mark bound; the first parameter is the binding parameter.
    pub fn bound(mut self) -> Self {
        self.is_bound = true;
        self
    }

    pub fn composable(mut self) -> Self {
        self.is_composable = true;
        self
    }

    pub fn entity_set_path(mut self, path: impl Into<String>) -> Self {
        self.entity_set_path = Some(path.into());
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, return_type: ReturnType) -> Self {
        self.return_type = Some(return_type);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub name: FullQualifiedName,
    pub type_name: FullQualifiedName,
    pub collection: bool,
    pub nullable: bool,
    pub base_term: Option<FullQualifiedName>,
    pub applies_to: Vec<String>,
    pub default_value: Option<String>,
    pub facets: TypeFacets,
    pub annotations: Vec<Annotation>,
}

impl Term {
    pub fn new(name: impl Into<FullQualifiedName>, type_name: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            collection: false,
            nullable: true,
            base_term: None,
            applies_to: Vec::new(),
            default_value: None,
            facets: TypeFacets::default(),
            annotations: Vec::new(),
        }
    }

    pub fn applies_to(mut self, target: impl Into<String>) -> Self {
        self.applies_to.push(target.into());
        self
    }

    pub fn base_term(mut self, base: impl Into<FullQualifiedName>) -> Self {
        self.base_term = Some(base.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Entity container
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPropertyBinding {
    pub path: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySet {
    pub name: String,
    pub entity_type: FullQualifiedName,
    pub include_in_service_document: bool,
    pub title: Option<String>,
    pub bindings: Vec<NavigationPropertyBinding>,
    pub annotations: Vec<Annotation>,
}

impl EntitySet {
    pub fn new(name: impl Into<String>, entity_type: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            include_in_service_document: true,
            title: None,
            bindings: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.include_in_service_document = false;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn bind(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.bindings.push(NavigationPropertyBinding {
            path: path.into(),
            target: target.into(),
        });
        self
    }

    /// Target set of the binding for `path`, if one is declared.
    pub fn binding_target(&self, path: &str) -> Option<&str> {
        binding_target(&self.bindings, path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Singleton {
    pub name: String,
    pub entity_type: FullQualifiedName,
    pub title: Option<String>,
    pub bindings: Vec<NavigationPropertyBinding>,
    pub annotations: Vec<Annotation>,
}

impl Singleton {
    pub fn new(name: impl Into<String>, entity_type: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            title: None,
            bindings: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn bind(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.bindings.push(NavigationPropertyBinding {
            path: path.into(),
            target: target.into(),
        });
        self
    }

    pub fn binding_target(&self, path: &str) -> Option<&str> {
        binding_target(&self.bindings, path)
    }
}

fn binding_target<'a>(bindings: &'a [NavigationPropertyBinding], path: &str) -> Option<&'a str> {
    bindings
        .iter()
        .find(|b| b.path == path)
        .map(|b| b.target.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionImport {
    pub name: String,
    pub action: FullQualifiedName,
    pub entity_set: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl ActionImport {
    pub fn new(name: impl Into<String>, action: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            entity_set: None,
            annotations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionImport {
    pub name: String,
    pub function: FullQualifiedName,
    pub entity_set: Option<String>,
    pub include_in_service_document: bool,
    pub title: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl FunctionImport {
    pub fn new(name: impl Into<String>, function: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            function: function.into(),
            entity_set: None,
            include_in_service_document: false,
            title: None,
            annotations: Vec::new(),
        }
    }

    pub fn entity_set(mut self, set: impl Into<String>) -> Self {
        self.entity_set = Some(set.into());
        self
    }

    pub fn in_service_document(mut self) -> Self {
        self.include_in_service_document = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityContainer {
    pub name: FullQualifiedName,
    pub extends: Option<FullQualifiedName>,
    pub entity_sets: Vec<EntitySet>,
    pub singletons: Vec<Singleton>,
    pub action_imports: Vec<ActionImport>,
    pub function_imports: Vec<FunctionImport>,
    pub annotations: Vec<Annotation>,
}

impl EntityContainer {
    pub fn new(name: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            entity_sets: Vec::new(),
            singletons: Vec::new(),
            action_imports: Vec::new(),
            function_imports: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn entity_set(mut self, set: EntitySet) -> Self {
        self.entity_sets.push(set);
        self
    }

    pub fn singleton(mut self, singleton: Singleton) -> Self {
        self.singletons.push(singleton);
        self
    }

    pub fn action_import(mut self, import: ActionImport) -> Self {
        self.action_imports.push(import);
        self
    }

    pub fn function_import(mut self, import: FunctionImport) -> Self {
        self.function_imports.push(import);
        self
    }

    pub fn find_entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.iter().find(|s| s.name == name)
    }

    pub fn find_singleton(&self, name: &str) -> Option<&Singleton> {
        self.singletons.iter().find(|s| s.name == name)
    }
}

// ---------------------------------------------------------------------------
// Schema and references
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub namespace: String,
    pub alias: Option<String>,
    pub enum_types: Vec<EnumType>,
    pub type_definitions: Vec<TypeDefinition>,
    pub entity_types: Vec<StructuredType>,
    pub complex_types: Vec<StructuredType>,
    pub actions: Vec<EdmOperation>,
    pub functions: Vec<EdmOperation>,
    pub terms: Vec<Term>,
    pub entity_container: Option<EntityContainer>,
    pub annotation_groups: Vec<AnnotationGroup>,
    /// Annotations targeting the schema itself.
    pub annotations: Vec<Annotation>,
}

/// `edmx:Include` of a referenced document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmxInclude {
    pub namespace: String,
    pub alias: Option<String>,
}

/// `edmx:IncludeAnnotations` of a referenced document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmxIncludeAnnotations {
    pub term_namespace: String,
    pub qualifier: Option<String>,
    pub target_namespace: Option<String>,
}

/// External CSDL document referenced by the service metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct EdmxReference {
    pub uri: String,
    pub includes: Vec<EdmxInclude>,
    pub include_annotations: Vec<EdmxIncludeAnnotations>,
    pub annotations: Vec<Annotation>,
}

impl EdmxReference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            includes: Vec::new(),
            include_annotations: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn include(mut self, namespace: impl Into<String>, alias: Option<&str>) -> Self {
        self.includes.push(EdmxInclude {
            namespace: namespace.into(),
            alias: alias.map(str::to_string),
        });
        self
    }

    pub fn include_annotations(
        mut self,
        term_namespace: impl Into<String>,
        qualifier: Option<&str>,
        target_namespace: Option<&str>,
    ) -> Self {
        self.include_annotations.push(EdmxIncludeAnnotations {
            term_namespace: term_namespace.into(),
            qualifier: qualifier.map(str::to_string),
            target_namespace: target_namespace.map(str::to_string),
        });
        self
    }
}
