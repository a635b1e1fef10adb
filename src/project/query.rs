//! Typed structural queries over a parsed descriptor.
//!
//! Element names for each dialect live in a [`QuerySet`] instead of being
//! spelled out at every call site. The legacy set requires the MSBuild 2003
//! namespace; the SDK set matches on local name only, so an SDK project that
//! still carries the old `xmlns` reads the same.

use super::ProjectStyle;
use roxmltree::Node;

pub const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySet {
    /// Required namespace; `None` accepts any
    pub namespace: Option<&'static str>,
    pub property_group: &'static str,
    pub item_group: &'static str,
    pub compile: &'static str,
    pub reference: &'static str,
    pub package_reference: &'static str,
    pub target_framework: &'static str,
    pub target_frameworks: &'static str,
    pub include: &'static str,
    pub version: &'static str,
}

pub const LEGACY: QuerySet = QuerySet {
    namespace: Some(MSBUILD_NAMESPACE),
    ..SDK
};

pub const SDK: QuerySet = QuerySet {
    namespace: None,
    property_group: "PropertyGroup",
    item_group: "ItemGroup",
    compile: "Compile",
    reference: "Reference",
    package_reference: "PackageReference",
    target_framework: "TargetFramework",
    target_frameworks: "TargetFrameworks",
    include: "Include",
    version: "Version",
};

impl QuerySet {
    pub fn for_style(style: ProjectStyle) -> Self {
        match style {
            ProjectStyle::Sdk => SDK,
            ProjectStyle::Legacy => LEGACY,
        }
    }

    pub fn is_element(&self, node: Node, local_name: &str) -> bool {
        if !node.is_element() || node.tag_name().name() != local_name {
            return false;
        }
        match self.namespace {
            Some(ns) => node.tag_name().namespace() == Some(ns),
            None => true,
        }
    }

    /// Items of `kind` in every item group of the document, in document
    /// order. Groups nested in `Choose`/`When`/`Target` are included.
    pub fn items<'a, 'input>(
        self,
        root: Node<'a, 'input>,
        kind: &'static str,
    ) -> impl Iterator<Item = Node<'a, 'input>> {
        root.descendants()
            .filter(move |n| self.is_element(*n, self.item_group))
            .flat_map(move |group| {
                group
                    .children()
                    .filter(move |n| self.is_element(*n, kind))
            })
    }

    /// Elements anywhere below the root's direct `PropertyGroup` children.
    pub fn properties<'a, 'input>(
        self,
        root: Node<'a, 'input>,
    ) -> impl Iterator<Item = Node<'a, 'input>> {
        root.children()
            .filter(move |n| self.is_element(*n, self.property_group))
            .flat_map(|group| group.descendants().skip(1).filter(|n| n.is_element()))
    }
}
