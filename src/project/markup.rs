//! Markup fallback reader
//!
//! Reads a descriptor as plain XML when the evaluation engine is unavailable.
//! Nothing is expanded: `$(Property)` references, conditions and imports are
//! taken literally. SDK-style projects get their implicit `**/*.cs` glob
//! approximated by a directory scan; legacy projects list every item
//! explicitly so their item lists are used as-is.

use super::paths::{resolve_include, scan_sources};
use super::query::QuerySet;
use super::{PackageReference, ProjectStyle};
use crate::config::ReaderConfig;
use crate::error::ProjectError;
use crate::fs::FileSystem;
use roxmltree::{Document, Node};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyProject {
    pub references: Vec<String>,
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkProject {
    /// Raw `Sdk` declaration, e.g. `Microsoft.NET.Sdk.Web`
    pub sdk: String,
    /// Explicit `Compile` includes followed by the directory scan
    pub sources: Vec<PathBuf>,
    pub target_frameworks: Vec<String>,
}

/// Result of a markup read. Fields a dialect does not model read as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum MarkupProject {
    Legacy(LegacyProject),
    Sdk(SdkProject),
}

impl MarkupProject {
    pub fn style(&self) -> ProjectStyle {
        match self {
            MarkupProject::Legacy(_) => ProjectStyle::Legacy,
            MarkupProject::Sdk(_) => ProjectStyle::Sdk,
        }
    }

    /// SDK projects resolve references through packages, so this is empty for them.
    pub fn references(&self) -> &[String] {
        match self {
            MarkupProject::Legacy(p) => &p.references,
            MarkupProject::Sdk(_) => &[],
        }
    }

    pub fn sources(&self) -> &[PathBuf] {
        match self {
            MarkupProject::Legacy(p) => &p.sources,
            MarkupProject::Sdk(p) => &p.sources,
        }
    }

    /// Legacy projects are single-targeted through `TargetFrameworkVersion`,
    /// which is not modelled, so this is empty for them.
    pub fn target_frameworks(&self) -> &[String] {
        match self {
            MarkupProject::Legacy(_) => &[],
            MarkupProject::Sdk(p) => &p.target_frameworks,
        }
    }

    /// Splits into `(references, sources, target_frameworks)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<PathBuf>, Vec<String>) {
        match self {
            MarkupProject::Legacy(p) => (p.references, p.sources, Vec::new()),
            MarkupProject::Sdk(p) => (Vec::new(), p.sources, p.target_frameworks),
        }
    }
}

pub struct MarkupReader<'a> {
    fs: &'a dyn FileSystem,
    config: &'a ReaderConfig,
}

impl<'a> MarkupReader<'a> {
    pub fn new(fs: &'a dyn FileSystem, config: &'a ReaderConfig) -> Self {
        Self { fs, config }
    }

    /// Reads references, sources and target frameworks from the descriptor at
    /// `path`, which must be absolute.
    pub fn read(&self, path: &Path) -> Result<MarkupProject, ProjectError> {
        let text = self.load(path)?;
        let doc = parse_document(path, &text)?;
        self.extract(path, &doc)
    }

    /// Reads only the package references of the descriptor at `path`.
    pub fn read_packages(&self, path: &Path) -> Result<Vec<PackageReference>, ProjectError> {
        let text = self.load(path)?;
        let doc = parse_document(path, &text)?;
        packages(path, &doc)
    }

    pub fn load(&self, path: &Path) -> Result<String, ProjectError> {
        self.fs
            .read_to_string(path)
            .map_err(|e| ProjectError::read(path, e))
    }

    pub fn extract(&self, path: &Path, doc: &Document) -> Result<MarkupProject, ProjectError> {
        let project_dir = path
            .parent()
            .ok_or_else(|| ProjectError::InvalidPath {
                path: path.to_path_buf(),
            })?;
        let root = doc.root_element();

        let project = match sdk_declaration(root) {
            Some(sdk) => {
                let mut sources = compile_includes(QuerySet::for_style(ProjectStyle::Sdk), root, project_dir);
                let explicit = sources.len();
                sources.extend(scan_sources(self.fs, project_dir, self.config)?);
                debug!(
                    path = %path.display(),
                    sdk = %sdk,
                    explicit,
                    scanned = sources.len() - explicit,
                    "Read SDK-style project markup"
                );

                MarkupProject::Sdk(SdkProject {
                    sdk: sdk.to_string(),
                    sources,
                    target_frameworks: target_frameworks(root),
                })
            }
            None => {
                let set = QuerySet::for_style(ProjectStyle::Legacy);
                let references: Vec<String> = set
                    .items(root, set.reference)
                    .filter_map(|n| n.attribute(set.include))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                let sources = compile_includes(set, root, project_dir);
                debug!(
                    path = %path.display(),
                    references = references.len(),
                    sources = sources.len(),
                    "Read legacy project markup"
                );

                MarkupProject::Legacy(LegacyProject {
                    references,
                    sources,
                })
            }
        };

        Ok(project)
    }
}

/// Parses descriptor text, tolerating a leading byte-order mark.
pub fn parse_document<'input>(
    path: &Path,
    text: &'input str,
) -> Result<Document<'input>, ProjectError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Document::parse(text).map_err(|source| ProjectError::MarkupLoad {
        path: path.to_path_buf(),
        source,
    })
}

pub fn detect_style(doc: &Document) -> ProjectStyle {
    if sdk_declaration(doc.root_element()).is_some() {
        ProjectStyle::Sdk
    } else {
        ProjectStyle::Legacy
    }
}

/// `<Project Sdk="...">`, or failing that a top-level `<Sdk Name="..."/>`
/// or `<Import Project="..." Sdk="..."/>`.
fn sdk_declaration<'a>(root: Node<'a, '_>) -> Option<&'a str> {
    let non_blank = |s: &'a str| Some(s.trim()).filter(|s| !s.is_empty());

    root.attribute("Sdk").and_then(non_blank).or_else(|| {
        root.children()
            .filter(|n| n.is_element())
            .find_map(|n| match n.tag_name().name() {
                "Sdk" => n.attribute("Name").and_then(non_blank),
                "Import" => n.attribute("Sdk").and_then(non_blank),
                _ => None,
            })
    })
}

fn compile_includes(set: QuerySet, root: Node, project_dir: &Path) -> Vec<PathBuf> {
    set.items(root, set.compile)
        .filter_map(|n| n.attribute(set.include))
        .flat_map(|include| include.split(';'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|include| resolve_include(project_dir, include))
        .collect()
}

fn target_frameworks(root: Node) -> Vec<String> {
    let set = QuerySet::for_style(ProjectStyle::Sdk);
    set.properties(root)
        .filter(|n| set.is_element(*n, set.target_framework) || set.is_element(*n, set.target_frameworks))
        .map(element_text)
        .flat_map(|value| {
            value
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Concatenated text content, skipping comments and processing instructions.
fn element_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// `PackageReference` items, matched by local name whatever the dialect or
/// namespace. Each needs a non-blank `Include` and a `Version` attribute or
/// child element; items that only `Update` or `Remove` an existing reference
/// are skipped.
pub fn packages(path: &Path, doc: &Document) -> Result<Vec<PackageReference>, ProjectError> {
    let set = QuerySet::for_style(ProjectStyle::Sdk);
    let mut packages = Vec::new();

    for node in set.items(doc.root_element(), set.package_reference) {
        if node.attribute(set.include).is_none()
            && (node.has_attribute("Update") || node.has_attribute("Remove"))
        {
            continue;
        }

        let name = non_blank(node.attribute(set.include))
            .ok_or_else(|| missing_attribute(path, doc, node, set.include))?;
        let version = non_blank(node.attribute(set.version))
            .map(str::to_string)
            .or_else(|| {
                node.children()
                    .find(|c| set.is_element(*c, set.version))
                    .map(element_text)
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| text.trim().to_string())
            })
            .ok_or_else(|| missing_attribute(path, doc, node, set.version))?;

        packages.push(PackageReference::new(name, version));
    }

    Ok(packages)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn missing_attribute(path: &Path, doc: &Document, node: Node, attribute: &str) -> ProjectError {
    let pos = doc.text_pos_at(node.range().start);
    ProjectError::MissingAttribute {
        path: path.to_path_buf(),
        element: node.tag_name().name().to_string(),
        attribute: attribute.to_string(),
        line: pos.row,
        column: pos.col,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    const LEGACY_PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <TargetFrameworkVersion>v4.7.2</TargetFrameworkVersion>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="System" />
    <Reference Include="System.Xml" />
  </ItemGroup>
  <ItemGroup>
    <Compile Include="Program.cs" />
    <Compile Include="Properties\AssemblyInfo.cs" />
  </ItemGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json">
      <Version>13.0.3</Version>
    </PackageReference>
  </ItemGroup>
</Project>"#;

    const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <TargetFrameworks>net6.0;net472</TargetFrameworks>
  </PropertyGroup>
  <ItemGroup>
    <Compile Include="..\Shared\Util.cs" />
    <Compile Remove="Legacy\**" />
    <PackageReference Include="Serilog" Version="2.12.0" />
    <PackageReference Update="Serilog" PrivateAssets="all" />
  </ItemGroup>
</Project>"#;

    fn config() -> ReaderConfig {
        ReaderConfig {
            evaluation_enabled: false,
            dotnet_path: PathBuf::from("dotnet"),
            source_extension: ".cs".to_string(),
            scan_exclude_dirs: vec![],
        }
    }

    #[test]
    fn test_legacy_project() {
        let fs = MockFileSystem::new();
        fs.add_file("App/App.csproj", LEGACY_PROJECT);
        fs.add_file("App/Unlisted.cs", "");
        let config = config();

        let project = MarkupReader::new(&fs, &config)
            .read(Path::new("/mock/App/App.csproj"))
            .unwrap();

        assert_eq!(project.style(), ProjectStyle::Legacy);
        assert_eq!(project.references(), ["System", "System.Xml"]);
        assert_eq!(
            project.sources(),
            [
                PathBuf::from("/mock/App/Program.cs"),
                PathBuf::from("/mock/App/Properties/AssemblyInfo.cs"),
            ]
        );
        assert!(project.target_frameworks().is_empty());
    }

    #[test]
    fn test_sdk_project_explicit_then_scanned_sources() {
        let fs = MockFileSystem::new();
        fs.add_file("src/App/App.csproj", SDK_PROJECT);
        fs.add_file("src/App/Program.cs", "");
        fs.add_file("src/App/Legacy/Old.cs", "");
        fs.add_file("src/Shared/Util.cs", "");
        let config = config();

        let project = MarkupReader::new(&fs, &config)
            .read(Path::new("/mock/src/App/App.csproj"))
            .unwrap();

        assert_eq!(project.style(), ProjectStyle::Sdk);
        assert!(project.references().is_empty());
        // Remove is not evaluated, so Legacy/Old.cs is still scanned.
        assert_eq!(
            project.sources(),
            [
                PathBuf::from("/mock/src/Shared/Util.cs"),
                PathBuf::from("/mock/src/App/Legacy/Old.cs"),
                PathBuf::from("/mock/src/App/Program.cs"),
            ]
        );
        assert_eq!(project.target_frameworks(), ["net6.0", "net472"]);
    }

    #[test]
    fn test_sdk_explicit_include_duplicates_scan() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "App.csproj",
            r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup><Compile Include="Program.cs" /></ItemGroup></Project>"#,
        );
        fs.add_file("Program.cs", "");
        let config = config();

        let project = MarkupReader::new(&fs, &config)
            .read(Path::new("/mock/App.csproj"))
            .unwrap();

        assert_eq!(
            project.sources(),
            [PathBuf::from("/mock/Program.cs"), PathBuf::from("/mock/Program.cs")]
        );
    }

    #[test]
    fn test_semicolon_separated_compile_include() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "App.csproj",
            r#"<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup><Compile Include="A.cs; B.cs;" /></ItemGroup>
</Project>"#,
        );
        let config = config();

        let project = MarkupReader::new(&fs, &config)
            .read(Path::new("/mock/App.csproj"))
            .unwrap();

        assert_eq!(
            project.sources(),
            [PathBuf::from("/mock/A.cs"), PathBuf::from("/mock/B.cs")]
        );
    }

    #[test]
    fn test_singular_and_plural_frameworks_in_document_order() {
        let doc = Document::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup><TargetFramework> net8.0 </TargetFramework></PropertyGroup>
  <PropertyGroup Condition="'$(CI)' == 'true'">
    <TargetFrameworks>net8.0;;netstandard2.0</TargetFrameworks>
  </PropertyGroup>
</Project>"#,
        )
        .unwrap();

        assert_eq!(
            target_frameworks(doc.root_element()),
            vec!["net8.0", "net8.0", "netstandard2.0"]
        );
    }

    #[test]
    fn test_unnamespaced_project_without_sdk_reads_as_empty_legacy() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "App.csproj",
            r#"<Project><ItemGroup><Compile Include="A.cs" /></ItemGroup></Project>"#,
        );
        let config = config();

        let project = MarkupReader::new(&fs, &config)
            .read(Path::new("/mock/App.csproj"))
            .unwrap();

        assert_eq!(project.style(), ProjectStyle::Legacy);
        assert!(project.sources().is_empty());
    }

    #[test]
    fn test_sdk_element_declaration() {
        let doc = Document::parse(
            r#"<Project><Sdk Name="Microsoft.Build.NoTargets" Version="3.7.0" /></Project>"#,
        )
        .unwrap();
        assert_eq!(detect_style(&doc), ProjectStyle::Sdk);
    }

    #[yare::parameterized(
        sdk_attribute = { r#"<Project Sdk="Microsoft.NET.Sdk.Web" />"#, ProjectStyle::Sdk },
        versioned_sdk = { r#"<Project Sdk="MSBuild.Sdk.Extras/3.0.44" />"#, ProjectStyle::Sdk },
        blank_sdk = { r#"<Project Sdk="  " />"#, ProjectStyle::Legacy },
        namespaced = { r#"<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003" />"#, ProjectStyle::Legacy },
        bare = { "<Project />", ProjectStyle::Legacy },
        import_sdk = { r#"<Project><Import Project="Sdk.props" Sdk="Microsoft.NET.Sdk" /></Project>"#, ProjectStyle::Sdk },
        import_without_sdk = { r#"<Project><Import Project="Common.props" /></Project>"#, ProjectStyle::Legacy },
    )]
    fn test_detect_style(xml: &str, expected: ProjectStyle) {
        let doc = Document::parse(xml).unwrap();
        assert_eq!(detect_style(&doc), expected);
    }

    #[test]
    fn test_packages_attribute_and_element_versions() {
        let doc = Document::parse(LEGACY_PROJECT).unwrap();
        let legacy = packages(Path::new("/mock/App.csproj"), &doc).unwrap();
        assert_eq!(legacy, vec![PackageReference::new("Newtonsoft.Json", "13.0.3")]);

        let doc = Document::parse(SDK_PROJECT).unwrap();
        let sdk = packages(Path::new("/mock/App.csproj"), &doc).unwrap();
        assert_eq!(sdk, vec![PackageReference::new("Serilog", "2.12.0")]);
    }

    #[test]
    fn test_package_without_version_fails() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <PackageReference Include="Serilog" />
  </ItemGroup>
</Project>"#;
        let doc = Document::parse(xml).unwrap();

        let err = packages(Path::new("/mock/App.csproj"), &doc).unwrap_err();
        match err {
            ProjectError::MissingAttribute {
                element,
                attribute,
                line,
                column,
                ..
            } => {
                assert_eq!(element, "PackageReference");
                assert_eq!(attribute, "Version");
                assert_eq!(line, 3);
                assert_eq!(column, 5);
            }
            other => panic!("Expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_import_sdk_project_is_scanned() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "App/App.csproj",
            r#"<Project>
  <Import Project="Sdk.props" Sdk="Microsoft.NET.Sdk" />
  <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
  <Import Project="Sdk.targets" Sdk="Microsoft.NET.Sdk" />
</Project>"#,
        );
        fs.add_file("App/Program.cs", "");
        let config = config();

        let project = MarkupReader::new(&fs, &config)
            .read(Path::new("/mock/App/App.csproj"))
            .unwrap();

        assert_eq!(project.style(), ProjectStyle::Sdk);
        assert_eq!(project.sources(), [PathBuf::from("/mock/App/Program.cs")]);
        assert_eq!(project.target_frameworks(), ["net8.0"]);
    }

    #[test]
    fn test_unnamespaced_project_packages_are_still_checked() {
        let doc = Document::parse(
            r#"<Project><ItemGroup><PackageReference Include="Serilog" /></ItemGroup></Project>"#,
        )
        .unwrap();

        let err = packages(Path::new("/mock/App.csproj"), &doc).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::MissingAttribute { ref attribute, .. } if attribute == "Version"
        ));

        let doc = Document::parse(
            r#"<Project><ItemGroup><PackageReference Include="Serilog" Version="3.1.1" /></ItemGroup></Project>"#,
        )
        .unwrap();
        assert_eq!(
            packages(Path::new("/mock/App.csproj"), &doc).unwrap(),
            vec![PackageReference::new("Serilog", "3.1.1")]
        );
    }

    #[test]
    fn test_comments_inside_property_values_are_ignored() {
        let doc = Document::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFrameworks><!-- keep in sync with CI -->net8.0;<!-- legacy -->net48</TargetFrameworks>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Polly"><Version><!-- pinned -->8.2.0</Version></PackageReference>
  </ItemGroup>
</Project>"#,
        )
        .unwrap();

        assert_eq!(target_frameworks(doc.root_element()), vec!["net8.0", "net48"]);
        assert_eq!(
            packages(Path::new("/mock/App.csproj"), &doc).unwrap(),
            vec![PackageReference::new("Polly", "8.2.0")]
        );
    }

    #[test]
    fn test_package_with_blank_name_fails() {
        let doc = Document::parse(
            r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup><PackageReference Include=" " Version="1.0.0" /></ItemGroup></Project>"#,
        )
        .unwrap();

        let err = packages(Path::new("/mock/App.csproj"), &doc).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::MissingAttribute { ref attribute, .. } if attribute == "Include"
        ));
    }

    #[test]
    fn test_malformed_markup() {
        let fs = MockFileSystem::new();
        fs.add_file("Broken.csproj", "<Project><ItemGroup></Project>");
        let config = config();

        let err = MarkupReader::new(&fs, &config)
            .read(Path::new("/mock/Broken.csproj"))
            .unwrap_err();
        assert!(matches!(err, ProjectError::MarkupLoad { .. }));
    }

    #[test]
    fn test_byte_order_mark_is_accepted() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "App.csproj",
            "\u{feff}<Project Sdk=\"Microsoft.NET.Sdk\"><ItemGroup><PackageReference Include=\"Dapper\" Version=\"2.1.0\" /></ItemGroup></Project>",
        );
        let config = config();

        let packages = MarkupReader::new(&fs, &config)
            .read_packages(Path::new("/mock/App.csproj"))
            .unwrap();
        assert_eq!(packages, vec![PackageReference::new("Dapper", "2.1.0")]);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let fs = MockFileSystem::new();
        let config = config();

        let err = MarkupReader::new(&fs, &config)
            .read(Path::new("/mock/Missing.csproj"))
            .unwrap_err();
        assert!(matches!(err, ProjectError::Read { .. }));
    }

    #[test]
    fn test_markup_project_serializes_with_style_tag() {
        let project = MarkupProject::Legacy(LegacyProject {
            references: vec!["System".to_string()],
            sources: vec![],
        });
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["style"], "legacy");
        assert_eq!(json["references"][0], "System");
    }
}
