//! Subcommand implementations

use std::path::Path;

use anyhow::{Context, Result, bail};

use geolink_core::{
    AngleUnit, DocumentNode, Element, EulerOrder, ExportOptions, ImportOptions, PoseOptions,
    PoseRecord, Project, accumulate_poses, export_text, find_part_with_components, find_topmost,
    import_components, parse, require,
};
use geolink_onshape::{
    DocumentRef, OnshapeClient, WorkspaceKind, export_records, occurrence_notation,
};

fn read_document(file: &Path) -> Result<Element> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let document = parse(&text).with_context(|| format!("Failed to parse {}", file.display()))?;
    Ok(document)
}

fn pose_options(degrees: bool, order: EulerOrder) -> PoseOptions {
    let unit = if degrees {
        AngleUnit::Degrees
    } else {
        AngleUnit::Radians
    };
    PoseOptions::new(unit, order)
}

/// Locate the traversal root and accumulate its poses
fn document_poses(
    document: &Element,
    options: &PoseOptions,
    root: Option<&str>,
) -> Result<Vec<PoseRecord>> {
    let root = match root {
        Some(name) => require(
            find_topmost(document, |node: &Element| {
                node.as_part().is_some() && node.name() == Some(name)
            }),
            &format!("part '{name}'"),
        )?,
        None => require(
            find_part_with_components(document)?,
            "a part containing typed components",
        )?,
    };
    tracing::debug!(root = ?root.name(), "traversal root");
    Ok(accumulate_poses(root, options)?)
}

pub fn poses(file: &Path, degrees: bool, order: EulerOrder, root: Option<&str>) -> Result<()> {
    let document = read_document(file)?;
    let records = document_poses(&document, &pose_options(degrees, order), root)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

pub fn normalize(file: &Path, package: &str, project_path: Option<&Path>) -> Result<()> {
    let document = read_document(file)?;
    let imported = import_components(&document, &ImportOptions::default())?;

    let text = export_text(
        &imported.tree,
        &imported.root,
        &ExportOptions::with_package(package),
    )?;
    print!("{text}");

    if let Some(path) = project_path {
        Project::with_tree(package, imported.tree).save(path)?;
    }
    Ok(())
}

pub fn export(file: &Path, target: &str, degrees: bool, order: EulerOrder) -> Result<()> {
    let target = DocumentRef::parse(target)?;
    let document = read_document(file)?;
    let options = geolink_onshape::ExportOptions {
        pose: pose_options(degrees, order),
        ..Default::default()
    };
    let records = document_poses(&document, &options.pose, None)?;

    let mut client = OnshapeClient::from_env()?;
    let exported = export_records(&mut client, &target, &records, &options)?;
    tracing::info!(count = exported.len(), target = %target, "export finished");
    Ok(())
}

/// Print occurrence poses as JSON, or as notation under `notation_root`
pub fn occurrences(target: &str, order: EulerOrder, notation_root: Option<&str>) -> Result<()> {
    let target = DocumentRef::parse(target)?;
    let client = OnshapeClient::from_env()?;
    let poses = client.list_occurrences(&target, order)?;
    match notation_root {
        Some(root_name) => print!("{}", occurrence_notation(&poses, root_name, order)),
        None => println!("{}", serde_json::to_string_pretty(&poses)?),
    }
    Ok(())
}

pub fn create_assembly(document: &str, name: &str) -> Result<()> {
    let document = workspace_of(document)?;
    let client = OnshapeClient::from_env()?;
    let created = client.create_assembly(&document.document_id, &document.workspace_id, name)?;
    println!("{created}");
    Ok(())
}

/// Assemblies can only be created in a workspace, never in a version
fn workspace_of(url: &str) -> Result<DocumentRef> {
    let document = DocumentRef::parse(url)?;
    if document.kind != WorkspaceKind::Workspace {
        bail!("{url} does not point into a workspace");
    }
    Ok(document)
}
