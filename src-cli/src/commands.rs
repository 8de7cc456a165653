//! Command handlers for the equation workspace CLI

use anyhow::{Context, Result};
use canvas_model::{
    all_palette_categories, builtin_templates, symbols_for_category, Container, ContainerId,
    PaletteCategory, PlacedToken, Workspace,
};
use equation_engine::{Engine, SolveOutcome};
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Snapshots
// =============================================================================

/// On-disk workspace snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub containers: Vec<Container>,
    #[serde(default)]
    pub tokens: Vec<PlacedToken>,
}

/// Read and validate a workspace snapshot
pub fn load_workspace(path: &Path) -> Result<Workspace> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    let workspace = Workspace::from_parts(snapshot.containers, snapshot.tokens)?;
    tracing::debug!(
        "Loaded {} container(s), {} token(s) from {}",
        workspace.containers().len(),
        workspace.tokens().len(),
        path.display()
    );
    Ok(workspace)
}

/// Write a workspace back as a snapshot
pub fn save_workspace(path: &Path, workspace: &Workspace) -> Result<()> {
    let content = serde_json::to_string_pretty(workspace)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    Ok(())
}

pub fn parse_container_id(text: &str) -> Result<ContainerId> {
    ContainerId::from_string(text).with_context(|| format!("Invalid container id '{}'", text))
}

// =============================================================================
// DTOs
// =============================================================================

/// Rewritten container, as printed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteDto {
    pub container_id: String,
    pub expression: String,
    pub messages: Vec<String>,
}

/// One palette entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntryDto {
    pub category: String,
    pub id: String,
    pub text: String,
    pub kind: String,
}

fn category_name(category: PaletteCategory) -> String {
    match category {
        PaletteCategory::Math => "math".to_string(),
        PaletteCategory::Units(unit) => unit.to_string(),
        PaletteCategory::Conversions => "conversions".to_string(),
        PaletteCategory::Equations => "equations".to_string(),
    }
}

fn expression_of(workspace: &Workspace, container: ContainerId) -> String {
    let resolved = equation_engine::resolve(workspace.containers(), workspace.tokens());
    equation_engine::build(resolved.tokens(container).unwrap_or_default()).text
}

// =============================================================================
// Commands
// =============================================================================

pub fn solve(engine: &Engine<'_>, workspace: &Workspace) -> SolveOutcome {
    engine.solve(workspace)
}

/// Apply an operation container to its nearest equation
pub fn apply(engine: &Engine<'_>, workspace: &mut Workspace, operation: ContainerId) -> Result<RewriteDto> {
    let rewrite = engine.apply_operation(workspace, operation)?;
    Ok(RewriteDto {
        container_id: rewrite.container_id.to_string(),
        expression: rewrite.text(),
        messages: vec![rewrite.message],
    })
}

/// One simplification step, or every step up to the fixed point
pub fn simplify(
    engine: &Engine<'_>,
    workspace: &mut Workspace,
    container: ContainerId,
    all: bool,
) -> Result<RewriteDto> {
    let messages = if all {
        engine.simplify_all(workspace, container)?
    } else {
        vec![engine.simplify(workspace, container)?]
    };
    Ok(RewriteDto {
        container_id: container.to_string(),
        expression: expression_of(workspace, container),
        messages,
    })
}

/// Palette entries, optionally restricted to one category
pub fn palette(filter: Option<PaletteCategory>) -> Vec<PaletteEntryDto> {
    let categories = match filter {
        Some(category) => vec![category],
        None => all_palette_categories(),
    };

    let mut entries = Vec::new();
    for category in categories {
        let name = category_name(category);
        if category == PaletteCategory::Equations {
            entries.extend(builtin_templates().into_iter().map(|t| PaletteEntryDto {
                category: name.clone(),
                id: t.id.to_string(),
                text: t.notation.to_string(),
                kind: "template".to_string(),
            }));
            continue;
        }
        entries.extend(symbols_for_category(category).into_iter().map(|s| PaletteEntryDto {
            category: name.clone(),
            id: s.id.clone(),
            kind: s.kind.name().to_string(),
            text: s.text,
        }));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_model::{Symbol, UnitCategory, UnitTable};
    use equation_engine::EngineSettings;
    use tempfile::TempDir;

    fn sample() -> (Workspace, ContainerId) {
        let mut ws = Workspace::new();
        let id = ws.containers()[0].id;
        for symbol in [
            Symbol::variable("x"),
            Symbol::operator("+"),
            Symbol::number("0"),
            Symbol::equals(),
            Symbol::number("4"),
        ] {
            ws.append_symbol(id, symbol).unwrap();
        }
        (ws, id)
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("workspace.json");
        let (ws, _) = sample();

        save_workspace(&path, &ws).unwrap();
        assert_eq!(load_workspace(&path).unwrap(), ws);
    }

    #[test]
    fn test_invalid_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("workspace.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(load_workspace(&path).is_err());
        assert!(load_workspace(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_solve_and_simplify() {
        let settings = EngineSettings::default();
        let engine = Engine::new(UnitTable::builtin(), &settings);
        let (mut ws, id) = sample();

        assert_eq!(solve(&engine, &ws).result_text.as_deref(), Some("x = 4"));

        let dto = simplify(&engine, &mut ws, id, true).unwrap();
        assert_eq!(dto.expression, "x = 4");
        assert_eq!(dto.messages.len(), 1);
    }

    #[test]
    fn test_palette_filter() {
        let temperature = palette(Some(PaletteCategory::Units(UnitCategory::Temperature)));
        let texts: Vec<_> = temperature.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["\u{00B0}C", "\u{00B0}F", "K"]);

        let templates = palette(Some(PaletteCategory::Equations));
        assert!(templates.iter().all(|e| e.kind == "template"));
        assert!(!templates.is_empty());

        assert!(palette(None).len() > temperature.len() + templates.len());
    }

    #[test]
    fn test_parse_container_id() {
        let id = ContainerId::new();
        assert_eq!(parse_container_id(&id.to_string()).unwrap(), id);
        assert!(parse_container_id("nope").is_err());
    }
}
