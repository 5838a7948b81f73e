use std::fmt::Write as _;

use anyhow::{Context, Result};
use colored::Colorize;
use plexy_core::session::ParsedSession;
use plexy_core::{SessionDocument, SessionStore};

use super::CliContext;

pub fn show(ctx: &CliContext, json: bool) -> Result<()> {
    let store = ctx.session_store()?;
    let Some(parsed) = load_parsed(&store)? else {
        println!("No saved session at {}", store.path().display());
        return Ok(());
    };

    if let Some(error) = &parsed.error {
        eprintln!("{} {}", "warning:".yellow().bold(), error);
    }

    if json {
        let text = serde_json::to_string_pretty(&parsed.document)
            .context("Failed to render session as JSON")?;
        println!("{}", text);
    } else {
        print!("{}", render_summary(&parsed.document));
    }

    Ok(())
}

pub fn validate(ctx: &CliContext) -> Result<()> {
    let store = ctx.session_store()?;
    let Some(parsed) = load_parsed(&store)? else {
        println!("No saved session at {}", store.path().display());
        return Ok(());
    };

    if let Some(error) = parsed.error {
        anyhow::bail!(
            "{} is malformed ({} entries readable): {}",
            store.path().display(),
            parsed.document.len(),
            error
        );
    }

    println!(
        "{} {} ({} entries)",
        "valid".green().bold(),
        store.path().display(),
        parsed.document.len()
    );
    Ok(())
}

pub fn normalize(ctx: &CliContext) -> Result<()> {
    let store = ctx.session_store()?;

    // Parse and rewrite under the store's lock so a running desktop cannot
    // save in between.
    let mut outcome = None;
    store
        .update(|current| {
            let parsed = SessionDocument::parse_xml(&current?);
            match parsed.document.to_xml() {
                Ok(xml) => {
                    outcome = Some(Ok((parsed.document.len(), parsed.error)));
                    Some(xml)
                }
                Err(e) => {
                    outcome = Some(Err(e));
                    None
                }
            }
        })
        .context("Failed to rewrite session")?;

    let Some(outcome) = outcome else {
        println!("No saved session at {}", store.path().display());
        return Ok(());
    };
    let (entries, error) = outcome.context("Failed to serialize session")?;

    if let Some(error) = error {
        eprintln!(
            "{} dropped unreadable content: {}",
            "warning:".yellow().bold(),
            error
        );
    }

    println!("Normalized {} ({} entries)", store.path().display(), entries);
    Ok(())
}

pub fn reset(ctx: &CliContext) -> Result<()> {
    let store = ctx.session_store()?;
    store.clear().context("Failed to remove session")?;
    println!("Removed {}", store.path().display());
    Ok(())
}

fn load_parsed(store: &impl SessionStore) -> Result<Option<ParsedSession>> {
    let xml = store.load().context("Failed to read session")?;
    Ok(xml.map(|xml| SessionDocument::parse_xml(&xml)))
}

/// Human-readable listing of the session entries.
fn render_summary(document: &SessionDocument) -> String {
    let mut out = String::new();

    if document.is_empty() {
        out.push_str("Session is empty\n");
        return out;
    }

    for entry in document.entries() {
        let _ = write!(out, "{}", entry.controller_name.bold());
        if let Some(rect) = entry.geometry {
            let _ = write!(
                out,
                " at {},{} size {}x{}",
                rect.x, rect.y, rect.width, rect.height
            );
        }
        out.push('\n');

        if let Some(args) = &entry.arguments {
            for (key, value) in args {
                let _ = writeln!(out, "  arg {} = {}", key, value);
            }
        }
        for location in &entry.locations {
            let _ = writeln!(
                out,
                "  widget {} at {},{}",
                location.widget_id, location.position.x, location.position.y
            );
        }
        for state in &entry.states {
            let label = if state.closed {
                "closed".red()
            } else {
                "open".green()
            };
            let _ = writeln!(out, "  widget {} {}", state.widget_id, label);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexy_core::{Point, Rect};
    use plexy_infrastructure::FileSessionStore;
    use tempfile::TempDir;

    fn sample() -> SessionDocument {
        let mut document = SessionDocument::new();
        document.append_controller_rect("clock", Rect::new(10.0, 20.0, 200.0, 100.0));
        document.set_argument("clock", "zone", "UTC");
        document.set_widget_location("clock", Point::new(5.0, 7.5), "face");
        document.set_widget_state("clock", "alarm", true);
        document
    }

    fn context_with_session(temp_dir: &TempDir, xml: &str) -> CliContext {
        FileSessionStore::new(temp_dir.path().join("session.xml"))
            .save(xml)
            .unwrap();
        CliContext::new(Some(temp_dir.path().to_path_buf()))
    }

    #[test]
    fn test_render_summary() {
        let text = render_summary(&sample());

        assert!(text.contains(" at 10,20 size 200x100"));
        assert!(text.contains("  arg zone = UTC"));
        assert!(text.contains("  widget face at 5,7.5"));
        assert!(text.contains("  widget alarm "));
    }

    #[test]
    fn test_render_empty_summary() {
        assert_eq!(render_summary(&SessionDocument::new()), "Session is empty\n");
    }

    #[test]
    fn test_validate_rejects_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_with_session(
            &temp_dir,
            "<session><widget controller=\"clock\"></session>",
        );

        assert!(validate(&ctx).is_err());
    }

    #[test]
    fn test_validate_accepts_clean_file() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_with_session(&temp_dir, &sample().to_xml().unwrap());

        validate(&ctx).unwrap();
    }

    #[test]
    fn test_normalize_rewrites_salvaged_document() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_with_session(
            &temp_dir,
            "<session>\n<widget controller=\"clock\"/>\n<widget controller=\"notes\"><geometry",
        );

        normalize(&ctx).unwrap();

        let store = ctx.session_store().unwrap();
        let parsed = SessionDocument::parse_xml(&store.load().unwrap().unwrap());
        assert!(parsed.is_clean());
        assert!(parsed.document.contains_controller("clock"));
        validate(&ctx).unwrap();
    }

    #[test]
    fn test_session_commands_leave_no_config_behind() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_with_session(&temp_dir, &sample().to_xml().unwrap());

        show(&ctx, false).unwrap();
        validate(&ctx).unwrap();

        assert!(!temp_dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_normalize_without_session_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = CliContext::new(Some(temp_dir.path().to_path_buf()));

        normalize(&ctx).unwrap();

        assert!(!temp_dir.path().join("session.xml").exists());
    }

    #[test]
    fn test_reset_removes_session() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_with_session(&temp_dir, &sample().to_xml().unwrap());

        reset(&ctx).unwrap();

        assert!(ctx.session_store().unwrap().load().unwrap().is_none());
        reset(&ctx).unwrap();
    }
}
