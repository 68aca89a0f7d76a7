//! End-to-end scans: rule file text in, matches, annotations and targets out.

use linkweave_core::{LinkerSettings, RuleFile, TextRange};
use linkweave_engine::{
    ActiveDocument, HostInfo, LinkEngine, ResolvedTarget, ScanResult, VariableContext,
};
use std::collections::HashMap;
use std::path::Path;

const RULES: &str = r#"{
    "links": [
        {
            "name": "Issue",
            "type": "url",
            "target": "https://tracker.example.com/issues/${1}",
            "patterns": [{"type": "regex", "value": "ISSUE-(\\d+)", "highlightGroup": 1}]
        },
        {
            "name": "Config File",
            "type": "file",
            "target": "${workspaceFolder}/config.json",
            "patterns": [{"type": "text", "value": "config.json", "fileExtensions": [".ts"]}]
        }
    ]
}"#;

const DOCUMENT: &str = "// Config lives in config.json (see ISSUE-101)
// @link [#loadConfig](#:src/config.ts)
function loadConfig() {}
/* @link [#VERSION](https://semver.org) */
const VERSION = \"1.0\";";

fn render(scan: &ScanResult<'_>, engine: &LinkEngine, ctx: &VariableContext<'_>) -> String {
    let mut lines = Vec::new();
    for m in &scan.matches {
        let target = engine
            .targets()
            .resolve_target(m, ctx)
            .map(|t| t.to_string())
            .unwrap_or_else(|e| e.to_string());
        lines.push(format!(
            "{} {}..{} {:?} -> {}",
            m.rule.name, m.range.start, m.range.end, m.highlighted_text, target
        ));
    }
    for a in &scan.annotations {
        lines.push(format!(
            "L{} #{} {}..{} -> {}",
            a.line_number, a.anchor, a.code_range.start, a.code_range.end, a.href
        ));
    }
    lines.join("\n")
}

#[test]
fn test_scan_typescript_document() {
    let rules = RuleFile::parse(RULES).unwrap();
    let engine = LinkEngine::new(&LinkerSettings::default(), rules);

    let workspace = Path::new("/ws");
    let document = ActiveDocument::new("/ws/src/main.ts");
    let env: HashMap<String, String> = HashMap::new();
    let host = HostInfo::default();
    let ctx = VariableContext::new(&env, &host)
        .with_workspace(workspace)
        .with_document(&document);

    let scan = engine.scan(DOCUMENT, Some(document.path.as_path()), Some(workspace));

    insta::assert_snapshot!(render(&scan, &engine, &ctx), @r#"
    Issue 42..45 "101" -> https://tracker.example.com/issues/101
    Config File 19..30 "config.json" -> /ws/config.json
    L5 #VERSION 161..168 -> https://semver.org
    L3 #loadConfig 96..106 -> /ws/src/config.ts
    L5 #VERSION 161..168 -> https://semver.org
    "#);
}

#[test]
fn test_extension_filter_follows_document() {
    let rules = RuleFile::parse(RULES).unwrap();
    let engine = LinkEngine::new(&LinkerSettings::default(), rules);

    let scan = engine.scan(DOCUMENT, Some(Path::new("/ws/notes.md")), Some(Path::new("/ws")));
    let names: Vec<_> = scan.matches.iter().map(|m| m.rule.name.as_str()).collect();
    assert_eq!(names, vec!["Issue"]);

    let scan = engine.scan(DOCUMENT, None, None);
    assert_eq!(scan.matches.len(), 1);
}

#[test]
fn test_ranges_stay_in_bounds() {
    let rules = RuleFile::parse(RULES).unwrap();
    let engine = LinkEngine::new(&LinkerSettings::default(), rules);
    let scan = engine.scan(DOCUMENT, Some(Path::new("/ws/src/main.ts")), Some(Path::new("/ws")));

    let whole = TextRange::new(0, DOCUMENT.len());
    assert!(scan.matches.iter().all(|m| m.range.is_within(&whole)));
    for a in &scan.annotations {
        assert!(a.comment_range.is_within(&whole));
        assert_eq!(&DOCUMENT[a.code_range.start..a.code_range.end], a.code_text);
        assert_eq!(&DOCUMENT[a.comment_range.start..a.comment_range.end], a.comment_text);
    }
}

#[test]
fn test_disabled_settings() {
    let rules = RuleFile::parse(RULES).unwrap();

    let settings = LinkerSettings {
        enabled: false,
        ..LinkerSettings::default()
    };
    let engine = LinkEngine::new(&settings, rules.clone());
    assert!(engine.scan(DOCUMENT, None, None).is_empty());

    let settings = LinkerSettings {
        enable_inline_links: false,
        ..LinkerSettings::default()
    };
    let engine = LinkEngine::new(&settings, rules);
    let scan = engine.scan(DOCUMENT, Some(Path::new("/ws/src/main.ts")), None);
    assert_eq!(scan.matches.len(), 2);
    assert!(scan.annotations.is_empty());
}

#[test]
fn test_custom_prefixes_and_tag_from_settings() {
    let settings: LinkerSettings = serde_json::from_str(
        r#"{
            "inline_link_pattern": "@see\\s+(?<anchor>\\w+)\\s+(?<link>\\S+)",
            "path_prefixes": {"@/": {"base": "workspace", "description": "Project root"}}
        }"#,
    )
    .unwrap();
    let engine = LinkEngine::new(&settings, Vec::new());

    let text = "// @see handler @/src/handler.rs\nfn handler() {}";
    let scan = engine.scan(text, Some(Path::new("/ws/src/main.rs")), Some(Path::new("/ws")));
    assert_eq!(scan.annotations.len(), 1);
    assert_eq!(scan.annotations[0].href, "/ws/src/handler.rs");

    assert_eq!(engine.paths().available_prefixes(), vec!["@/"]);
    assert!(!engine.paths().has_prefix("#:x"));
}

#[test]
fn test_update_rules_and_inline_flag() {
    let mut engine = LinkEngine::new(&LinkerSettings::default(), Vec::new());
    assert!(engine.scan(DOCUMENT, None, None).matches.is_empty());

    let mut rules = RuleFile::parse(RULES).unwrap();
    rules[0].show_inline = Some(false);
    engine.update_rules(rules);

    assert_eq!(engine.rules().len(), 2);
    assert!(!engine.shows_inline(&engine.rules()[0]));
    assert!(engine.shows_inline(&engine.rules()[1]));
}

#[test]
fn test_annotation_targets() {
    let engine = LinkEngine::new(&LinkerSettings::default(), Vec::new());
    let scan = engine.scan(DOCUMENT, Some(Path::new("/ws/src/main.ts")), Some(Path::new("/ws")));

    let targets: Vec<_> = scan
        .annotations
        .iter()
        .map(|a| ResolvedTarget::from_href(&a.href))
        .collect();
    assert!(targets[0].is_url());
    assert!(matches!(
        &targets[1],
        ResolvedTarget::File { path, is_text: true, .. } if path == Path::new("/ws/src/config.ts")
    ));
}
