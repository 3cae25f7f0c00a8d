//! Property-based tests for the project model
//!
//! These tests use proptest to verify:
//! 1. Roundtrip property: serialize(parse(doc)) == doc for canonically laid out documents
//! 2. Insertion adds exactly one entry and never removes one
//! 3. Containment ignores the separator style and sees every depth

use proptest::prelude::*;

use ewpedit::{engine, parse, serialize};

#[derive(Clone, Debug)]
enum Item {
    Group(String, Vec<Item>),
    File(String),
}

fn arb_segment() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,6}"
}

/// Paths written with either separator
fn arb_path() -> impl Strategy<Value = String> {
    (prop::collection::vec(arb_segment(), 1..4), any::<bool>()).prop_map(|(parts, windows)| {
        let separator = if windows { "\\" } else { "/" };
        format!("{}.c", parts.join(separator))
    })
}

fn arb_item() -> impl Strategy<Value = Item> {
    let leaf = arb_path().prop_map(Item::File);
    leaf.prop_recursive(4, 48, 6, |inner| {
        (arb_segment(), prop::collection::vec(inner, 0..6))
            .prop_map(|(name, children)| Item::Group(name, children))
    })
}

fn arb_project() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(arb_item(), 0..6)
}

/// Render the way the writer lays out a project read without a declaration
fn render(items: &[Item]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project>");
    if !items.is_empty() {
        out.push('\n');
        for item in items {
            render_item(item, 1, &mut out);
        }
    }
    out.push_str("</project>");
    out
}

fn render_item(item: &Item, depth: usize, out: &mut String) {
    let pad = "    ".repeat(depth);
    match item {
        Item::File(path) => {
            out.push_str(&format!(
                "{pad}<file>\n{pad}    <name>{path}</name>\n{pad}</file>\n"
            ));
        }
        Item::Group(name, children) => {
            out.push_str(&format!("{pad}<group>\n{pad}    <name>{name}</name>\n"));
            for child in children {
                render_item(child, depth + 1, out);
            }
            out.push_str(&format!("{pad}</group>\n"));
        }
    }
}

fn paths(items: &[Item], found: &mut Vec<String>) {
    for item in items {
        match item {
            Item::File(path) => found.push(path.clone()),
            Item::Group(_, children) => paths(children, found),
        }
    }
}

proptest! {
    #[test]
    fn roundtrip_is_identity(items in arb_project()) {
        let text = render(&items);
        let project = parse(text.as_bytes()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let written = serialize(&project).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(String::from_utf8_lossy(&written), text);
    }

    #[test]
    fn every_stored_path_is_contained(items in arb_project()) {
        let project = parse(render(&items).as_bytes()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut stored = Vec::new();
        paths(&items, &mut stored);
        for path in stored {
            prop_assert!(engine::contains(&project, &path.replace('\\', "/")));
            prop_assert!(engine::contains(&project, &path.replace('/', "\\")));
        }
    }

    #[test]
    fn insert_adds_exactly_one_entry(items in arb_project(), candidate in arb_path()) {
        let project = parse(render(&items).as_bytes()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let was_present = engine::contains(&project, &candidate);
        let before = project.clone();

        let after = engine::insert(project, &candidate);

        prop_assert!(engine::contains(&after, &candidate));
        prop_assert_eq!(after.file_entries().count(), before.file_entries().count() + 1);
        prop_assert_eq!(after.nodes().get(..before.nodes().len()), Some(before.nodes()));
        if was_present {
            prop_assert!(before.file_entries().any(|f| f.path().as_str() == candidate.replace('\\', "/")));
        }

        let reparsed = parse(&serialize(&after).map_err(|e| TestCaseError::fail(e.to_string()))?)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(reparsed.nodes(), after.nodes());
    }

    #[test]
    fn add_is_idempotent(items in arb_project(), candidate in arb_path()) {
        let mut project = parse(render(&items).as_bytes()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        engine::add(&mut project, &candidate);
        let once = serialize(&project).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(engine::add(&mut project, &candidate), ewpedit::Outcome::AlreadyPresent);
        prop_assert_eq!(serialize(&project).map_err(|e| TestCaseError::fail(e.to_string()))?, once);
    }
}
