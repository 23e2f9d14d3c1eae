// crates/pax-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared helpers for pax-core integration tests.
// Purpose: Provide result-based assertions and the sample node tree.
// Dependencies: pax_core
// ============================================================================

//! Shared helpers for pax-core integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]

use pax_core::Document;

/// Result type for tests that report failures as messages.
pub type TestResult = Result<(), String>;

/// Fails with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into()) }
}

/// Builds the sample tree: root, three children, attributes and nested child4.
pub fn sample_tree() -> Document {
    let mut document = Document::new("root");
    let mut root = document.root_mut();
    root.add_child("child1");
    root.add_child("child2");
    root.attach(Document::new("child3"));
    if let Some(mut child2) = root.child_mut("child2") {
        child2.attributes_mut().add("is", Some("active"));
    }
    if let Some(mut child3) = root.child_mut("child3") {
        child3.attributes_mut().add("is", Some("inactive"));
    }
    if let Some(mut child1) = root.child_mut("child1") {
        child1.add_child("child4");
        if let Some(mut child4) = child1.child_mut("child4") {
            child4.attributes_mut().add("is", Some("active"));
        }
    }
    document
}

/// Builds a five-level library tree with attributes, values and repeats.
pub fn library_tree() -> Document {
    let mut document = Document::new("library");
    let mut library = document.root_mut();
    library.attributes_mut().add("name", Some("City Library"));
    library.attributes_mut().add("location", Some("Downtown"));
    for (id, title) in [("1", "Dune"), ("2", "Clean Code")] {
        let mut book = Document::new("book");
        let mut book_root = book.root_mut();
        book_root.attributes_mut().add("id", Some(id));
        book_root.add_child_value("title", title);
        book_root.add_child_value("pages", "412");
        book_root.add_child_value("available", "true");
        let mut chapter = Document::new("chapter");
        let mut chapter_root = chapter.root_mut();
        chapter_root.attributes_mut().add("number", Some("1"));
        let mut section = Document::new("section");
        section.root_mut().add_child_value("paragraph", "First paragraph");
        section.root_mut().add_child_value("paragraph", "Second paragraph");
        chapter_root.attach(section);
        book_root.attach(chapter);
        library.attach(book);
    }
    document
}
