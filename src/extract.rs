//! Extraction engine: turns a Lingea result page into a `TranslationRecord`.
//!
//! The site renders every bilingual pair (collocations, idioms, full-text
//! samples) with a patterned class convention rather than named categories:
//! the wrapper's class ends in `2`, the source-language leaf's class ends in
//! `2s` and the target-language leaf's class ends in `2t`. Extraction keys on
//! those suffixes alone, so a new content category that follows the
//! convention is picked up without a code change. Word-level senses carry a
//! fixed class signature and are collected separately.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use thiserror::Error;

/// Class signature of a word-level sense span (`span.lex_ful_tran.w.l2`).
const SENSE_CLASSES: [&str; 3] = ["lex_ful_tran", "w", "l2"];

/// Class suffix marking a wrapper that holds one source/target pair.
const PAIR_WRAPPER_SUFFIX: &str = "2";
/// Class suffix of the source-language leaf inside a wrapper.
const PAIR_SOURCE_SUFFIX: &str = "2s";
/// Class suffix of the target-language leaf inside a wrapper.
const PAIR_TARGET_SUFFIX: &str = "2t";

/// One extracted lookup result.
///
/// `senses` and `examples` keep document order and may both be empty: a
/// well-formed page with no entry for the word is a valid empty result, not
/// a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    /// The word as the user requested it.
    pub word: String,
    /// Word-level translations, in document order.
    pub senses: Vec<String>,
    /// Bilingual example pairs, in document order.
    pub examples: Vec<ExamplePair>,
}

/// A source-language phrase paired with its target-language rendering.
///
/// `target` is empty when the wrapper carried no target leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamplePair {
    pub source: String,
    pub target: String,
}

/// The body could not be parsed into any traversable document tree.
#[derive(Debug, Error)]
#[error("document could not be parsed: {0}")]
pub struct MalformedDocument(#[from] std::io::Error);

/// Extract senses and example pairs from a dictionary result page.
///
/// `word` only populates the record; extraction itself is structural and
/// word-agnostic. Missing elements and attributes are treated as "no match",
/// never as errors.
pub fn extract(html: &str, word: &str) -> Result<TranslationRecord, MalformedDocument> {
    let dom = html_to_dom(html)?;

    let mut sense_nodes = Vec::new();
    find_descendants(&dom.document, &is_sense_node, &mut sense_nodes);
    let senses = sense_nodes.iter().map(node_text).collect();

    // All wrapper spans that hold a source/target pair, e.g. lex_ful_coll2,
    // lex_ful_samp2, lex_ful_idis2.
    let mut wrappers = Vec::new();
    find_descendants(&dom.document, &is_pair_wrapper, &mut wrappers);

    let mut examples = Vec::new();
    for wrapper in &wrappers {
        // First matching leaf only; wrappers without a source contribute
        // nothing, a missing target becomes an empty string.
        let source =
            match find_first_descendant(wrapper, &|n| has_class_suffix(n, PAIR_SOURCE_SUFFIX)) {
                Some(node) => node,
                None => continue,
            };
        let target = find_first_descendant(wrapper, &|n| has_class_suffix(n, PAIR_TARGET_SUFFIX));

        examples.push(ExamplePair {
            source: node_text(&source),
            target: target.as_ref().map(node_text).unwrap_or_default(),
        });
    }

    Ok(TranslationRecord {
        word: word.to_string(),
        senses,
        examples,
    })
}

/// Parse HTML text into a DOM.
fn html_to_dom(source: &str) -> Result<RcDom, MalformedDocument> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut source.as_bytes())?;
    Ok(dom)
}

/// Collect every descendant of `node` matching the predicate, in document
/// order.
fn find_descendants<F>(node: &Handle, matches: &F, found: &mut Vec<Handle>)
where
    F: Fn(&Handle) -> bool,
{
    for child in node.children.borrow().iter() {
        if matches(child) {
            found.push(child.clone());
        }
        find_descendants(child, matches, found);
    }
}

/// First descendant of `node` matching the predicate, depth-first.
fn find_first_descendant<F>(node: &Handle, matches: &F) -> Option<Handle>
where
    F: Fn(&Handle) -> bool,
{
    for child in node.children.borrow().iter() {
        if matches(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_first_descendant(child, matches) {
            return Some(found);
        }
    }
    None
}

fn is_span(node: &Handle) -> bool {
    match &node.data {
        NodeData::Element { name, .. } => &*name.local == "span",
        _ => false,
    }
}

/// Value of the node's `class` attribute, if it is an element and has one.
fn class_attr(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == "class")
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// `span.lex_ful_tran.w.l2`: a word-level sense.
fn is_sense_node(node: &Handle) -> bool {
    if !is_span(node) {
        return false;
    }
    match class_attr(node) {
        Some(classes) => {
            let names: Vec<&str> = classes.split_whitespace().collect();
            SENSE_CLASSES.iter().all(|c| names.contains(c))
        }
        None => false,
    }
}

/// A span whose class signature ends in `2` wraps one bilingual pair.
fn is_pair_wrapper(node: &Handle) -> bool {
    is_span(node)
        && class_attr(node)
            .map(|classes| classes.trim_end().ends_with(PAIR_WRAPPER_SUFFIX))
            .unwrap_or(false)
}

/// A span with any class name ending in the given suffix.
fn has_class_suffix(node: &Handle, suffix: &str) -> bool {
    is_span(node)
        && class_attr(node)
            .map(|classes| classes.split_whitespace().any(|name| name.ends_with(suffix)))
            .unwrap_or(false)
}

/// Visible text of a node's subtree with whitespace runs collapsed to a
/// single space and ends trimmed.
fn node_text(node: &Handle) -> String {
    let mut raw = String::new();
    collect_text(node, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(node: &Handle, out: &mut String) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                out.push(' ');
                out.push_str(&contents.borrow());
            }
            _ => collect_text(child, out),
        }
    }
}
