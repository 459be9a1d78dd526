//! Applies a [`TranslationDictionary`] to a document.
//!
//! Injection works on a private copy of the input tree. Any error returns
//! before the copy is handed back, so a caller never sees a half-applied
//! document.

use std::collections::HashSet;

use crate::dictionary::TranslationDictionary;
use crate::dom::{Document, NodeId, parse_str, to_string};
use crate::error::{SvgError, SvgResult};
use crate::ids::IdRegistry;
use crate::language::normalize_language;
use crate::nested::nested_tspans_in;
use crate::options::InjectOptions;
use crate::stats::InjectionStats;
use crate::switch::{SVG_NS, SYSTEM_LANGUAGE, SwitchBlock, TextVariant, scan};
use crate::text::{fold_text, normalize_text, write_segments};

/// A transformed document with its counters.
#[derive(Debug, Clone)]
pub struct InjectOutput {
    pub document: Document,
    pub stats: InjectionStats,
}

impl InjectOutput {
    /// Serialized document: XML declaration, UTF-8, indented.
    pub fn to_xml(&self) -> String {
        to_string(&self.document)
    }
}

/// Insert, update or skip language variants in every switch of `doc`.
///
/// # Arguments
///
/// * `doc` - The target document; left untouched
/// * `dictionary` - Translations keyed the same way [`crate::extract`] keys them
/// * `options` - Overwrite, case folding and switch sorting
///
/// # Returns
///
/// * `Ok(InjectOutput)` - The transformed copy and its statistics
/// * `Err(SvgError::NoText)` - No switch in `doc` has a default text
/// * `Err(SvgError::StructuralIncompatibility)` - A translation's segment
///   count differs from the node it would be written into
/// * `Err(SvgError::NestedTspans)` - The node to clone or rewrite has a
///   `<tspan>` inside a `<tspan>`
pub fn inject(
    doc: &Document,
    dictionary: &TranslationDictionary,
    options: &InjectOptions,
) -> SvgResult<InjectOutput> {
    let blocks = scan(doc);
    if !blocks.iter().any(SwitchBlock::has_default) {
        return Err(SvgError::NoText);
    }

    let mut document = doc.clone();
    let mut registry = IdRegistry::from_document(&document);
    let mut stats = InjectionStats::default();

    for block in &blocks {
        let Some(default) = &block.default else {
            continue;
        };
        let key = match default.segments.first() {
            Some(first) => fold_text(first, options.case_insensitive),
            None => continue,
        };
        if key.is_empty() {
            continue;
        }
        let Some(translations) = dictionary.get(&key) else {
            tracing::debug!("No mapping for '{}'", key);
            continue;
        };
        stats.processed_switches += 1;

        let mut present: HashSet<String> = block
            .variants
            .iter()
            .filter_map(|variant| variant.language.as_deref())
            .map(normalize_language)
            .collect();

        for (language, segments) in translations {
            let normalized = normalize_language(language);
            if let Some(existing) = find_variant(block, &normalized) {
                if !options.overwrite {
                    stats.skipped_translations += 1;
                    continue;
                }
                check_nested(&document, existing.node, &key, language)?;
                check_segments(&key, language, existing.segments.len(), segments.len())?;
                if same_text(&existing.segments, segments) {
                    stats.skipped_translations += 1;
                    continue;
                }
                write_segments(&mut document, existing.node, segments);
                stats.updated_translations += 1;
            } else if present.contains(&normalized) {
                // Two dictionary spellings of one language; the first already landed.
                stats.skipped_translations += 1;
            } else {
                check_nested(&document, default.node, &key, language)?;
                check_segments(&key, language, default.segments.len(), segments.len())?;
                insert_variant(
                    &mut document,
                    block.node,
                    default,
                    language,
                    segments,
                    &mut registry,
                );
                present.insert(normalized);
                stats.inserted_translations += 1;
            }
        }
    }

    if options.sort_switch_texts {
        for block in &blocks {
            sort_switch_texts(&mut document, block.node);
        }
    }

    tracing::info!(
        "Processed {} switches: inserted {}, updated {}, skipped {}",
        stats.processed_switches,
        stats.inserted_translations,
        stats.updated_translations,
        stats.skipped_translations
    );

    Ok(InjectOutput { document, stats })
}

/// [`inject`] from SVG source text.
pub fn inject_str(
    source: &str,
    dictionary: &TranslationDictionary,
    options: &InjectOptions,
) -> SvgResult<InjectOutput> {
    let doc = parse_str(source)?;
    inject(&doc, dictionary, options)
}

fn find_variant<'a>(block: &'a SwitchBlock, normalized: &str) -> Option<&'a TextVariant> {
    block.variants.iter().find(|variant| {
        variant
            .language
            .as_deref()
            .is_some_and(|language| normalize_language(language) == normalized)
    })
}

fn check_segments(key: &str, language: &str, expected: usize, found: usize) -> SvgResult<()> {
    if expected == found {
        return Ok(());
    }
    tracing::warn!(
        "Segment count mismatch for '{}' [{}]: node has {}, translation has {}",
        key,
        language,
        expected,
        found
    );
    Err(SvgError::StructuralIncompatibility {
        key: key.to_string(),
        language: language.to_string(),
        expected,
        found,
    })
}

/// A `<tspan>` inside a `<tspan>` has no segment to map a translation to.
fn check_nested(doc: &Document, node: NodeId, key: &str, language: &str) -> SvgResult<()> {
    let nested = nested_tspans_in(doc, node);
    if nested.is_empty() {
        return Ok(());
    }
    tracing::warn!(
        "Nested tspan in '{}' [{}]: {}",
        key,
        language,
        nested[0].id.as_deref().unwrap_or("(no id)")
    );
    Err(SvgError::NestedTspans {
        key: key.to_string(),
        language: language.to_string(),
    })
}

fn same_text(current: &[String], replacement: &[String]) -> bool {
    current
        .iter()
        .zip(replacement)
        .all(|(a, b)| normalize_text(a) == normalize_text(b))
}

/// Clone the default node as a `language` variant and put it right before
/// the default. Every id inside the clone is reallocated.
fn insert_variant(
    doc: &mut Document,
    switch: NodeId,
    default: &TextVariant,
    language: &str,
    segments: &[String],
    registry: &mut IdRegistry,
) -> NodeId {
    let clone = doc.deep_clone(default.node);

    let mut nodes = vec![clone];
    nodes.extend(doc.descendants(clone));
    for node in nodes {
        let base = doc.attribute(node, "id").map(str::to_string);
        if let Some(id) = registry.allocate(base.as_deref(), language) {
            doc.set_attribute(node, "id", &id);
        }
    }

    doc.set_attribute(clone, SYSTEM_LANGUAGE, language);
    write_segments(doc, clone, segments);
    doc.insert_before(switch, clone, default.node);
    clone
}

/// Move `<text>` children without a language to the end of the switch.
fn sort_switch_texts(doc: &mut Document, switch: NodeId) {
    let defaults: Vec<NodeId> = doc
        .child_elements(switch, SVG_NS, "text")
        .into_iter()
        .filter(|&text| {
            doc.attribute(text, SYSTEM_LANGUAGE)
                .is_none_or(|language| language.trim().is_empty())
        })
        .collect();
    for text in defaults {
        doc.append_child(switch, text);
    }
}
