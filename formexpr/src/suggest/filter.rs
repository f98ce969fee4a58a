//! Narrowing the suggestion set for a partially typed expression

use std::cmp::Ordering;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use once_cell::sync::Lazy;
use regex::Regex;

use super::VariableSuggestion;
use crate::config::SuggestionConfig;

/// `base[N]`, for drilling into a specific array element
static INDEXED_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)\[(\d+)\]$").unwrap());

/// Suggestions relevant to `partial`, the text typed so far.
///
/// - Inside an unclosed call (`concat(a, us`), variables narrowed by the
///   current argument.
/// - After a trailing `.`, the direct children of that object, or an
///   indexed access for an array. `items[2].` lists the element's
///   properties.
/// - Otherwise prefix matches, ranked; with no prefix match, fuzzy matches.
pub fn filter_suggestions(
    all: &[VariableSuggestion],
    partial: &str,
    config: &SuggestionConfig,
) -> Vec<VariableSuggestion> {
    let partial = partial.trim_start();
    let partial = partial.strip_prefix("${").unwrap_or(partial);

    let mut result = match open_call_argument(partial) {
        Some(argument) => {
            let variables: Vec<VariableSuggestion> =
                all.iter().filter(|s| !s.is_function).cloned().collect();
            if argument.is_empty() {
                variables
            } else {
                match_fragment(&variables, argument, config)
            }
        }
        None => match_fragment(all, partial.trim(), config),
    };

    if let Some(limit) = config.limit {
        result.truncate(limit);
    }
    result
}

fn match_fragment(
    all: &[VariableSuggestion],
    fragment: &str,
    config: &SuggestionConfig,
) -> Vec<VariableSuggestion> {
    match fragment.strip_suffix('.') {
        Some(base) => drill_down(all, base),
        None => prefix_or_fuzzy(all, fragment, config),
    }
}

/// Text of the argument being typed when the cursor sits inside an
/// unclosed call, `None` otherwise
fn open_call_argument(partial: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut argument_start = None;

    for (i, c) in partial.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => {
                    depth += 1;
                    argument_start = Some(i + 1);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    argument_start = None;
                }
                ',' if depth > 0 => argument_start = Some(i + 1),
                _ => {}
            },
        }
    }

    if depth == 0 {
        return None;
    }
    argument_start.map(|start| partial[start..].trim())
}

/// Children of `base`: object properties, an indexed access for an array,
/// or the properties of one array element for `base[N]`
fn drill_down(all: &[VariableSuggestion], base: &str) -> Vec<VariableSuggestion> {
    if let Some(caps) = INDEXED_PATH.captures(base) {
        let array = &caps[1];
        let sample = format!("{}[0]", array);
        // Suggestions only exist for element 0; re-root them on the requested index
        return direct_children(all, &sample)
            .into_iter()
            .map(|mut s| {
                s.expr = format!("{}{}", base, &s.expr[sample.len()..]);
                s
            })
            .collect();
    }

    let Some(parent) = all.iter().find(|s| !s.is_function && s.expr == base) else {
        return Vec::new();
    };

    match &parent.array_info {
        Some(info) => all
            .iter()
            .filter(|s| s.expr == info.sample_access)
            .cloned()
            .collect(),
        None => direct_children(all, base),
    }
}

/// Suggestions exactly one `.key` below `parent`
fn direct_children(all: &[VariableSuggestion], parent: &str) -> Vec<VariableSuggestion> {
    all.iter()
        .filter(|s| {
            s.expr
                .strip_prefix(parent)
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|key| !key.is_empty() && !key.contains(['.', '[']))
        })
        .cloned()
        .collect()
}

fn prefix_or_fuzzy(
    all: &[VariableSuggestion],
    fragment: &str,
    config: &SuggestionConfig,
) -> Vec<VariableSuggestion> {
    let mut matches: Vec<VariableSuggestion> = all
        .iter()
        .filter(|s| s.expr.starts_with(fragment))
        .cloned()
        .collect();

    if matches.is_empty() && config.fuzzy_fallback && !fragment.is_empty() {
        return fuzzy(all, fragment);
    }

    matches.sort_by(|a, b| rank(a, b, fragment));
    matches
}

/// Exact match first, then shallower paths, then variables before
/// functions, then alphabetical
fn rank(a: &VariableSuggestion, b: &VariableSuggestion, fragment: &str) -> Ordering {
    (b.expr == fragment)
        .cmp(&(a.expr == fragment))
        .then_with(|| a.depth().cmp(&b.depth()))
        .then_with(|| a.is_function.cmp(&b.is_function))
        .then_with(|| a.expr.cmp(&b.expr))
}

fn fuzzy(all: &[VariableSuggestion], fragment: &str) -> Vec<VariableSuggestion> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(&VariableSuggestion, i64)> = all
        .iter()
        .filter_map(|s| matcher.fuzzy_match(&s.expr, fragment).map(|score| (s, score)))
        .collect();

    // Sort by score descending
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.expr.cmp(&b.0.expr)));
    log::trace!("Fuzzy fallback for {:?}: {} matches", fragment, scored.len());
    scored.into_iter().map(|(s, _)| s.clone()).collect()
}
