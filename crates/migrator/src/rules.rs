//! Legacy condition parsing and rule compilation.
//!
//! Legacy colour components are "first match wins, else default" lists; the
//! compiled form groups them per source property so each group reads as one
//! declarative rule.

use std::collections::HashSet;

use foundation::IdSource;

use crate::error::MigrateError;
use crate::legacy::{ColorItem, Condition, LegacyComponent, LegacyField, Literal, TitledCondition};
use crate::schema::{Preset, Rule, RuleCondition};

/// Sentinel value meaning "no filter" in visibility rules.
pub const DISPLAY_ALL: &str = "$DISPLAY_ALL$";

/// Strips a `${...}` template wrapper; literal operands pass through.
pub fn property_name(operand: &str) -> &str {
    operand
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(operand)
}

/// Strips one matching pair of surrounding single or double quotes.
pub fn remove_quote(value: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    value
}

/// A leading item whose operand is literally `true` is the default branch.
pub fn is_default_condition(condition: &Condition) -> bool {
    condition.operand.is_true()
}

/// `true === true`: a component with no real branching.
pub fn check_is_single_value(condition: &Condition) -> bool {
    condition.operand.is_true() && condition.operator == "===" && condition.value.is_true()
}

/// Title of the legend entry drawn in `color`.
///
/// Legacy legends omit the alpha channel, so `#RRGGBBAA` also matches an
/// entry written as `#RRGGBB`.
pub fn find_legend_title_by_color<'a>(
    components: &'a [LegacyComponent],
    color: &str,
) -> Option<&'a str> {
    let without_alpha = (color.len() == 9).then(|| color.get(..7)).flatten();
    components
        .iter()
        .filter_map(|c| match &c.field {
            LegacyField::Legend { items, .. } => Some(items),
            _ => None,
        })
        .flatten()
        .find(|item| item.color == color || Some(item.color.as_str()) == without_alpha)
        .map(|item| item.title.as_str())
}

/// Preset for a colour component that collapsed to a single value.
pub fn color_value_preset(siblings: &[LegacyComponent], color: &str) -> Preset {
    let legend = find_legend_title_by_color(siblings, color);
    Preset::ColorValue {
        default_value: color.to_string(),
        as_legend: legend.is_some(),
        legend_name: legend.map(str::to_string),
    }
}

/// Groups items by key, keeping first-seen key order and item order.
fn group_by_first_seen<'a, T, K, F>(items: &'a [T], key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<(K, Vec<&T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, members)) => members.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}

fn value_text(value: &Literal) -> String {
    remove_quote(&value.to_string()).to_string()
}

/// Compiles a legacy colour list into one rule per source property.
///
/// The default item (if first) becomes a trailing `!==` fallback in every
/// rule. A (legend, colour) pair is flagged `asLegend` only the first time it
/// appears in the component; fallbacks are flagged whenever they have a
/// legend.
pub fn build_color_rules(
    items: &[ColorItem],
    siblings: &[LegacyComponent],
    ids: &dyn IdSource,
) -> Vec<Rule> {
    let default_item = items.first().filter(|i| is_default_condition(&i.condition));
    let branches = if default_item.is_some() {
        &items[1..]
    } else {
        items
    };

    let mut flagged: HashSet<(&str, &str)> = HashSet::new();

    group_by_first_seen(branches, |i| i.condition.operand.to_string())
        .into_iter()
        .map(|(operand, group)| {
            let id = ids.generate();
            let mut conditions = group
                .iter()
                .map(|item| {
                    let legend = find_legend_title_by_color(siblings, &item.color);
                    let as_legend =
                        legend.is_some_and(|l| flagged.insert((l, item.color.as_str())));
                    RuleCondition {
                        id: ids.generate(),
                        operation: item.condition.operator.clone(),
                        value: value_text(&item.condition.value),
                        color: Some(item.color.clone()),
                        as_legend: Some(as_legend),
                        legend_name: legend.map(str::to_string),
                    }
                })
                .collect::<Vec<_>>();

            if let Some(default_item) = default_item {
                let legend = find_legend_title_by_color(siblings, &default_item.color);
                conditions.push(RuleCondition {
                    id: ids.generate(),
                    operation: "!==".to_string(),
                    value: value_text(&group[0].condition.value),
                    color: Some(default_item.color.clone()),
                    as_legend: Some(legend.is_some()),
                    legend_name: legend.map(str::to_string),
                });
            }

            Rule {
                id,
                property_name: property_name(&operand).to_string(),
                legend_name: None,
                conditions,
            }
        })
        .collect()
}

/// Compiles a legacy `switchVisibility` list into filter rules.
///
/// A default first item becomes a leading "display all" rule on the second
/// item's property; the remaining items are grouped by title.
pub fn build_visibility_rules(
    conditions: &[TitledCondition],
    ids: &dyn IdSource,
) -> Result<Vec<Rule>, MigrateError> {
    let [first, second, ..] = conditions else {
        return Err(MigrateError::InvalidComponent {
            kind: "switchVisibility",
            reason: "has only one value".to_string(),
        });
    };

    let first_is_default = is_default_condition(&first.condition);
    let mut rules = Vec::new();

    if first_is_default {
        rules.push(Rule {
            id: ids.generate(),
            property_name: property_name(&second.condition.operand.to_string()).to_string(),
            legend_name: Some(first.title.clone()),
            conditions: vec![RuleCondition {
                id: ids.generate(),
                operation: "!==".to_string(),
                value: DISPLAY_ALL.to_string(),
                color: None,
                as_legend: None,
                legend_name: None,
            }],
        });
    }

    let branches = if first_is_default {
        &conditions[1..]
    } else {
        conditions
    };
    for (title, group) in group_by_first_seen(branches, |c| c.title.clone()) {
        let id = ids.generate();
        rules.push(Rule {
            id,
            property_name: property_name(&group[0].condition.operand.to_string()).to_string(),
            legend_name: Some(title),
            conditions: group
                .iter()
                .map(|c| RuleCondition {
                    id: ids.generate(),
                    operation: c.condition.operator.clone(),
                    value: value_text(&c.condition.value),
                    color: None,
                    as_legend: None,
                    legend_name: None,
                })
                .collect(),
        });
    }

    Ok(rules)
}
