//! Insertion-ordered group-by folds.
//!
//! Groups keep the order in which their key first appears in the table, so a
//! stable sort on top of them breaks ties by first appearance.

use crate::metrics::{Count, GroupTotal};
use core_types::OrderRecord;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

pub(crate) struct Grouped<V> {
    index: HashMap<String, usize>,
    groups: Vec<(String, V)>,
}

impl<V: Default> Grouped<V> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    pub(crate) fn entry(&mut self, key: &str) -> &mut V {
        let position = match self.index.get(key).copied() {
            Some(position) => position,
            None => {
                self.groups.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[position].1
    }

    pub(crate) fn into_groups(self) -> Vec<(String, V)> {
        self.groups
    }
}

/// Running totals for one group.
#[derive(Default)]
pub(crate) struct TotalsAcc<'a> {
    revenue: Decimal,
    quantity: u64,
    lines: usize,
    orders: HashSet<&'a str>,
}

impl<'a> TotalsAcc<'a> {
    pub(crate) fn add(&mut self, row: &'a OrderRecord) {
        self.revenue += row.amount;
        self.quantity += u64::from(row.quantity);
        self.lines += 1;
        self.orders.insert(row.order_id.as_str());
    }
}

/// Folds `rows` into per-key totals, in first-appearance order.
pub(crate) fn totals_by<'a, I, F>(rows: I, key: F) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = &'a OrderRecord>,
    F: Fn(&'a OrderRecord) -> &'a str,
{
    let mut grouped: Grouped<TotalsAcc<'a>> = Grouped::new();
    for row in rows {
        grouped.entry(key(row)).add(row);
    }
    grouped
        .into_groups()
        .into_iter()
        .map(|(key, acc)| GroupTotal {
            key,
            revenue: acc.revenue,
            quantity: acc.quantity,
            orders: acc.orders.len(),
            lines: acc.lines,
        })
        .collect()
}

/// Counts rows per key, ranked descending by count.
pub(crate) fn counts_by<'a, I, F>(rows: I, key: F) -> Vec<Count>
where
    I: IntoIterator<Item = &'a OrderRecord>,
    F: Fn(&'a OrderRecord) -> &'a str,
{
    let mut grouped: Grouped<usize> = Grouped::new();
    for row in rows {
        *grouped.entry(key(row)) += 1;
    }
    let mut counts: Vec<Count> = grouped
        .into_groups()
        .into_iter()
        .map(|(key, count)| Count { key, count })
        .collect();
    rank_descending(&mut counts, |c| c.count);
    counts
}

/// Stable descending sort: equal keys keep their current relative order.
pub(crate) fn rank_descending<T, K, F>(items: &mut [T], key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_keep_first_appearance_order() {
        let mut grouped: Grouped<u32> = Grouped::new();
        for key in ["b", "a", "b", "c", "a", "b"] {
            *grouped.entry(key) += 1;
        }
        let groups = grouped.into_groups();
        assert_eq!(
            groups,
            vec![
                ("b".to_string(), 3),
                ("a".to_string(), 2),
                ("c".to_string(), 1)
            ]
        );
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let mut items = vec![("first", 5), ("second", 7), ("third", 5), ("fourth", 7)];
        rank_descending(&mut items, |(_, v)| *v);
        assert_eq!(
            items,
            vec![("second", 7), ("fourth", 7), ("first", 5), ("third", 5)]
        );
    }
}
