use std::collections::{HashMap, HashSet, VecDeque};

use crate::scalar::{Encoding, Scalar};
use crate::zset::SortedSet;

pub const OK: &str = "OK";
pub const NIL: &str = "(nil)";
pub const EMPTY_ARRAY: &str = "(empty array)";
pub const TYPE_ERR: &str = "Redis object type error";

const STR_NOT_INT: &str = "Redis string can not be recognized as an integer";
const STR_NOT_NUM: &str = "Redis string can not be recognized as a number";
const HASH_NOT_INT: &str = "Hash value can not be recognized as an integer";
const HASH_NOT_FLOAT: &str = "Hash value can not be recognized as a float number";

/// The per-key container. The active arm is fixed when the key is created;
/// every operation checks it first and a mismatch replies with the type
/// error, leaving the payload untouched. Replies are plain text; there is
/// no separate error channel.
pub enum Value {
    Str(Scalar),
    List(VecDeque<String>),
    Hash(HashMap<String, Scalar>),
    Set(HashSet<String>),
    Sorted(SortedSet),
}

/// Numbered-line rendering shared by every enumerating reader.
fn numbered<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = String::new();
    let mut count = 0usize;
    for item in items {
        if count > 0 {
            out.push('\n');
        }
        count += 1;
        out.push_str(&count.to_string());
        out.push_str(") ");
        out.push_str(&item);
    }
    if count == 0 {
        EMPTY_ARRAY.to_string()
    } else {
        out
    }
}

/// Integral scores print as integers, everything else with six decimals.
pub fn format_score(score: f64) -> String {
    if score == score.trunc() && score >= i64::MIN as f64 && score <= i64::MAX as f64 {
        (score as i64).to_string()
    } else {
        format!("{score:.6}")
    }
}

/// Maps `[start, end]` with negative-from-the-end resolution onto
/// `0..len`, clamped. `None` when the window is empty.
fn resolve_window(mut start: i64, mut end: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    if start < 0 {
        start += len;
    }
    if end < 0 {
        end += len;
    }
    let start = start.max(0);
    let end = end.min(len - 1);
    if start > end {
        return None;
    }
    Some((start as usize, end as usize))
}

impl Value {
    pub fn new_string() -> Self {
        Value::Str(Scalar::new())
    }

    pub fn new_list() -> Self {
        Value::List(VecDeque::new())
    }

    pub fn new_hash() -> Self {
        Value::Hash(HashMap::new())
    }

    pub fn new_set() -> Self {
        Value::Set(HashSet::new())
    }

    pub fn new_sorted() -> Self {
        Value::Sorted(SortedSet::new())
    }

    // ── String ────────────────────────────────────────────────────────────

    pub fn get(&self) -> String {
        match self {
            Value::Str(s) => s.present(),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn set(&mut self, value: &str) -> String {
        match self {
            Value::Str(s) => {
                *s = Scalar::from_text(value);
                OK.to_string()
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn incr(&mut self) -> String {
        self.incr_by(1)
    }

    pub fn incr_by(&mut self, delta: i64) -> String {
        match self {
            Value::Str(s) if s.encoding() == Encoding::Int => {
                s.add_int(delta);
                s.present()
            }
            Value::Str(_) => STR_NOT_INT.to_string(),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn incr_by_float(&mut self, delta: f64) -> String {
        match self {
            Value::Str(s) if matches!(s.encoding(), Encoding::Int | Encoding::Double) => {
                s.add_float(delta);
                s.present()
            }
            Value::Str(_) => STR_NOT_NUM.to_string(),
            _ => TYPE_ERR.to_string(),
        }
    }

    // ── List ──────────────────────────────────────────────────────────────

    pub fn l_push(&mut self, value: &str) -> String {
        match self {
            Value::List(l) => {
                l.push_front(value.to_string());
                OK.to_string()
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn r_push(&mut self, value: &str) -> String {
        match self {
            Value::List(l) => {
                l.push_back(value.to_string());
                OK.to_string()
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn l_pop(&mut self) -> String {
        match self {
            Value::List(l) => l.pop_front().unwrap_or_else(|| NIL.to_string()),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn r_pop(&mut self) -> String {
        match self {
            Value::List(l) => l.pop_back().unwrap_or_else(|| NIL.to_string()),
            _ => TYPE_ERR.to_string(),
        }
    }

    /// Inclusive range with negative indices resolving from the end.
    pub fn l_range(&self, start: i64, end: i64) -> String {
        match self {
            Value::List(l) => match resolve_window(start, end, l.len()) {
                None => EMPTY_ARRAY.to_string(),
                Some((start, end)) => {
                    numbered(l.iter().skip(start).take(end - start + 1).cloned())
                }
            },
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn l_len(&self) -> String {
        match self {
            Value::List(l) => l.len().to_string(),
            _ => TYPE_ERR.to_string(),
        }
    }

    // ── Hash ──────────────────────────────────────────────────────────────

    pub fn h_set(&mut self, field: &str, value: &str) -> String {
        match self {
            Value::Hash(h) => {
                h.insert(field.to_string(), Scalar::from_text(value));
                OK.to_string()
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn h_set_nx(&mut self, field: &str, value: &str) -> String {
        match self {
            Value::Hash(h) => {
                if h.contains_key(field) {
                    NIL.to_string()
                } else {
                    h.insert(field.to_string(), Scalar::from_text(value));
                    OK.to_string()
                }
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn h_get(&self, field: &str) -> String {
        match self {
            Value::Hash(h) => h
                .get(field)
                .map(Scalar::present)
                .unwrap_or_else(|| NIL.to_string()),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn h_get_all(&self) -> String {
        match self {
            Value::Hash(h) => {
                numbered(h.iter().map(|(k, v)| format!("{k}: {}", v.present())))
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn h_keys(&self) -> String {
        match self {
            Value::Hash(h) => numbered(h.keys().cloned()),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn h_vals(&self) -> String {
        match self {
            Value::Hash(h) => numbered(h.values().map(Scalar::present)),
            _ => TYPE_ERR.to_string(),
        }
    }

    /// Integer increment; the field's scalar must already be `Int`.
    pub fn h_incr_by(&mut self, field: &str, delta: i64) -> String {
        match self {
            Value::Hash(h) => match h.get_mut(field) {
                None => NIL.to_string(),
                Some(s) if s.encoding() == Encoding::Int => {
                    s.add_int(delta);
                    s.present()
                }
                Some(_) => HASH_NOT_INT.to_string(),
            },
            _ => TYPE_ERR.to_string(),
        }
    }

    /// Float increment; accepts `Int` or `Double` fields and may downgrade
    /// the result back to `Int`.
    pub fn h_incr_by_float(&mut self, field: &str, delta: f64) -> String {
        match self {
            Value::Hash(h) => match h.get_mut(field) {
                None => NIL.to_string(),
                Some(s) if matches!(s.encoding(), Encoding::Int | Encoding::Double) => {
                    s.add_float(delta);
                    s.present()
                }
                Some(_) => HASH_NOT_FLOAT.to_string(),
            },
            _ => TYPE_ERR.to_string(),
        }
    }

    // ── Set ───────────────────────────────────────────────────────────────

    pub fn s_add(&mut self, member: &str) -> String {
        match self {
            Value::Set(s) => {
                s.insert(member.to_string());
                OK.to_string()
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn s_rem(&mut self, member: &str) -> String {
        match self {
            Value::Set(s) => {
                if s.remove(member) {
                    OK.to_string()
                } else {
                    NIL.to_string()
                }
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn s_card(&self) -> String {
        match self {
            Value::Set(s) => s.len().to_string(),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn s_is_member(&self, member: &str) -> String {
        match self {
            Value::Set(s) => {
                if s.contains(member) {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn s_members(&self) -> String {
        match self {
            Value::Set(s) => numbered(s.iter().cloned()),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn s_inter(&self, other: &Value) -> String {
        match (self, other) {
            (Value::Set(a), Value::Set(b)) => {
                numbered(a.iter().filter(|m| b.contains(*m)).cloned())
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn s_diff(&self, other: &Value) -> String {
        match (self, other) {
            (Value::Set(a), Value::Set(b)) => {
                numbered(a.iter().filter(|m| !b.contains(*m)).cloned())
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    /// Enumerates own members absent from `other`, then every member of
    /// `other`.
    pub fn s_union(&self, other: &Value) -> String {
        match (self, other) {
            (Value::Set(a), Value::Set(b)) => numbered(
                a.iter()
                    .filter(|m| !b.contains(*m))
                    .cloned()
                    .chain(b.iter().cloned()),
            ),
            _ => TYPE_ERR.to_string(),
        }
    }

    // ── Sorted set ────────────────────────────────────────────────────────

    pub fn z_add(&mut self, score: f64, member: &str) -> String {
        match self {
            Value::Sorted(z) => {
                z.add(member, score);
                "Ok".to_string()
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn z_rem(&mut self, member: &str) -> String {
        match self {
            Value::Sorted(z) => {
                if z.remove(member) {
                    OK.to_string()
                } else {
                    NIL.to_string()
                }
            }
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn z_score(&self, member: &str) -> String {
        match self {
            Value::Sorted(z) => z
                .score(member)
                .map(format_score)
                .unwrap_or_else(|| NIL.to_string()),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn z_rank(&self, member: &str) -> String {
        match self {
            Value::Sorted(z) => match z.rank(member) {
                Some(rank) => rank.to_string(),
                None => NIL.to_string(),
            },
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn z_card(&self) -> String {
        match self {
            Value::Sorted(z) => z.len().to_string(),
            _ => TYPE_ERR.to_string(),
        }
    }

    /// Inclusive on both score bounds.
    pub fn z_count(&self, min: f64, max: f64) -> String {
        match self {
            Value::Sorted(z) => z.count(min, max).to_string(),
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn z_incr_by(&mut self, delta: f64, member: &str) -> String {
        match self {
            Value::Sorted(z) => match z.incr(member, delta) {
                Some(score) => format_score(score),
                None => NIL.to_string(),
            },
            _ => TYPE_ERR.to_string(),
        }
    }

    /// Rank range with the same negative-index resolution as `l_range`; the
    /// underlying index only ever sees resolved bounds.
    pub fn z_range(&self, start: i64, end: i64, with_scores: bool) -> String {
        match self {
            Value::Sorted(z) => match resolve_window(start, end, z.len()) {
                None => EMPTY_ARRAY.to_string(),
                Some((start, end)) => numbered(
                    z.range(start as i64, end as i64)
                        .into_iter()
                        .map(|m| render_entry(z, m, with_scores)),
                ),
            },
            _ => TYPE_ERR.to_string(),
        }
    }

    pub fn z_range_by_score(
        &self,
        min: f64,
        min_exclusive: bool,
        max: f64,
        max_exclusive: bool,
        with_scores: bool,
    ) -> String {
        match self {
            Value::Sorted(z) => numbered(
                z.range_by_score(min, min_exclusive, max, max_exclusive)
                    .into_iter()
                    .map(|m| render_entry(z, m, with_scores)),
            ),
            _ => TYPE_ERR.to_string(),
        }
    }

    /// Common members with summed scores, enumerated in own map order.
    pub fn z_inter(&self, other: &Value) -> String {
        match (self, other) {
            (Value::Sorted(a), Value::Sorted(b)) => numbered(a.entries().filter_map(|(m, s)| {
                b.score(m)
                    .map(|s2| format!("{m} {}", format_score(s + s2)))
            })),
            _ => TYPE_ERR.to_string(),
        }
    }

    /// Every own member, with the other side's score added where the member
    /// is common.
    pub fn z_union(&self, other: &Value) -> String {
        match (self, other) {
            (Value::Sorted(a), Value::Sorted(b)) => numbered(a.entries().map(|(m, s)| {
                let total = s + b.score(m).unwrap_or(0.0);
                format!("{m} {}", format_score(total))
            })),
            _ => TYPE_ERR.to_string(),
        }
    }
}

fn render_entry(z: &SortedSet, member: &str, with_scores: bool) -> String {
    if with_scores {
        format!("{member} {}", format_score(z.score(member).unwrap_or_default()))
    } else {
        member.to_string()
    }
}
